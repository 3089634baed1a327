//! # Dispatch Interceptor
//!
//! [`BridgeInterceptor`] hooks into the dispatch framework's handler
//! interception. Before a handler runs it creates the request context and
//! makes it current on the dispatching thread; once the request completes the
//! context is released.

use crate::context::{ContextScope, RequestContext};
use navbridge_core::{
    ConfigError, NativeContextFactory, RenderLifecycle, Value, WebRequest, WebResponse,
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Creates and releases the per-request context around dispatch.
pub struct BridgeInterceptor {
    native_factory: Arc<dyn NativeContextFactory>,
    lifecycle: Option<Arc<dyn RenderLifecycle>>,
}

impl BridgeInterceptor {
    /// Create contexts whose native context comes from `native_factory`.
    pub fn new(native_factory: Arc<dyn NativeContextFactory>) -> Self {
        Self {
            native_factory,
            lifecycle: None,
        }
    }

    /// Render view framework views with `lifecycle`.
    pub fn with_lifecycle(mut self, lifecycle: Arc<dyn RenderLifecycle>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    /// Start handling `request` with `handler`, optionally backed by a
    /// controller bean.
    ///
    /// The returned [`ActiveRequest`] keeps the context current on this
    /// thread; keep it alive for the whole dispatch.
    pub fn pre_handle(
        &self,
        request: WebRequest,
        handler: Value,
        controller: Option<Value>,
    ) -> Result<ActiveRequest, ConfigError> {
        let mut builder = RequestContext::builder(request, handler)
            .native_factory(Arc::clone(&self.native_factory));
        if let Some(controller) = controller {
            builder = builder.controller(controller);
        }
        if let Some(lifecycle) = &self.lifecycle {
            builder = builder.lifecycle(Arc::clone(lifecycle));
        }
        let context = builder.build()?;
        debug!(context = context.name(), "request context created");
        let scope = context.enter();
        Ok(ActiveRequest {
            context,
            _scope: scope,
        })
    }
}

/// A request being dispatched. Dropping it releases the context.
#[must_use = "the request context is released when this is dropped"]
pub struct ActiveRequest {
    context: Arc<RequestContext>,
    _scope: ContextScope,
}

impl ActiveRequest {
    /// The request's context.
    pub fn context(&self) -> &Arc<RequestContext> {
        &self.context
    }

    /// Finish the request, returning the response written during it.
    pub fn after_completion(self) -> WebResponse {
        self.context.response()
    }
}

impl Drop for ActiveRequest {
    fn drop(&mut self) {
        self.context.release();
    }
}

impl fmt::Debug for ActiveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveRequest")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingNativeContextFactory;

    struct HotelsController;

    #[test]
    fn test_context_is_current_while_dispatching() {
        let factory = Arc::new(RecordingNativeContextFactory::new());
        let interceptor = BridgeInterceptor::new(factory.clone());
        assert!(RequestContext::current().is_none());

        let active = interceptor
            .pre_handle(
                WebRequest::new("/hotels"),
                Value::new(()),
                Some(Value::new(HotelsController)),
            )
            .unwrap();
        let context = Arc::clone(active.context());
        assert!(Arc::ptr_eq(&RequestContext::current().unwrap(), &context));
        assert!(context.controller().unwrap().downcast::<HotelsController>().is_some());

        let native = context.acquire_native().unwrap();
        drop(native);
        active.after_completion();

        assert!(context.is_released());
        assert!(RequestContext::current().is_none());
        assert!(factory.last().unwrap().is_released());
    }

    #[test]
    fn test_drop_releases_context() {
        let interceptor = BridgeInterceptor::new(Arc::new(RecordingNativeContextFactory::new()));
        let active = interceptor
            .pre_handle(WebRequest::new("/hotels"), Value::new(()), None)
            .unwrap();
        let context = Arc::clone(active.context());
        drop(active);
        assert!(context.is_released());
        assert!(context.outcomes().is_err());
    }
}
