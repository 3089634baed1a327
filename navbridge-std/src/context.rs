//! # Per-Request Context
//!
//! [`RequestContext`] coordinates one request across both frameworks:
//!
//! - it lazily creates the view framework's heavyweight [`NativeContext`] and
//!   reference counts it through [`NativeContextHandle`]s, tearing it down
//!   when the last handle is dropped
//! - it guards rendering with a single-flight marker, so a nested render is
//!   reported instead of silently recursing
//! - it owns the request-scoped outcome and destination registries
//!
//! The context moves from [`ContextPhase::Fresh`] to [`ContextPhase::Active`]
//! when the native context is first created and to [`ContextPhase::Released`]
//! on [`release`](RequestContext::release). Release is terminal: every later
//! operation fails with [`StateError::Released`].
//!
//! # Current Context
//!
//! Components are handed the context explicitly wherever possible. Extension
//! points that the host frameworks call without injection reach it through a
//! [`ContextProvider`]; the default [`ThreadContextProvider`] reads the
//! innermost [`ContextScope`] entered on the current thread.

use crate::registry::{
    DESTINATION_KEY_PREFIX, DestinationRegistry, OUTCOME_KEY_PREFIX, OutcomeRegistry,
};
use navbridge_core::{
    BridgeError, ConfigError, Model, NativeContext, NativeContextFactory, RenderLifecycle,
    StateError, UiEvent, Value, WebRequest, WebResponse,
};
use parking_lot::Mutex;
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Lifecycle phase of a [`RequestContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextPhase {
    /// Created; the native context has not been needed yet.
    Fresh,
    /// The native context exists.
    Active,
    /// Released. Terminal.
    Released,
}

/// What is being rendered: a view id and the model handed to it.
#[derive(Debug, Clone)]
pub struct RenderingArtifact {
    view_id: String,
    model: Model,
}

impl RenderingArtifact {
    /// Pair a view id with its model.
    pub fn new(view_id: impl Into<String>, model: Model) -> Self {
        Self {
            view_id: view_id.into(),
            model,
        }
    }

    /// The view id.
    pub fn view_id(&self) -> &str {
        &self.view_id
    }

    /// The model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Take the model.
    pub fn into_model(self) -> Model {
        self.model
    }
}

struct ContextState {
    phase: ContextPhase,
    native: Option<Arc<dyn NativeContext>>,
    references: usize,
    rendering: Option<RenderingArtifact>,
    last_event: Option<UiEvent>,
}

/// Coordinates one request across both frameworks.
pub struct RequestContext {
    name: String,
    handler: Value,
    controller: Option<Value>,
    request: WebRequest,
    response: Mutex<WebResponse>,
    native_factory: Arc<dyn NativeContextFactory>,
    lifecycle: Option<Arc<dyn RenderLifecycle>>,
    state: Mutex<ContextState>,
    outcomes: OutcomeRegistry,
    destinations: DestinationRegistry,
}

impl RequestContext {
    /// Start building a context for `request` served by `handler`.
    pub fn builder(request: WebRequest, handler: Value) -> RequestContextBuilder {
        RequestContextBuilder {
            request,
            handler,
            controller: None,
            native_factory: None,
            lifecycle: None,
        }
    }

    /// A name for diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The dispatch-framework handler serving the request.
    pub fn handler(&self) -> &Value {
        &self.handler
    }

    /// The controller bean behind the handler.
    pub fn controller(&self) -> Option<&Value> {
        self.controller.as_ref()
    }

    /// The request.
    pub fn request(&self) -> &WebRequest {
        &self.request
    }

    /// Run `f` with exclusive access to the response.
    pub fn with_response<R>(&self, f: impl FnOnce(&mut WebResponse) -> R) -> R {
        f(&mut self.response.lock())
    }

    /// A copy of the response as written so far.
    pub fn response(&self) -> WebResponse {
        self.response.lock().clone()
    }

    /// The current phase.
    pub fn phase(&self) -> ContextPhase {
        self.state.lock().phase
    }

    /// Whether [`release`](Self::release) has been called.
    pub fn is_released(&self) -> bool {
        self.phase() == ContextPhase::Released
    }

    /// Obtain the native context, creating it on first use.
    ///
    /// Every handle counts as one reference; the native context is released
    /// when the last handle is dropped.
    pub fn acquire_native(self: &Arc<Self>) -> Result<NativeContextHandle, BridgeError> {
        let mut state = self.state.lock();
        self.ensure_live(&state)?;
        let native = match state.native.clone() {
            Some(native) => native,
            None => {
                let native = self.native_factory.create(&self.request)?;
                debug!(context = %self.name, "created native context");
                state.native = Some(Arc::clone(&native));
                state.phase = ContextPhase::Active;
                native
            }
        };
        state.references += 1;
        trace!(context = %self.name, references = state.references, "acquired native context");
        Ok(NativeContextHandle {
            context: Arc::clone(self),
            native,
        })
    }

    /// Number of outstanding native context handles.
    pub fn native_references(&self) -> usize {
        self.state.lock().references
    }

    fn release_native(&self) {
        let teardown = {
            let mut state = self.state.lock();
            state.references = state.references.saturating_sub(1);
            trace!(context = %self.name, references = state.references, "released native context");
            if state.references == 0 {
                state.native.take()
            } else {
                None
            }
        };
        if let Some(native) = teardown {
            debug!(context = %self.name, "tearing down native context");
            native.release();
        }
    }

    /// Render `artifact` through the view framework's lifecycle.
    ///
    /// Only one render may be in flight; the marker is cleared however the
    /// render ends.
    pub fn render(self: &Arc<Self>, artifact: RenderingArtifact) -> Result<(), BridgeError> {
        let lifecycle = self
            .lifecycle
            .clone()
            .ok_or(ConfigError::MissingCollaborator("render lifecycle"))?;
        let view_id = artifact.view_id.clone();
        let _guard = self.begin_render(artifact)?;
        let native = self.acquire_native()?;
        debug!(context = %self.name, view_id = %view_id, "rendering");
        lifecycle.execute(&*native, &view_id)?;
        lifecycle.render(&*native, &view_id)?;
        Ok(())
    }

    pub(crate) fn begin_render(
        &self,
        artifact: RenderingArtifact,
    ) -> Result<RenderGuard<'_>, StateError> {
        let mut state = self.state.lock();
        self.ensure_live(&state)?;
        if let Some(in_flight) = &state.rendering {
            return Err(StateError::NestedRender {
                context: self.name.clone(),
                in_flight: in_flight.view_id.clone(),
                requested: artifact.view_id,
            });
        }
        state.rendering = Some(artifact);
        Ok(RenderGuard { context: self })
    }

    /// The artifact currently being rendered.
    pub fn rendering(&self) -> Option<RenderingArtifact> {
        self.state.lock().rendering.clone()
    }

    /// The outcome registry.
    pub fn outcomes(&self) -> Result<&OutcomeRegistry, StateError> {
        self.ensure_live(&self.state.lock())?;
        Ok(&self.outcomes)
    }

    /// The destination registry.
    pub fn destinations(&self) -> Result<&DestinationRegistry, StateError> {
        self.ensure_live(&self.state.lock())?;
        Ok(&self.destinations)
    }

    /// Record the most recent UI event so a later navigation can refer to it.
    pub fn capture_event(&self, event: UiEvent) {
        self.state.lock().last_event = Some(event);
    }

    /// The most recently captured UI event.
    pub fn last_event(&self) -> Option<UiEvent> {
        self.state.lock().last_event.clone()
    }

    /// Release the context. Terminal.
    ///
    /// The native context is torn down here even if handles are still alive.
    pub fn release(&self) {
        let native = {
            let mut state = self.state.lock();
            if state.phase == ContextPhase::Released {
                return;
            }
            if state.references > 0 {
                warn!(
                    context = %self.name,
                    references = state.references,
                    "releasing request context with native context handles outstanding"
                );
            }
            state.phase = ContextPhase::Released;
            state.rendering = None;
            state.native.take()
        };
        if let Some(native) = native {
            native.release();
        }
        debug!(context = %self.name, "request context released");
    }

    fn ensure_live(&self, state: &ContextState) -> Result<(), StateError> {
        match state.phase {
            ContextPhase::Released => Err(StateError::Released(self.name.clone())),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("name", &self.name)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

/// Builder for [`RequestContext`].
pub struct RequestContextBuilder {
    request: WebRequest,
    handler: Value,
    controller: Option<Value>,
    native_factory: Option<Arc<dyn NativeContextFactory>>,
    lifecycle: Option<Arc<dyn RenderLifecycle>>,
}

impl RequestContextBuilder {
    /// Set the controller bean behind the handler.
    pub fn controller(mut self, controller: Value) -> Self {
        self.controller = Some(controller);
        self
    }

    /// Set the factory creating the view framework's native context. Required.
    pub fn native_factory(mut self, factory: Arc<dyn NativeContextFactory>) -> Self {
        self.native_factory = Some(factory);
        self
    }

    /// Set the lifecycle used to render view framework views.
    pub fn lifecycle(mut self, lifecycle: Arc<dyn RenderLifecycle>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    /// Build the context.
    pub fn build(self) -> Result<Arc<RequestContext>, ConfigError> {
        let native_factory = self
            .native_factory
            .ok_or(ConfigError::MissingCollaborator("native context factory"))?;
        Ok(Arc::new(RequestContext {
            name: format!("RequestContext[{}]", self.request.uri()),
            handler: self.handler,
            controller: self.controller,
            request: self.request,
            response: Mutex::new(WebResponse::new()),
            native_factory,
            lifecycle: self.lifecycle,
            state: Mutex::new(ContextState {
                phase: ContextPhase::Fresh,
                native: None,
                references: 0,
                rendering: None,
                last_event: None,
            }),
            outcomes: OutcomeRegistry::new(OUTCOME_KEY_PREFIX),
            destinations: DestinationRegistry::new(DESTINATION_KEY_PREFIX),
        }))
    }
}

pub(crate) struct RenderGuard<'a> {
    context: &'a RequestContext,
}

impl Drop for RenderGuard<'_> {
    fn drop(&mut self) {
        self.context.state.lock().rendering = None;
    }
}

/// A counted reference to the native context.
pub struct NativeContextHandle {
    context: Arc<RequestContext>,
    native: Arc<dyn NativeContext>,
}

impl NativeContextHandle {
    /// The request context owning the native context.
    pub fn request_context(&self) -> &Arc<RequestContext> {
        &self.context
    }
}

impl Deref for NativeContextHandle {
    type Target = dyn NativeContext;

    fn deref(&self) -> &Self::Target {
        &*self.native
    }
}

impl Clone for NativeContextHandle {
    fn clone(&self) -> Self {
        self.context.state.lock().references += 1;
        Self {
            context: Arc::clone(&self.context),
            native: Arc::clone(&self.native),
        }
    }
}

impl Drop for NativeContextHandle {
    fn drop(&mut self) {
        self.context.release_native();
    }
}

impl fmt::Debug for NativeContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeContextHandle")
            .field("context", &self.context.name)
            .finish_non_exhaustive()
    }
}

thread_local! {
    static CURRENT: RefCell<Vec<Arc<RequestContext>>> = const { RefCell::new(Vec::new()) };
}

impl RequestContext {
    /// The innermost context entered on this thread.
    pub fn current() -> Option<Arc<RequestContext>> {
        CURRENT.with(|stack| stack.borrow().last().cloned())
    }

    /// Like [`current`](Self::current), failing when no context is active.
    pub fn require_current() -> Result<Arc<RequestContext>, StateError> {
        Self::current().ok_or(StateError::NoActiveContext)
    }

    /// Make this context current on this thread until the scope is dropped.
    pub fn enter(self: &Arc<Self>) -> ContextScope {
        CURRENT.with(|stack| stack.borrow_mut().push(Arc::clone(self)));
        ContextScope {
            context: Arc::clone(self),
            _not_send: PhantomData,
        }
    }
}

/// Keeps a context current on this thread. See [`RequestContext::enter`].
#[must_use = "the context stops being current when the scope is dropped"]
pub struct ContextScope {
    context: Arc<RequestContext>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextScope {
    fn drop(&mut self) {
        // Scopes may end out of order; remove this scope's entry, not the top.
        CURRENT.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(index) = stack
                .iter()
                .rposition(|entered| Arc::ptr_eq(entered, &self.context))
            {
                stack.remove(index);
            }
        });
    }
}

impl fmt::Debug for ContextScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextScope")
            .field("context", &self.context.name)
            .finish_non_exhaustive()
    }
}

/// Looks up the request context for extension points called without one.
pub trait ContextProvider: Send + Sync {
    /// The current request context.
    fn current(&self) -> Option<Arc<RequestContext>>;

    /// The current request context, failing when there is none.
    fn require(&self) -> Result<Arc<RequestContext>, StateError> {
        self.current().ok_or(StateError::NoActiveContext)
    }
}

/// Provides the context entered on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadContextProvider;

impl ContextProvider for ThreadContextProvider {
    fn current(&self) -> Option<Arc<RequestContext>> {
        RequestContext::current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingLifecycle, RecordingNativeContextFactory};
    use navbridge_core::NavigationOutcome;

    fn context(factory: &Arc<RecordingNativeContextFactory>) -> Arc<RequestContext> {
        RequestContext::builder(WebRequest::new("/hotels"), Value::new(()))
            .native_factory(factory.clone())
            .lifecycle(Arc::new(RecordingLifecycle::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_reference_counting() {
        let factory = Arc::new(RecordingNativeContextFactory::new());
        let context = context(&factory);
        assert_eq!(context.phase(), ContextPhase::Fresh);

        let first = context.acquire_native().unwrap();
        let second = context.acquire_native().unwrap();
        assert_eq!(factory.created_count(), 1);
        assert_eq!(context.phase(), ContextPhase::Active);

        drop(first);
        assert!(!factory.last().unwrap().is_released());

        drop(second);
        assert!(factory.last().unwrap().is_released());
        assert_eq!(context.native_references(), 0);
    }

    #[test]
    fn test_reacquire_after_teardown_creates_new_native() {
        let factory = Arc::new(RecordingNativeContextFactory::new());
        let context = context(&factory);
        drop(context.acquire_native().unwrap());
        let _again = context.acquire_native().unwrap();
        assert_eq!(factory.created_count(), 2);
    }

    #[test]
    fn test_cloned_handle_counts() {
        let factory = Arc::new(RecordingNativeContextFactory::new());
        let context = context(&factory);
        let handle = context.acquire_native().unwrap();
        let clone = handle.clone();
        drop(handle);
        assert!(!factory.last().unwrap().is_released());
        drop(clone);
        assert!(factory.last().unwrap().is_released());
    }

    #[test]
    fn test_released_context_fails_fast() {
        let factory = Arc::new(RecordingNativeContextFactory::new());
        let context = context(&factory);
        let handle = context.acquire_native().unwrap();
        context.release();

        assert!(factory.last().unwrap().is_released());
        assert!(matches!(
            context.acquire_native(),
            Err(BridgeError::State(StateError::Released(ref name))) if name == "RequestContext[/hotels]"
        ));
        assert!(context.outcomes().is_err());
        assert!(context.destinations().is_err());
        drop(handle);
        assert_eq!(factory.created_count(), 1);
    }

    #[test]
    fn test_nested_render_is_rejected() {
        let factory = Arc::new(RecordingNativeContextFactory::new());
        let context = context(&factory);

        let _guard = context
            .begin_render(RenderingArtifact::new("/search.xhtml", Model::new()))
            .unwrap();
        let err = context
            .render(RenderingArtifact::new("/results.xhtml", Model::new()))
            .unwrap_err();
        match err {
            BridgeError::State(StateError::NestedRender {
                in_flight,
                requested,
                ..
            }) => {
                assert_eq!(in_flight, "/search.xhtml");
                assert_eq!(requested, "/results.xhtml");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_render_marker_cleared_after_failure() {
        let factory = Arc::new(RecordingNativeContextFactory::new());
        let lifecycle = Arc::new(RecordingLifecycle::new().failing_on("/broken.xhtml"));
        let context = RequestContext::builder(WebRequest::new("/hotels"), Value::new(()))
            .native_factory(factory.clone())
            .lifecycle(lifecycle.clone())
            .build()
            .unwrap();

        assert!(
            context
                .render(RenderingArtifact::new("/broken.xhtml", Model::new()))
                .is_err()
        );
        assert!(context.rendering().is_none());
        context
            .render(RenderingArtifact::new("/ok.xhtml", Model::new()))
            .unwrap();
        assert_eq!(lifecycle.rendered(), ["/ok.xhtml".to_owned()]);
        assert!(factory.last().unwrap().is_released());
    }

    #[test]
    fn test_render_requires_lifecycle() {
        let factory = Arc::new(RecordingNativeContextFactory::new());
        let context = RequestContext::builder(WebRequest::new("/"), Value::new(()))
            .native_factory(factory)
            .build()
            .unwrap();
        let err = context
            .render(RenderingArtifact::new("/a.xhtml", Model::new()))
            .unwrap_err();
        assert!(matches!(err, BridgeError::Config(ConfigError::MissingCollaborator(_))));
    }

    #[test]
    fn test_missing_factory_is_a_config_error() {
        let err = RequestContext::builder(WebRequest::new("/"), Value::new(()))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCollaborator("native context factory")));
    }

    #[test]
    fn test_current_scope_nests() {
        let factory = Arc::new(RecordingNativeContextFactory::new());
        let outer = context(&factory);
        let inner = context(&factory);
        assert!(RequestContext::current().is_none());
        {
            let _outer = outer.enter();
            {
                let _inner = inner.enter();
                assert!(Arc::ptr_eq(&RequestContext::current().unwrap(), &inner));
            }
            assert!(Arc::ptr_eq(&ThreadContextProvider.current().unwrap(), &outer));
        }
        assert!(matches!(
            ThreadContextProvider.require(),
            Err(StateError::NoActiveContext)
        ));
    }

    #[test]
    fn test_scopes_dropped_out_of_order() {
        let factory = Arc::new(RecordingNativeContextFactory::new());
        let first = context(&factory);
        let second = context(&factory);

        let first_scope = first.enter();
        let second_scope = second.enter();
        drop(first_scope);
        assert!(Arc::ptr_eq(&RequestContext::current().unwrap(), &second));

        let again = first.enter();
        drop(second_scope);
        assert!(Arc::ptr_eq(&RequestContext::current().unwrap(), &first));
        drop(again);
        assert!(RequestContext::current().is_none());
    }

    #[test]
    fn test_registries_are_request_scoped() {
        let factory = Arc::new(RecordingNativeContextFactory::new());
        let a = context(&factory);
        let b = context(&factory);
        let key = a.outcomes().unwrap().put(NavigationOutcome::new("results"));
        assert!(a.outcomes().unwrap().get(&key).is_some());
        assert!(b.outcomes().unwrap().get(&key).is_none());
    }
}
