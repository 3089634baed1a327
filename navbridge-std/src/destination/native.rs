use crate::context::{ContextProvider, RenderingArtifact};
use navbridge_core::{
    BoxError, BridgeError, Destination, DestinationViewResolver, Locale, Model, View, WebRequest,
    WebResponse,
};
use std::sync::Arc;

/// A view framework view rendered on behalf of the dispatch framework.
///
/// Rendering goes through the current request context's single-flight
/// [`render`](crate::context::RequestContext::render); the view framework's
/// lifecycle writes the response.
pub struct NativeView {
    view_id: String,
    provider: Arc<dyn ContextProvider>,
}

impl NativeView {
    /// A view for `view_id`.
    pub fn new(view_id: impl Into<String>, provider: Arc<dyn ContextProvider>) -> Self {
        Self {
            view_id: view_id.into(),
            provider,
        }
    }

    /// The view framework view id.
    pub fn view_id(&self) -> &str {
        &self.view_id
    }
}

impl View for NativeView {
    fn render(&self, model: &Model, _: &WebRequest, _: &mut WebResponse) -> Result<(), BoxError> {
        let context = self.provider.require()?;
        context.render(RenderingArtifact::new(self.view_id.clone(), model.clone()))?;
        Ok(())
    }

    fn content_type(&self) -> Option<&str> {
        Some("text/html")
    }
}

/// Maps logical view names onto view framework view ids.
///
/// `results` becomes `{prefix}results{suffix}`. Names carrying a scheme such
/// as `redirect:` are left to other resolvers.
pub struct NativeViewResolver {
    provider: Arc<dyn ContextProvider>,
    prefix: String,
    suffix: String,
}

impl NativeViewResolver {
    /// A resolver with no prefix or suffix.
    pub fn new(provider: Arc<dyn ContextProvider>) -> Self {
        Self {
            provider,
            prefix: String::new(),
            suffix: String::new(),
        }
    }

    /// Prepend `prefix` to view names.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Append `suffix` to view names.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// The view id `name` maps to.
    pub fn view_id(&self, name: &str) -> String {
        format!("{}{}{}", self.prefix, name, self.suffix)
    }
}

impl DestinationViewResolver for NativeViewResolver {
    fn resolve_destination(
        &self,
        destination: &Destination,
        _: &Locale,
    ) -> Result<Option<Arc<dyn View>>, BridgeError> {
        Ok(destination
            .as_name()
            .filter(|name| !name.is_empty() && !name.contains(':'))
            .map(|name| {
                Arc::new(NativeView::new(self.view_id(name), Arc::clone(&self.provider)))
                    as Arc<dyn View>
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{RequestContext, ThreadContextProvider};
    use crate::testing::{RecordingLifecycle, RecordingNativeContextFactory};
    use navbridge_core::{StateError, Value};

    fn resolver() -> NativeViewResolver {
        NativeViewResolver::new(Arc::new(ThreadContextProvider))
            .with_prefix("/WEB-INF/views/")
            .with_suffix(".xhtml")
    }

    #[test]
    fn test_names_map_to_view_ids() {
        let resolver = resolver();
        assert_eq!(resolver.view_id("results"), "/WEB-INF/views/results.xhtml");
        assert!(resolver
            .resolve_destination(&Destination::from("redirect:/x"), &Locale::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_render_goes_through_request_context() {
        let lifecycle = Arc::new(RecordingLifecycle::new());
        let context = RequestContext::builder(WebRequest::new("/hotels"), Value::new(()))
            .native_factory(Arc::new(RecordingNativeContextFactory::new()))
            .lifecycle(lifecycle.clone())
            .build()
            .unwrap();
        let view = resolver()
            .resolve_destination(&Destination::from("results"), &Locale::default())
            .unwrap()
            .unwrap();

        let mut response = WebResponse::new();
        let err = view
            .render(&Model::new(), context.request(), &mut response)
            .unwrap_err();
        assert!(err.downcast_ref::<StateError>().is_some());

        let _scope = context.enter();
        view.render(&Model::new(), context.request(), &mut response)
            .unwrap();
        assert_eq!(lifecycle.rendered(), ["/WEB-INF/views/results.xhtml".to_owned()]);
        assert!(context.rendering().is_none());
    }
}
