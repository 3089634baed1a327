use crate::context::{ContextProvider, RequestContext};
use crate::model_builder::ModelBuilder;
use crate::registry::DestinationAndModel;
use navbridge_core::{
    BoxError, BridgeError, DelegatedRender, DestinationViewResolver, ExpressionResolver, Model,
    ModelHolder, NativeContext, Parameters, ResolutionError, View, ViewHandler, ViewRoot,
    WebResponse,
};
use std::sync::Arc;
use tracing::debug;

/// Decorates the view framework's view handler.
///
/// View ids that are synthetic registry keys are turned back into their
/// destination, resolved into a dispatch-framework view and wrapped in a
/// delegating [`ViewRoot`]. The model handed to that view is merged in this
/// order, first contributor wins:
///
/// 1. parameters of the component that triggered the navigation
/// 2. the model the navigation method accumulated (expressions evaluated)
/// 3. the outcome's request-style parameters
/// 4. the model held by the view currently shown
///
/// Every other view id goes to the delegate. While the request context
/// renders a view, the artifact's model is attached to that view's root.
pub struct BridgeViewHandler {
    delegate: Arc<dyn ViewHandler>,
    destinations: Arc<dyn DestinationViewResolver>,
    provider: Arc<dyn ContextProvider>,
    expressions: Option<Arc<dyn ExpressionResolver>>,
}

impl BridgeViewHandler {
    /// Decorate `delegate`.
    pub fn new(
        delegate: Arc<dyn ViewHandler>,
        destinations: Arc<dyn DestinationViewResolver>,
        provider: Arc<dyn ContextProvider>,
    ) -> Self {
        Self {
            delegate,
            destinations,
            provider,
            expressions: None,
        }
    }

    /// Evaluate `#{...}` strings of navigation models with `expressions`.
    pub fn with_expressions(mut self, expressions: Arc<dyn ExpressionResolver>) -> Self {
        self.expressions = Some(expressions);
        self
    }

    /// The registry entry behind `view_id`, if it is a synthetic key.
    fn entry(
        &self,
        context: &RequestContext,
        view_id: &str,
    ) -> Result<Option<DestinationAndModel>, BridgeError> {
        let outcomes = context.outcomes()?;
        let destinations = context.destinations()?;
        let entry = if outcomes.owns(view_id) {
            outcomes.get(view_id).map(|outcome| {
                let entry = DestinationAndModel::from_outcome(&outcome);
                match context.last_event().and_then(|event| event.source().cloned()) {
                    Some(component) => entry.with_component(component),
                    None => entry,
                }
            })
        } else if destinations.owns(view_id) {
            destinations.get(view_id).map(|entry| (*entry).clone())
        } else {
            return Ok(None);
        };
        entry.map(Some).ok_or_else(|| {
            ResolutionError::Destination {
                destination: view_id.to_owned(),
                reason: "unknown or expired key".to_owned(),
            }
            .into()
        })
    }

    fn view(
        &self,
        context: &RequestContext,
        entry: &DestinationAndModel,
    ) -> Result<Arc<dyn View>, BridgeError> {
        let destination = entry.destination();
        self.destinations
            .resolve_destination(destination, context.request().locale())?
            .ok_or_else(|| {
                ResolutionError::Destination {
                    destination: destination.to_string(),
                    reason: "no destination view resolver recognised it".to_owned(),
                }
                .into()
            })
    }

    fn model(
        &self,
        native: &dyn NativeContext,
        entry: &DestinationAndModel,
        parameters: Option<&Parameters>,
    ) -> Result<Model, BridgeError> {
        let mut builder = match &self.expressions {
            Some(expressions) => ModelBuilder::with_expressions(&**expressions),
            None => ModelBuilder::new(),
        };
        if let Some(component) = entry.component() {
            builder.add_component_parameters(component);
        }
        if let Some(model) = entry.model() {
            builder.add_map(model, true)?;
        }
        if let Some(parameters) = entry.parameters() {
            builder.add_parameters(parameters);
        }
        if let Some(parameters) = parameters {
            builder.add_parameters(parameters);
        }
        if let Some(model) = native.view_root().and_then(|root| root.model().cloned()) {
            builder.add_holder(&ModelHolder::new(model));
        }
        let (model, dropped) = builder.into_parts();
        if !dropped.is_empty() {
            debug!(dropped = dropped.len(), "model contributions dropped");
        }
        Ok(model)
    }

    fn attach_rendering_model(&self, context: &RequestContext, root: ViewRoot) -> ViewRoot {
        match context.rendering() {
            Some(artifact) if artifact.view_id() == root.view_id() && root.model().is_none() => {
                root.with_model(artifact.into_model())
            }
            _ => root,
        }
    }

    fn url(
        &self,
        native: &dyn NativeContext,
        view_id: &str,
        parameters: &Parameters,
    ) -> Result<Option<String>, BoxError> {
        let Some(context) = self.provider.current() else {
            return Ok(None);
        };
        let Some(entry) = self.entry(&context, view_id)? else {
            return Ok(None);
        };
        let view = self.view(&context, &entry)?;
        let bookmarkable = view.as_bookmarkable().ok_or_else(|| ResolutionError::Destination {
            destination: entry.destination().to_string(),
            reason: "the view cannot be addressed by URL".to_owned(),
        })?;
        let model = self.model(native, &entry, Some(parameters))?;
        bookmarkable
            .bookmark_url(&model, context.request())
            .map(Some)
    }
}

impl ViewHandler for BridgeViewHandler {
    fn create_view(&self, native: &dyn NativeContext, view_id: &str) -> Result<ViewRoot, BoxError> {
        let Some(context) = self.provider.current() else {
            return self.delegate.create_view(native, view_id);
        };
        match self.entry(&context, view_id)? {
            Some(entry) => {
                let view = self.view(&context, &entry)?;
                let model = self.model(native, &entry, None)?;
                debug!(view_id, destination = %entry.destination(), "created delegating view");
                Ok(ViewRoot::delegated(view_id, DelegatedRender::new(view, model)))
            }
            None => {
                let root = self.delegate.create_view(native, view_id)?;
                Ok(self.attach_rendering_model(&context, root))
            }
        }
    }

    fn restore_view(
        &self,
        native: &dyn NativeContext,
        view_id: &str,
    ) -> Result<Option<ViewRoot>, BoxError> {
        let Some(context) = self.provider.current() else {
            return self.delegate.restore_view(native, view_id);
        };
        if context.outcomes()?.owns(view_id) || context.destinations()?.owns(view_id) {
            return Ok(None);
        }
        Ok(self
            .delegate
            .restore_view(native, view_id)?
            .map(|root| self.attach_rendering_model(&context, root)))
    }

    fn render_view(&self, native: &dyn NativeContext, root: &ViewRoot) -> Result<(), BoxError> {
        let Some(render) = root.delegated_render() else {
            return self.delegate.render_view(native, root);
        };
        let context = self.provider.require()?;
        // The view may write to the shared response itself while rendering.
        let mut rendered = WebResponse::new();
        render
            .view()
            .render(render.model(), context.request(), &mut rendered)?;
        context.with_response(|current| current.merge(rendered));
        Ok(())
    }

    fn action_url(&self, native: &dyn NativeContext, view_id: &str) -> Result<String, BoxError> {
        if let Some(context) = self.provider.current() {
            let rendering = context
                .rendering()
                .is_some_and(|artifact| artifact.view_id() == view_id);
            let synthetic =
                context.outcomes()?.owns(view_id) || context.destinations()?.owns(view_id);
            if rendering || synthetic {
                return Ok(context.request().uri());
            }
        }
        self.delegate.action_url(native, view_id)
    }

    fn bookmarkable_url(
        &self,
        native: &dyn NativeContext,
        view_id: &str,
        parameters: &Parameters,
    ) -> Result<String, BoxError> {
        match self.url(native, view_id, parameters)? {
            Some(url) => Ok(url),
            None => self.delegate.bookmarkable_url(native, view_id, parameters),
        }
    }

    fn redirect_url(
        &self,
        native: &dyn NativeContext,
        view_id: &str,
        parameters: &Parameters,
    ) -> Result<String, BoxError> {
        match self.url(native, view_id, parameters)? {
            Some(url) => Ok(url),
            None => self.delegate.redirect_url(native, view_id, parameters),
        }
    }
}
