use crate::context::{ContextProvider, RequestContext};
use crate::registry::DestinationAndModel;
use navbridge_core::{
    BoxError, NativeContext, NavigationCase, NavigationContext, NavigationHandler,
    NavigationOutcomeResolver, UiEvent, ViewHandler,
};
use std::sync::Arc;
use tracing::debug;

/// Decorates the view framework's navigation handler.
///
/// Every navigation is first offered to the outcome resolver. Claimed
/// navigations are resolved here and their outcome travels back to the view
/// framework as a synthetic view id; everything else goes to the delegate.
///
/// - [`navigation_case`](NavigationHandler::navigation_case) is the
///   pre-emptive check. The outcome is stored in the outcome registry and a
///   redirecting case to its key is returned.
/// - [`handle_navigation`](NavigationHandler::handle_navigation) is the real
///   navigation. The destination is stored in the destination registry and a
///   view for its key becomes the new view root.
pub struct BridgeNavigationHandler {
    delegate: Arc<dyn NavigationHandler>,
    resolver: Arc<dyn NavigationOutcomeResolver>,
    view_handler: Arc<dyn ViewHandler>,
    provider: Arc<dyn ContextProvider>,
}

impl BridgeNavigationHandler {
    /// Decorate `delegate`. Views for resolved navigations are created through
    /// `view_handler`.
    pub fn new(
        delegate: Arc<dyn NavigationHandler>,
        resolver: Arc<dyn NavigationOutcomeResolver>,
        view_handler: Arc<dyn ViewHandler>,
        provider: Arc<dyn ContextProvider>,
    ) -> Self {
        Self {
            delegate,
            resolver,
            view_handler,
            provider,
        }
    }

    /// Record a pre-render or action event for the next navigation.
    pub fn capture_event(&self, event: UiEvent) {
        if let Some(context) = self.provider.current() {
            context.capture_event(event);
        }
    }

    fn navigation(
        &self,
        context: &RequestContext,
        from_action: Option<&str>,
        outcome: &str,
        preemptive: bool,
    ) -> NavigationContext {
        NavigationContext::builder(context.handler().clone(), outcome)
            .controller(context.controller().cloned())
            .from_action(from_action)
            .preemptive(preemptive)
            .originating_event(context.last_event())
            .build()
    }
}

impl NavigationHandler for BridgeNavigationHandler {
    fn navigation_case(
        &self,
        native: &dyn NativeContext,
        from_action: Option<&str>,
        outcome: &str,
    ) -> Result<Option<NavigationCase>, BoxError> {
        let Some(context) = self.provider.current() else {
            return self.delegate.navigation_case(native, from_action, outcome);
        };
        let navigation = self.navigation(&context, from_action, outcome, true);
        if !self.resolver.can_resolve(&navigation)? {
            return self.delegate.navigation_case(native, from_action, outcome);
        }
        let Some(resolved) = self.resolver.resolve(&navigation)? else {
            return Ok(None);
        };
        let key = context.outcomes()?.put(resolved);
        debug!(outcome, key = %key, "pre-emptive navigation resolved");
        Ok(Some(NavigationCase::new(from_action, outcome, key).redirecting()))
    }

    fn handle_navigation(
        &self,
        native: &dyn NativeContext,
        from_action: Option<&str>,
        outcome: Option<&str>,
    ) -> Result<(), BoxError> {
        let (Some(context), Some(outcome)) = (self.provider.current(), outcome) else {
            return self.delegate.handle_navigation(native, from_action, outcome);
        };
        let navigation = self.navigation(&context, from_action, outcome, false);
        if !self.resolver.can_resolve(&navigation)? {
            return self.delegate.handle_navigation(native, from_action, Some(outcome));
        }
        let Some(resolved) = self.resolver.resolve(&navigation)? else {
            debug!(outcome, "navigation handled, staying on the current view");
            return Ok(());
        };
        if native.is_response_complete() {
            return Ok(());
        }

        let mut entry = DestinationAndModel::from_outcome(&resolved);
        if let Some(component) = navigation.component() {
            entry = entry.with_component(component.clone());
        }
        let key = context.destinations()?.put(entry);
        let root = self.view_handler.create_view(native, &key)?;
        debug!(outcome, key = %key, "navigating");
        native.set_view_root(root);
        Ok(())
    }
}
