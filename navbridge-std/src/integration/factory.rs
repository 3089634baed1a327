use super::{BridgeNavigationHandler, BridgeResponseStateManager, BridgeViewHandler};
use crate::context::{ContextProvider, ThreadContextProvider};
use navbridge_core::{
    ConfigError, DestinationViewResolver, ExpressionResolver, NavigationHandler,
    NavigationOutcomeResolver, ResponseStateManager, ViewHandler,
};
use std::sync::Arc;

/// The decorated view framework singletons, ready to be installed.
pub struct Integration {
    navigation_handler: Arc<BridgeNavigationHandler>,
    view_handler: Arc<BridgeViewHandler>,
    state_manager: Arc<BridgeResponseStateManager>,
}

impl Integration {
    /// The navigation handler to install in place of the original.
    pub fn navigation_handler(&self) -> &Arc<BridgeNavigationHandler> {
        &self.navigation_handler
    }

    /// The view handler to install in place of the original.
    pub fn view_handler(&self) -> &Arc<BridgeViewHandler> {
        &self.view_handler
    }

    /// The response state manager to install in place of the original.
    pub fn state_manager(&self) -> &Arc<BridgeResponseStateManager> {
        &self.state_manager
    }
}

/// Wraps the view framework's singletons at startup.
///
/// The originals and both resolver chains are required; the context provider
/// defaults to [`ThreadContextProvider`].
///
/// # Example
///
/// ```ignore
/// let integration = IntegrationFactory::new()
///     .navigation_handler(original_navigation)
///     .view_handler(original_views)
///     .state_manager(original_state)
///     .outcome_resolver(outcomes)
///     .destination_resolver(destinations)
///     .build()?;
/// ```
#[derive(Default)]
pub struct IntegrationFactory {
    navigation_handler: Option<Arc<dyn NavigationHandler>>,
    view_handler: Option<Arc<dyn ViewHandler>>,
    state_manager: Option<Arc<dyn ResponseStateManager>>,
    outcome_resolver: Option<Arc<dyn NavigationOutcomeResolver>>,
    destination_resolver: Option<Arc<dyn DestinationViewResolver>>,
    expressions: Option<Arc<dyn ExpressionResolver>>,
    provider: Option<Arc<dyn ContextProvider>>,
}

impl IntegrationFactory {
    /// An empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// The original navigation handler.
    pub fn navigation_handler(mut self, handler: Arc<dyn NavigationHandler>) -> Self {
        self.navigation_handler = Some(handler);
        self
    }

    /// The original view handler.
    pub fn view_handler(mut self, handler: Arc<dyn ViewHandler>) -> Self {
        self.view_handler = Some(handler);
        self
    }

    /// The original response state manager.
    pub fn state_manager(mut self, manager: Arc<dyn ResponseStateManager>) -> Self {
        self.state_manager = Some(manager);
        self
    }

    /// The resolver consulted for every navigation.
    pub fn outcome_resolver(mut self, resolver: Arc<dyn NavigationOutcomeResolver>) -> Self {
        self.outcome_resolver = Some(resolver);
        self
    }

    /// The resolver turning outcome destinations into views.
    pub fn destination_resolver(mut self, resolver: Arc<dyn DestinationViewResolver>) -> Self {
        self.destination_resolver = Some(resolver);
        self
    }

    /// Evaluate expressions held in navigation models.
    pub fn expressions(mut self, expressions: Arc<dyn ExpressionResolver>) -> Self {
        self.expressions = Some(expressions);
        self
    }

    /// Replace the thread-scoped context provider.
    pub fn provider(mut self, provider: Arc<dyn ContextProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Compose the decorators.
    pub fn build(self) -> Result<Integration, ConfigError> {
        let navigation = self
            .navigation_handler
            .ok_or(ConfigError::MissingCollaborator("navigation handler"))?;
        let views = self
            .view_handler
            .ok_or(ConfigError::MissingCollaborator("view handler"))?;
        let state = self
            .state_manager
            .ok_or(ConfigError::MissingCollaborator("response state manager"))?;
        let outcomes = self
            .outcome_resolver
            .ok_or(ConfigError::MissingCollaborator("navigation outcome resolver"))?;
        let destinations = self
            .destination_resolver
            .ok_or(ConfigError::MissingCollaborator("destination view resolver"))?;
        let provider = self
            .provider
            .unwrap_or_else(|| Arc::new(ThreadContextProvider));

        let mut view_handler = BridgeViewHandler::new(views, destinations, Arc::clone(&provider));
        if let Some(expressions) = self.expressions {
            view_handler = view_handler.with_expressions(expressions);
        }
        let view_handler = Arc::new(view_handler);
        let navigation_handler = Arc::new(BridgeNavigationHandler::new(
            navigation,
            outcomes,
            view_handler.clone(),
            Arc::clone(&provider),
        ));
        let state_manager = Arc::new(BridgeResponseStateManager::new(state, provider));

        Ok(Integration {
            navigation_handler,
            view_handler,
            state_manager,
        })
    }
}
