use crate::config::{BridgeConfig, DEFAULT_OUTCOME_PREFIX};
use navbridge_core::{BridgeError, NavigationContext, NavigationOutcome, NavigationOutcomeResolver};

/// Resolves outcomes that name their destination directly.
///
/// With the default prefix, the outcome `dispatch:redirect:/hotels` navigates
/// to the destination `redirect:/hotels` without any navigation method.
#[derive(Debug, Clone)]
pub struct ImplicitNavigationOutcomeResolver {
    prefix: String,
}

impl Default for ImplicitNavigationOutcomeResolver {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_OUTCOME_PREFIX.to_owned(),
        }
    }
}

impl ImplicitNavigationOutcomeResolver {
    /// Use the configured outcome prefix.
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            prefix: config.outcome_prefix().to_owned(),
        }
    }

    fn destination<'c>(&self, context: &'c NavigationContext) -> Option<&'c str> {
        context
            .outcome()
            .strip_prefix(self.prefix.as_str())
            .filter(|rest| !rest.is_empty())
    }
}

impl NavigationOutcomeResolver for ImplicitNavigationOutcomeResolver {
    fn can_resolve(&self, context: &NavigationContext) -> Result<bool, BridgeError> {
        Ok(self.destination(context).is_some())
    }

    fn resolve(
        &self,
        context: &NavigationContext,
    ) -> Result<Option<NavigationOutcome>, BridgeError> {
        Ok(self.destination(context).map(NavigationOutcome::new))
    }
}
