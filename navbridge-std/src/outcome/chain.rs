//! Ordered composition of outcome resolvers.

use navbridge_core::{
    BridgeError, ConfigError, NavigationContext, NavigationOutcome, NavigationOutcomeResolver,
    ResolutionError,
};
use std::sync::Arc;
use tracing::debug;

/// A chain of outcome resolvers with a uniqueness contract.
///
/// Every resolver is asked whether it claims a navigation. No claim means the
/// view framework handles the navigation itself; more than one claim is a
/// [`ConfigError::DuplicateResolver`]. The chain is itself a resolver, so
/// chains nest.
pub struct NavigationOutcomeResolverChain {
    resolvers: Vec<Arc<dyn NavigationOutcomeResolver>>,
}

impl NavigationOutcomeResolverChain {
    /// Start an empty chain.
    pub fn builder() -> NavigationOutcomeResolverChainBuilder {
        NavigationOutcomeResolverChainBuilder {
            resolvers: Vec::new(),
        }
    }

    /// The resolvers, in order.
    pub fn resolvers(&self) -> &[Arc<dyn NavigationOutcomeResolver>] {
        &self.resolvers
    }

    /// The single resolver claiming `context`, if any.
    pub fn claimant(
        &self,
        context: &NavigationContext,
    ) -> Result<Option<&Arc<dyn NavigationOutcomeResolver>>, BridgeError> {
        let mut claimants = Vec::new();
        for resolver in &self.resolvers {
            if resolver.can_resolve(context)? {
                claimants.push(resolver);
            }
        }
        match claimants.len() {
            0 | 1 => Ok(claimants.pop()),
            _ => Err(ConfigError::DuplicateResolver {
                outcome: context.outcome().to_owned(),
                resolvers: claimants
                    .iter()
                    .map(|resolver| resolver.name().to_owned())
                    .collect(),
            }
            .into()),
        }
    }
}

impl NavigationOutcomeResolver for NavigationOutcomeResolverChain {
    fn can_resolve(&self, context: &NavigationContext) -> Result<bool, BridgeError> {
        Ok(self.claimant(context)?.is_some())
    }

    fn resolve(
        &self,
        context: &NavigationContext,
    ) -> Result<Option<NavigationOutcome>, BridgeError> {
        let resolver = self
            .claimant(context)?
            .ok_or_else(|| ResolutionError::NotClaimed(context.outcome().to_owned()))?;
        debug!(
            resolver = resolver.name(),
            outcome = context.outcome(),
            preemptive = context.is_preemptive(),
            "resolving navigation"
        );
        resolver.resolve(context)
    }
}

/// Builder for [`NavigationOutcomeResolverChain`].
pub struct NavigationOutcomeResolverChainBuilder {
    resolvers: Vec<Arc<dyn NavigationOutcomeResolver>>,
}

impl NavigationOutcomeResolverChainBuilder {
    /// Append a resolver.
    pub fn resolver(mut self, resolver: Arc<dyn NavigationOutcomeResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Append several resolvers.
    pub fn resolvers<I>(mut self, resolvers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn NavigationOutcomeResolver>>,
    {
        self.resolvers.extend(resolvers);
        self
    }

    /// Build the chain.
    pub fn build(self) -> NavigationOutcomeResolverChain {
        NavigationOutcomeResolverChain {
            resolvers: self.resolvers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixedOutcomeResolver;
    use navbridge_core::Value;

    fn navigation(outcome: &str) -> NavigationContext {
        NavigationContext::builder(Value::new(()), outcome).build()
    }

    #[test]
    fn test_single_claim_resolves() {
        let chain = NavigationOutcomeResolverChain::builder()
            .resolver(Arc::new(FixedOutcomeResolver::new("search", "results")))
            .resolver(Arc::new(FixedOutcomeResolver::new("cancel", "home")))
            .build();

        assert!(chain.can_resolve(&navigation("cancel")).unwrap());
        let outcome = chain.resolve(&navigation("cancel")).unwrap().unwrap();
        assert_eq!(outcome.destination().as_name(), Some("home"));
    }

    #[test]
    fn test_no_claim() {
        let chain = NavigationOutcomeResolverChain::builder()
            .resolver(Arc::new(FixedOutcomeResolver::new("search", "results")))
            .build();

        assert!(!chain.can_resolve(&navigation("unknown")).unwrap());
        assert!(matches!(
            chain.resolve(&navigation("unknown")),
            Err(BridgeError::Resolution(ResolutionError::NotClaimed(ref o))) if o == "unknown"
        ));
    }

    #[test]
    fn test_two_claims_fail() {
        let chain = NavigationOutcomeResolverChain::builder()
            .resolver(Arc::new(FixedOutcomeResolver::new("search", "results")))
            .resolver(Arc::new(FixedOutcomeResolver::new("search", "other")))
            .build();

        let err = chain.can_resolve(&navigation("search")).unwrap_err();
        match err {
            BridgeError::Config(ConfigError::DuplicateResolver { outcome, resolvers }) => {
                assert_eq!(outcome, "search");
                assert_eq!(resolvers.len(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(chain.resolve(&navigation("search")).is_err());
    }

    #[test]
    fn test_handled_without_navigation_is_preserved() {
        let chain = NavigationOutcomeResolverChain::builder()
            .resolver(Arc::new(FixedOutcomeResolver::staying("refresh")))
            .build();

        assert!(chain.can_resolve(&navigation("refresh")).unwrap());
        assert!(chain.resolve(&navigation("refresh")).unwrap().is_none());
    }
}
