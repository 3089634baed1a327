use super::mapping::NavigationMappingMethod;
use crate::bean::BeanRegistry;
use crate::config::BridgeConfig;
use crate::context::ContextProvider;
use crate::invocation::{ArgumentResolver, MethodTarget, NavigationMethodInvoker};
use navbridge_core::{
    BridgeError, ConfigError, NavigationContext, NavigationOutcome, NavigationOutcomeResolver,
    ResolutionError,
};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Resolves navigations by invoking registered navigation methods.
///
/// Mappings are read from the [`BeanRegistry`] once, when the application
/// is fully wired ([`on_context_refreshed`](Self::on_context_refreshed)).
/// A navigation matching more than one mapping is a
/// [`ConfigError::AmbiguousNavigationMapping`] naming every candidate.
pub struct MappedNavigationOutcomeResolver {
    invoker: Arc<NavigationMethodInvoker>,
    provider: Arc<dyn ContextProvider>,
    custom_argument_resolvers: Vec<Arc<dyn ArgumentResolver>>,
    mappings: RwLock<Vec<Arc<NavigationMappingMethod>>>,
}

impl MappedNavigationOutcomeResolver {
    /// A resolver with no mappings yet.
    pub fn new(invoker: Arc<NavigationMethodInvoker>, provider: Arc<dyn ContextProvider>) -> Self {
        Self {
            invoker,
            provider,
            custom_argument_resolvers: Vec::new(),
            mappings: RwLock::new(Vec::new()),
        }
    }

    /// Argument resolvers tried before the invoker's own for every invocation.
    pub fn with_custom_argument_resolvers<I>(mut self, resolvers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ArgumentResolver>>,
    {
        self.custom_argument_resolvers.extend(resolvers);
        self
    }

    /// Rebuild the mappings from every navigation method in `beans`.
    ///
    /// Nothing changes when an error is returned.
    pub fn on_context_refreshed(
        &self,
        beans: &BeanRegistry,
        config: &BridgeConfig,
    ) -> Result<(), ConfigError> {
        let mut mappings = Vec::new();
        let mut seen = HashSet::new();
        for bean in beans.iter() {
            for (index, definition) in bean.navigation_methods().iter().enumerate() {
                let mapping = NavigationMappingMethod::new(bean, index, config)?;
                if !seen.insert((bean.name(), definition.method().name())) {
                    return Err(ConfigError::DuplicateMapping(mapping.description().to_owned()));
                }
                debug!(method = mapping.description(), outcomes = ?mapping.outcomes(), "registered navigation mapping");
                mappings.push(Arc::new(mapping));
            }
        }
        info!(count = mappings.len(), "navigation mappings refreshed");
        *self.mappings.write() = mappings;
        Ok(())
    }

    /// The registered mappings.
    pub fn mappings(&self) -> Vec<Arc<NavigationMappingMethod>> {
        self.mappings.read().clone()
    }

    fn find(
        &self,
        context: &NavigationContext,
    ) -> Result<Option<Arc<NavigationMappingMethod>>, ConfigError> {
        let mut matches: Vec<_> = self
            .mappings
            .read()
            .iter()
            .filter(|mapping| mapping.matches(context))
            .cloned()
            .collect();
        if matches.len() > 1 {
            return Err(ConfigError::AmbiguousNavigationMapping {
                outcome: context.outcome().to_owned(),
                candidates: matches
                    .iter()
                    .map(|mapping| mapping.description().to_owned())
                    .collect(),
            });
        }
        Ok(matches.pop())
    }
}

impl NavigationOutcomeResolver for MappedNavigationOutcomeResolver {
    fn can_resolve(&self, context: &NavigationContext) -> Result<bool, BridgeError> {
        Ok(self.find(context)?.is_some())
    }

    fn resolve(
        &self,
        context: &NavigationContext,
    ) -> Result<Option<NavigationOutcome>, BridgeError> {
        let mapping = self
            .find(context)?
            .ok_or_else(|| ResolutionError::ClaimedButUnresolved {
                resolver: self.name().to_owned(),
                outcome: context.outcome().to_owned(),
            })?;
        let request_context = self.provider.require()?;
        debug!(method = mapping.description(), outcome = context.outcome(), "navigation mapped");

        let method = mapping.method();
        let target = MethodTarget::new(method.name(), method.method()).on_bean(mapping.bean());
        self.invoker.invoke_with(
            target,
            context,
            &request_context,
            &self.custom_argument_resolvers,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::BeanDefinition;
    use crate::context::{RequestContext, ThreadContextProvider};
    use crate::invocation::{Outcome, ModelMap};
    use crate::outcome::NavigationMapping;
    use crate::testing::{AlternatingFilter, RecordingNativeContextFactory};
    use navbridge_core::{StateError, Value, WebRequest};

    struct HotelsController;

    fn resolver(beans: &BeanRegistry) -> MappedNavigationOutcomeResolver {
        let resolver = MappedNavigationOutcomeResolver::new(
            Arc::new(NavigationMethodInvoker::default()),
            Arc::new(ThreadContextProvider),
        );
        resolver.on_context_refreshed(beans, &BridgeConfig::default()).unwrap();
        resolver
    }

    fn request_context() -> Arc<RequestContext> {
        RequestContext::builder(WebRequest::new("/hotels"), Value::new(()))
            .native_factory(Arc::new(RecordingNativeContextFactory::new()))
            .build()
            .unwrap()
    }

    fn navigation(outcome: &str) -> NavigationContext {
        NavigationContext::builder(Value::new(()), outcome).build()
    }

    #[test]
    fn test_mapped_method_is_invoked() {
        let beans = BeanRegistry::builder()
            .bean(BeanDefinition::global("nav", Arc::new(HotelsController)).navigation(
                "onSearch",
                NavigationMapping::new(),
                |outcome: Outcome, model: ModelMap| {
                    model.insert("searched", outcome.0);
                    "results"
                },
            ))
            .build()
            .unwrap();
        let resolver = resolver(&beans);
        let context = request_context();
        let _scope = context.enter();

        assert!(resolver.can_resolve(&navigation("search")).unwrap());
        assert!(!resolver.can_resolve(&navigation("onSearch")).unwrap());
        let outcome = resolver.resolve(&navigation("search")).unwrap().unwrap();
        assert_eq!(outcome.destination().as_name(), Some("results"));
        assert_eq!(
            outcome.implicit_model().and_then(|model| model.get_str("searched")),
            Some("search")
        );
    }

    #[test]
    fn test_ambiguous_mappings_name_candidates() {
        let beans = BeanRegistry::builder()
            .bean(
                BeanDefinition::global("nav", Arc::new(HotelsController))
                    .navigation("onSearch", NavigationMapping::new(), || "a")
                    .navigation("find", NavigationMapping::new().outcome("search"), || "b"),
            )
            .build()
            .unwrap();
        let resolver = resolver(&beans);

        match resolver.can_resolve(&navigation("search")).unwrap_err() {
            BridgeError::Config(ConfigError::AmbiguousNavigationMapping { outcome, candidates }) => {
                assert_eq!(outcome, "search");
                assert_eq!(candidates.len(), 2);
                assert!(candidates[0].starts_with("nav.onSearch ("));
                assert!(candidates[1].starts_with("nav.find ("));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_method_registration() {
        let beans = BeanRegistry::builder()
            .bean(
                BeanDefinition::global("nav", Arc::new(HotelsController))
                    .navigation("onSearch", NavigationMapping::new(), || "a")
                    .navigation("onSearch", NavigationMapping::new().outcome("find"), || "b"),
            )
            .build()
            .unwrap();
        let resolver = MappedNavigationOutcomeResolver::new(
            Arc::new(NavigationMethodInvoker::default()),
            Arc::new(ThreadContextProvider),
        );
        let err = resolver
            .on_context_refreshed(&beans, &BridgeConfig::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateMapping(_)));
        assert!(resolver.mappings().is_empty());
    }

    #[test]
    fn test_claimed_then_unmatched_is_an_internal_error() {
        let beans = BeanRegistry::builder()
            .bean(BeanDefinition::global("nav", Arc::new(HotelsController)).navigation(
                "search",
                NavigationMapping::new().filter(AlternatingFilter::new()),
                || "results",
            ))
            .build()
            .unwrap();
        let resolver = resolver(&beans);
        let context = request_context();
        let _scope = context.enter();

        assert!(resolver.can_resolve(&navigation("search")).unwrap());
        let err = resolver.resolve(&navigation("search")).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Resolution(ResolutionError::ClaimedButUnresolved { ref outcome, .. }) if outcome == "search"
        ));
    }

    #[test]
    fn test_resolve_needs_active_context() {
        let beans = BeanRegistry::builder()
            .bean(
                BeanDefinition::global("nav", Arc::new(HotelsController))
                    .navigation("search", NavigationMapping::new(), || "results"),
            )
            .build()
            .unwrap();
        let resolver = resolver(&beans);
        assert!(matches!(
            resolver.resolve(&navigation("search")),
            Err(BridgeError::State(StateError::NoActiveContext))
        ));
    }
}
