use navbridge_core::{
    BridgeError, Destination, DestinationViewResolver, Locale, View, ViewResolver,
};
use std::sync::Arc;
use tracing::trace;

/// Tries destination view resolvers in order; the first view wins.
///
/// Destinations that already are views pass through untouched.
pub struct DestinationViewResolverChain {
    resolvers: Vec<Arc<dyn DestinationViewResolver>>,
}

impl DestinationViewResolverChain {
    /// Start an empty chain.
    pub fn builder() -> DestinationViewResolverChainBuilder {
        DestinationViewResolverChainBuilder {
            resolvers: Vec::new(),
        }
    }

    /// Number of resolvers.
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Whether the chain has no resolvers.
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl DestinationViewResolver for DestinationViewResolverChain {
    fn resolve_destination(
        &self,
        destination: &Destination,
        locale: &Locale,
    ) -> Result<Option<Arc<dyn View>>, BridgeError> {
        if let Destination::View(view) = destination {
            return Ok(Some(Arc::clone(view)));
        }
        for (index, resolver) in self.resolvers.iter().enumerate() {
            if let Some(view) = resolver.resolve_destination(destination, locale)? {
                trace!(%destination, resolver = index, "destination resolved");
                return Ok(Some(view));
            }
        }
        Ok(None)
    }
}

/// Builder for [`DestinationViewResolverChain`].
pub struct DestinationViewResolverChainBuilder {
    resolvers: Vec<Arc<dyn DestinationViewResolver>>,
}

impl DestinationViewResolverChainBuilder {
    /// Append a resolver. Earlier resolvers take priority.
    pub fn resolver(mut self, resolver: Arc<dyn DestinationViewResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Build the chain.
    pub fn build(self) -> DestinationViewResolverChain {
        DestinationViewResolverChain {
            resolvers: self.resolvers,
        }
    }
}

/// Hands named destinations to the dispatch framework's view resolvers.
pub struct ViewResolverAdapter {
    resolvers: Vec<Arc<dyn ViewResolver>>,
}

impl ViewResolverAdapter {
    /// Delegate to `resolvers`, first match wins.
    pub fn new(resolvers: Vec<Arc<dyn ViewResolver>>) -> Self {
        Self { resolvers }
    }
}

impl DestinationViewResolver for ViewResolverAdapter {
    fn resolve_destination(
        &self,
        destination: &Destination,
        locale: &Locale,
    ) -> Result<Option<Arc<dyn View>>, BridgeError> {
        let Some(name) = destination.as_name() else {
            return Ok(None);
        };
        for resolver in &self.resolvers {
            if let Some(view) = resolver
                .resolve_view_name(name, locale)
                .map_err(BridgeError::Custom)?
            {
                return Ok(Some(view));
            }
        }
        Ok(None)
    }
}
