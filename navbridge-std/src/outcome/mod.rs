//! # Navigation Outcome Resolution
//!
//! - [`NavigationOutcomeResolverChain`]: composes resolvers, at most one of
//!   which may claim a navigation
//! - [`ImplicitNavigationOutcomeResolver`]: `dispatch:`-prefixed outcomes name
//!   their destination directly
//! - [`MappedNavigationOutcomeResolver`]: selects a registered navigation
//!   method through its [`NavigationMapping`] and invokes it

mod chain;
mod implicit;
mod mapped;
mod mapping;

pub use chain::{NavigationOutcomeResolverChain, NavigationOutcomeResolverChainBuilder};
pub use implicit::ImplicitNavigationOutcomeResolver;
pub use mapped::MappedNavigationOutcomeResolver;
pub use mapping::{NavigationMapping, NavigationMappingFilter, NavigationMappingMethod, derive_outcome};
