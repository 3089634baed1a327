//! Bean definitions submitted through `inventory`.
//!
//! Any crate linked into the application can contribute a bean without the
//! startup code naming it:
//!
//! ```rust,ignore
//! fn hotels() -> BeanDefinition {
//!     BeanDefinition::controller("hotelsController", Arc::new(HotelsController))
//!         .navigation("onSearch", NavigationMapping::new().outcome("search"), search)
//! }
//!
//! navbridge::inventory::submit! {
//!     CollectedNavigationMapping { bean: hotels }
//! }
//! ```
//!
//! [`BeanRegistryBuilder::collected`](crate::bean::BeanRegistryBuilder::collected)
//! gathers every submission.

use crate::bean::BeanDefinition;

/// A bean definition submitted for collection at startup.
pub struct CollectedNavigationMapping {
    /// Builds the bean definition.
    pub bean: fn() -> BeanDefinition,
}

inventory::collect!(CollectedNavigationMapping);

/// Build every submitted bean definition.
pub(crate) fn collect_beans() -> Vec<BeanDefinition> {
    let beans: Vec<_> = inventory::iter::<CollectedNavigationMapping>()
        .map(|collected| (collected.bean)())
        .collect();
    tracing::debug!(count = beans.len(), "collected bean definitions");
    beans
}
