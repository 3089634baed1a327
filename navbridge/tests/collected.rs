#![cfg(feature = "inventory")]

use navbridge::{
    BeanDefinition, BeanRegistry, BridgeConfig, CollectedNavigationMapping, inventory,
    outcome::{MappedNavigationOutcomeResolver, NavigationMapping},
};
use std::sync::Arc;

struct ReportsController;

fn reports() -> BeanDefinition {
    BeanDefinition::global("reports", Arc::new(ReportsController)).navigation(
        "onExport",
        NavigationMapping::new(),
        || "redirect:/reports/export",
    )
}

inventory::submit! {
    CollectedNavigationMapping { bean: reports }
}

#[test]
fn test_submitted_beans_are_collected() {
    let beans = BeanRegistry::builder().collected().build().unwrap();
    let bean = beans.find("reports").unwrap();
    assert_eq!(bean.navigation_methods().len(), 1);

    let resolver = MappedNavigationOutcomeResolver::new(
        Arc::default(),
        Arc::new(navbridge::ThreadContextProvider),
    );
    resolver
        .on_context_refreshed(&beans, &BridgeConfig::default())
        .unwrap();
    let mappings = resolver.mappings();
    assert_eq!(mappings.len(), 1);
    assert!(mappings[0].outcomes().contains("export"));
}
