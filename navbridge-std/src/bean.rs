//! # Bean Registry
//!
//! Beans are registered explicitly at startup together with the methods the
//! bridge cares about:
//!
//! - **navigation methods**, selected by [`NavigationMapping`]s and invoked to
//!   resolve navigations
//! - **handler methods**, the dispatch framework's request-mapped methods,
//!   which method-reference destinations point at
//! - **init-binder methods**, run before a data binder is used
//!
//! Every registration records its call site, which stands in for the method's
//! location in diagnostics.
//!
//! ```rust,ignore
//! let beans = BeanRegistry::builder()
//!     .bean(
//!         BeanDefinition::controller("hotelsController", Arc::new(HotelsController))
//!             .navigation("onSearch", NavigationMapping::new(), |q: Outcome| "results")
//!             .request_mapping("show", "/hotels/{id}"),
//!     )
//!     .build()?;
//! ```

use crate::invocation::{IntoNavigationMethod, NavigationMethod};
use crate::outcome::NavigationMapping;
use indexmap::IndexMap;
use navbridge_core::{ConfigError, Value};
use std::any::{Any, TypeId};
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// How far a bean's navigation mappings reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeanScope {
    /// Mappings apply only while this bean is the controller handling the
    /// request.
    Controller,
    /// Mappings apply to every request.
    Global,
}

/// A registered method.
#[derive(Clone)]
pub struct MethodDefinition {
    name: String,
    method: Arc<dyn NavigationMethod>,
    location: &'static Location<'static>,
}

impl MethodDefinition {
    /// The method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The method.
    pub fn method(&self) -> &dyn NavigationMethod {
        &*self.method
    }

    /// A shared handle to the method.
    pub fn method_arc(&self) -> Arc<dyn NavigationMethod> {
        Arc::clone(&self.method)
    }

    /// Where the method was registered.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

impl fmt::Debug for MethodDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDefinition")
            .field("name", &self.name)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// A navigation method and the mapping selecting it.
#[derive(Debug, Clone)]
pub struct NavigationMethodDefinition {
    method: MethodDefinition,
    mapping: NavigationMapping,
}

impl NavigationMethodDefinition {
    /// The method.
    pub fn method(&self) -> &MethodDefinition {
        &self.method
    }

    /// The mapping.
    pub fn mapping(&self) -> &NavigationMapping {
        &self.mapping
    }
}

/// A dispatch-framework handler method.
#[derive(Debug, Clone)]
pub struct HandlerMethodDefinition {
    name: String,
    path: Option<String>,
    location: &'static Location<'static>,
}

impl HandlerMethodDefinition {
    /// The method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The URI template of its request mapping, if it has one.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Where the method was registered.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

/// A bean and the methods the bridge knows about.
pub struct BeanDefinition {
    name: String,
    instance: Value,
    scope: BeanScope,
    navigation: Vec<NavigationMethodDefinition>,
    handlers: Vec<HandlerMethodDefinition>,
    init_binders: Vec<MethodDefinition>,
}

impl BeanDefinition {
    /// A controller bean. Its navigation mappings apply only while it handles
    /// the request.
    pub fn controller<T: Any + Send + Sync>(name: impl Into<String>, instance: Arc<T>) -> Self {
        Self::new(name.into(), Value::from_arc(instance), BeanScope::Controller)
    }

    /// A global bean. Its navigation mappings apply to every request.
    pub fn global<T: Any + Send + Sync>(name: impl Into<String>, instance: Arc<T>) -> Self {
        Self::new(name.into(), Value::from_arc(instance), BeanScope::Global)
    }

    fn new(name: String, instance: Value, scope: BeanScope) -> Self {
        Self {
            name,
            instance,
            scope,
            navigation: Vec::new(),
            handlers: Vec::new(),
            init_binders: Vec::new(),
        }
    }

    /// Register a navigation method.
    #[track_caller]
    pub fn navigation<Args>(
        mut self,
        name: impl Into<String>,
        mapping: NavigationMapping,
        method: impl IntoNavigationMethod<Args>,
    ) -> Self {
        self.navigation.push(NavigationMethodDefinition {
            method: MethodDefinition {
                name: name.into(),
                method: method.into_navigation_method(),
                location: Location::caller(),
            },
            mapping,
        });
        self
    }

    /// Register a request-mapped handler method.
    #[track_caller]
    pub fn request_mapping(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.handlers.push(HandlerMethodDefinition {
            name: name.into(),
            path: Some(path.into()),
            location: Location::caller(),
        });
        self
    }

    /// Register a handler method without a request mapping.
    #[track_caller]
    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.handlers.push(HandlerMethodDefinition {
            name: name.into(),
            path: None,
            location: Location::caller(),
        });
        self
    }

    /// Register an init-binder method.
    #[track_caller]
    pub fn init_binder<Args>(
        mut self,
        name: impl Into<String>,
        method: impl IntoNavigationMethod<Args>,
    ) -> Self {
        self.init_binders.push(MethodDefinition {
            name: name.into(),
            method: method.into_navigation_method(),
            location: Location::caller(),
        });
        self
    }

    /// The bean name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bean instance.
    pub fn instance(&self) -> &Value {
        &self.instance
    }

    /// `TypeId` of the bean instance.
    pub fn bean_type(&self) -> TypeId {
        self.instance.value_type_id()
    }

    /// The scope.
    pub fn scope(&self) -> BeanScope {
        self.scope
    }

    /// Navigation methods in registration order.
    pub fn navigation_methods(&self) -> &[NavigationMethodDefinition] {
        &self.navigation
    }

    /// Handler methods in registration order.
    pub fn handler_methods(&self) -> &[HandlerMethodDefinition] {
        &self.handlers
    }

    /// Init-binder methods in registration order.
    pub fn init_binders(&self) -> &[MethodDefinition] {
        &self.init_binders
    }
}

impl fmt::Debug for BeanDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanDefinition")
            .field("name", &self.name)
            .field("type", &self.instance.type_name())
            .field("scope", &self.scope)
            .field("navigation", &self.navigation.len())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Every bean known to the bridge, by name.
#[derive(Debug, Default)]
pub struct BeanRegistry {
    beans: IndexMap<String, Arc<BeanDefinition>>,
}

impl BeanRegistry {
    /// Start registering beans.
    pub fn builder() -> BeanRegistryBuilder {
        BeanRegistryBuilder { beans: Vec::new() }
    }

    /// Look a bean up by name.
    pub fn find(&self, name: &str) -> Option<&Arc<BeanDefinition>> {
        self.beans.get(name)
    }

    /// Find the bean whose instance is `instance`.
    pub fn find_by_instance(&self, instance: &Value) -> Option<&Arc<BeanDefinition>> {
        self.beans
            .values()
            .find(|bean| bean.instance().ptr_eq(instance))
    }

    /// Beans in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<BeanDefinition>> {
        self.beans.values()
    }

    /// Number of beans.
    pub fn len(&self) -> usize {
        self.beans.len()
    }

    /// Whether no bean is registered.
    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }
}

/// Builder for [`BeanRegistry`].
pub struct BeanRegistryBuilder {
    beans: Vec<BeanDefinition>,
}

impl BeanRegistryBuilder {
    /// Register a bean.
    pub fn bean(mut self, bean: BeanDefinition) -> Self {
        self.beans.push(bean);
        self
    }

    /// Register every bean submitted through [`CollectedNavigationMapping`](crate::collected::CollectedNavigationMapping).
    #[cfg(feature = "inventory")]
    pub fn collected(mut self) -> Self {
        self.beans.extend(crate::collected::collect_beans());
        self
    }

    /// Freeze the registry. Bean names must be unique.
    pub fn build(self) -> Result<BeanRegistry, ConfigError> {
        let mut beans = IndexMap::with_capacity(self.beans.len());
        for bean in self.beans {
            if beans.contains_key(bean.name()) {
                return Err(ConfigError::DuplicateBean(bean.name.clone()));
            }
            beans.insert(bean.name.clone(), Arc::new(bean));
        }
        Ok(BeanRegistry { beans })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct HotelsController;
    struct Audit;

    #[test]
    fn test_registration_records_call_site() {
        let bean = BeanDefinition::controller("hotelsController", Arc::new(HotelsController))
            .navigation("onSearch", NavigationMapping::new(), || "results")
            .request_mapping("show", "/hotels/{id}")
            .method("helper");

        let navigation = &bean.navigation_methods()[0];
        assert_eq!(navigation.method().name(), "onSearch");
        assert!(navigation.method().location().file().ends_with("bean.rs"));
        assert_eq!(bean.handler_methods()[0].path(), Some("/hotels/{id}"));
        assert_eq!(bean.handler_methods()[1].path(), None);
        assert_eq!(bean.scope(), BeanScope::Controller);
    }

    #[test]
    fn test_lookup_by_name_and_instance() {
        let audit = Arc::new(Audit);
        let registry = BeanRegistry::builder()
            .bean(BeanDefinition::controller("hotelsController", Arc::new(HotelsController)))
            .bean(BeanDefinition::global("audit", Arc::clone(&audit)))
            .build()
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.find("hotelsController").is_some());
        let found = registry.find_by_instance(&Value::from_arc(audit)).unwrap();
        assert_eq!(found.name(), "audit");
        assert!(registry.find_by_instance(&Value::new(Audit)).is_none());
    }

    #[test]
    fn test_duplicate_bean_names() {
        let err = BeanRegistry::builder()
            .bean(BeanDefinition::global("audit", Arc::new(Audit)))
            .bean(BeanDefinition::global("audit", Arc::new(Audit)))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateBean(ref name) if name == "audit"));
    }
}
