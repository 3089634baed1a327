//! Navigation mappings: which navigation method handles which navigation.

use crate::bean::{BeanDefinition, BeanScope, MethodDefinition};
use crate::config::BridgeConfig;
use crate::model_builder::uncapitalize;
use indexmap::IndexSet;
use navbridge_core::{ConfigError, NavigationContext};
use std::fmt;
use std::sync::Arc;

/// An extra condition a navigation must satisfy for a mapping to apply.
///
/// Filters are created once per mapping and may keep state between calls;
/// they are not assumed to be pure.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `NavigationMappingFilter`",
    label = "missing `NavigationMappingFilter` implementation",
    note = "Closures of type `Fn(&NavigationContext) -> bool` are filters too."
)]
pub trait NavigationMappingFilter: Send + Sync {
    /// Whether the mapping applies to `context`.
    fn matches(&self, context: &NavigationContext) -> bool;
}

impl<F> NavigationMappingFilter for F
where
    F: Fn(&NavigationContext) -> bool + Send + Sync,
{
    fn matches(&self, context: &NavigationContext) -> bool {
        self(context)
    }
}

/// Declares which navigations a navigation method handles.
///
/// With no outcomes declared, the outcome is derived from the method name
/// (see [`derive_outcome`]).
#[derive(Clone, Default)]
pub struct NavigationMapping {
    outcomes: Vec<String>,
    from_action: Option<String>,
    filter: Option<Arc<dyn NavigationMappingFilter>>,
}

impl NavigationMapping {
    /// A mapping deriving its outcome from the method name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle `outcome`.
    pub fn outcome(mut self, outcome: impl Into<String>) -> Self {
        self.outcomes.push(outcome.into());
        self
    }

    /// Handle every one of `outcomes`.
    pub fn outcomes<I, S>(mut self, outcomes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outcomes.extend(outcomes.into_iter().map(Into::into));
        self
    }

    /// Only handle navigations produced by `action`.
    pub fn from_action(mut self, action: impl Into<String>) -> Self {
        self.from_action = Some(action.into());
        self
    }

    /// Only handle navigations accepted by `filter`.
    pub fn filter(mut self, filter: impl NavigationMappingFilter + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Declared outcomes.
    pub fn declared_outcomes(&self) -> &[String] {
        &self.outcomes
    }

    /// The from-action constraint.
    pub fn declared_from_action(&self) -> Option<&str> {
        self.from_action.as_deref()
    }
}

impl fmt::Debug for NavigationMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationMapping")
            .field("outcomes", &self.outcomes)
            .field("from_action", &self.from_action)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

/// Derive an outcome from a method name.
///
/// A name starting with one of `ignored_prefixes` followed by an upper case
/// letter loses the prefix and its first letter is lower-cased: `onSearch`
/// becomes `search`. Other names are kept: `search` and `online` stay as
/// they are.
pub fn derive_outcome(method: &str, ignored_prefixes: &[String]) -> String {
    ignored_prefixes
        .iter()
        .filter_map(|prefix| method.strip_prefix(prefix.as_str()))
        .find(|rest| rest.chars().next().is_some_and(char::is_uppercase))
        .map_or_else(|| method.to_owned(), uncapitalize)
}

/// A navigation method resolved against its mapping, ready for matching.
pub struct NavigationMappingMethod {
    bean: Arc<BeanDefinition>,
    method: MethodDefinition,
    outcomes: IndexSet<String>,
    from_action: Option<String>,
    filter: Option<Arc<dyn NavigationMappingFilter>>,
    description: String,
}

impl NavigationMappingMethod {
    /// Resolve the `index`th navigation method of `bean`.
    pub fn new(
        bean: &Arc<BeanDefinition>,
        index: usize,
        config: &BridgeConfig,
    ) -> Result<Self, ConfigError> {
        let definition = bean.navigation_methods().get(index).ok_or_else(|| {
            ConfigError::UnknownNavigationMethod {
                bean: bean.name().to_owned(),
                index,
            }
        })?;
        let method = definition.method().clone();
        let mapping = definition.mapping();
        let location = method.location();
        let description = format!(
            "{}.{} ({}:{})",
            bean.name(),
            method.name(),
            location.file(),
            location.line()
        );

        let outcomes: IndexSet<String> = if mapping.outcomes.is_empty() {
            std::iter::once(derive_outcome(method.name(), config.ignored_method_prefixes()))
                .filter(|outcome| !outcome.is_empty())
                .collect()
        } else {
            mapping
                .outcomes
                .iter()
                .filter(|outcome| !outcome.is_empty())
                .cloned()
                .collect()
        };
        if outcomes.is_empty() {
            return Err(ConfigError::EmptyOutcomes(description));
        }

        Ok(Self {
            bean: Arc::clone(bean),
            method,
            outcomes,
            from_action: mapping.from_action.clone(),
            filter: mapping.filter.clone(),
            description,
        })
    }

    /// Whether this method handles `context`.
    ///
    /// Checks run cheapest first: from-action, outcome, controller scope and
    /// finally the filter, which is only consulted when everything else
    /// matched.
    pub fn matches(&self, context: &NavigationContext) -> bool {
        if let Some(from_action) = &self.from_action {
            if context.from_action() != Some(from_action.as_str()) {
                return false;
            }
        }
        if !self.outcomes.contains(context.outcome()) {
            return false;
        }
        if self.bean.scope() == BeanScope::Controller {
            let controller_type = context.controller().map(|controller| controller.value_type_id());
            if controller_type != Some(self.bean.bean_type()) {
                return false;
            }
        }
        self.filter
            .as_ref()
            .is_none_or(|filter| filter.matches(context))
    }

    /// The declaring bean.
    pub fn bean(&self) -> &Arc<BeanDefinition> {
        &self.bean
    }

    /// The method.
    pub fn method(&self) -> &MethodDefinition {
        &self.method
    }

    /// Outcomes this method handles.
    pub fn outcomes(&self) -> &IndexSet<String> {
        &self.outcomes
    }

    /// The from-action constraint.
    pub fn from_action(&self) -> Option<&str> {
        self.from_action.as_deref()
    }

    /// `bean.method (file:line)`.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for NavigationMappingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationMappingMethod")
            .field("method", &self.description)
            .field("outcomes", &self.outcomes)
            .field("from_action", &self.from_action)
            .finish_non_exhaustive()
    }
}
