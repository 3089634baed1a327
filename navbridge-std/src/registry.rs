//! # Synthetic Key Registries
//!
//! The view framework only ever passes view ids around. A registry hands out
//! a prefixed key for a rich value so that the key can travel through a view
//! id slot and be turned back into the value later in the same request.
//!
//! Keys have the form `<prefix><ordinal>`. The ordinal increases with every
//! `put`, so keys are unique within the registry. Lookups reject anything not
//! carrying the registry's prefix, which keeps real view ids from ever being
//! mistaken for synthetic ones.

use navbridge_core::{ComponentRef, Destination, Model, NavigationOutcome, Parameters};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Key prefix of the outcome registry.
pub const OUTCOME_KEY_PREFIX: &str = "navbridge-outcome:";

/// Key prefix of the destination registry.
pub const DESTINATION_KEY_PREFIX: &str = "navbridge-destination:";

/// A request-scoped table of values addressed by synthetic keys.
pub struct SyntheticRegistry<T> {
    prefix: &'static str,
    entries: Mutex<Vec<Arc<T>>>,
}

impl<T> SyntheticRegistry<T> {
    /// Create an empty registry handing out keys with `prefix`.
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Store a value and return its key.
    pub fn put(&self, value: T) -> String {
        self.put_arc(Arc::new(value))
    }

    /// Store an already shared value and return its key.
    pub fn put_arc(&self, value: Arc<T>) -> String {
        let mut entries = self.entries.lock();
        let key = format!("{}{}", self.prefix, entries.len());
        entries.push(value);
        debug!(key = %key, "registered synthetic key");
        key
    }

    /// Look up a key. Unknown keys and keys of other registries yield `None`.
    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        let ordinal = self.ordinal(key)?;
        let value = self.entries.lock().get(ordinal).cloned();
        debug!(key, found = value.is_some(), "synthetic key lookup");
        value
    }

    /// Whether `key` carries this registry's prefix.
    pub fn owns(&self, key: &str) -> bool {
        key.starts_with(self.prefix)
    }

    /// The key prefix.
    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ordinal(&self, key: &str) -> Option<usize> {
        let suffix = key.strip_prefix(self.prefix)?;
        let ordinal: usize = suffix.parse().ok()?;
        // "+1" and "01" parse, but were never handed out.
        (ordinal.to_string() == suffix).then_some(ordinal)
    }
}

impl<T> std::fmt::Debug for SyntheticRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntheticRegistry")
            .field("prefix", &self.prefix)
            .field("len", &self.len())
            .finish()
    }
}

/// Registry of resolved navigation outcomes.
pub type OutcomeRegistry = SyntheticRegistry<NavigationOutcome>;

/// Registry of destinations paired with the model to render them with.
pub type DestinationRegistry = SyntheticRegistry<DestinationAndModel>;

/// A destination handed over by a component that can only pass strings.
#[derive(Debug, Clone)]
pub struct DestinationAndModel {
    destination: Destination,
    model: Option<Model>,
    parameters: Option<Parameters>,
    component: Option<ComponentRef>,
}

impl DestinationAndModel {
    /// A destination without a model.
    pub fn new(destination: impl Into<Destination>) -> Self {
        Self {
            destination: destination.into(),
            model: None,
            parameters: None,
            component: None,
        }
    }

    /// The destination, implicit model and parameters of `outcome`.
    pub fn from_outcome(outcome: &NavigationOutcome) -> Self {
        Self {
            destination: outcome.destination().clone(),
            model: outcome.implicit_model().cloned(),
            parameters: outcome.parameters().cloned(),
            component: None,
        }
    }

    /// Attach a model.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = Some(model);
        self
    }

    /// Attach request-style parameters.
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Attach the component whose parameters contribute to the model.
    pub fn with_component(mut self, component: ComponentRef) -> Self {
        self.component = Some(component);
        self
    }

    /// The destination.
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// The model.
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// The parameters.
    pub fn parameters(&self) -> Option<&Parameters> {
        self.parameters.as_ref()
    }

    /// The contributing component.
    pub fn component(&self) -> Option<&ComponentRef> {
        self.component.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_returns_same_instance() {
        let registry = OutcomeRegistry::new(OUTCOME_KEY_PREFIX);
        let outcome = Arc::new(NavigationOutcome::new("results"));
        let key = registry.put_arc(Arc::clone(&outcome));
        assert!(key.starts_with(OUTCOME_KEY_PREFIX));
        let found = registry.get(&key).unwrap();
        assert!(Arc::ptr_eq(&outcome, &found));
    }

    #[test]
    fn test_keys_are_unique() {
        let registry = OutcomeRegistry::new(OUTCOME_KEY_PREFIX);
        let a = registry.put(NavigationOutcome::new("a"));
        let b = registry.put(NavigationOutcome::new("a"));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unrecognised_keys() {
        let registry = OutcomeRegistry::new(OUTCOME_KEY_PREFIX);
        let key = registry.put(NavigationOutcome::new("results"));
        let suffix = key.strip_prefix(OUTCOME_KEY_PREFIX).unwrap();

        assert!(registry.get("/results.xhtml").is_none());
        assert!(registry.get(&format!("{DESTINATION_KEY_PREFIX}{suffix}")).is_none());
        assert!(registry.get(&format!("{OUTCOME_KEY_PREFIX}7")).is_none());
        assert!(registry.get(&format!("{OUTCOME_KEY_PREFIX}0{suffix}")).is_none());
        assert!(registry.get(&format!("{OUTCOME_KEY_PREFIX}x")).is_none());
    }

    #[test]
    fn test_destination_registry() {
        let registry = DestinationRegistry::new(DESTINATION_KEY_PREFIX);
        let key = registry.put(
            DestinationAndModel::new("@show").with_model(Model::new().with("id", "4")),
        );
        assert!(registry.owns(&key));
        let entry = registry.get(&key).unwrap();
        assert_eq!(entry.destination().as_name(), Some("@show"));
        assert_eq!(entry.model().and_then(|m| m.get_str("id")), Some("4"));
    }
}
