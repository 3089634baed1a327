//! Model maps and request-style parameter multimaps.

use crate::value::Value;
use indexmap::IndexMap;

/// A request-style parameter multimap.
pub type Parameters = IndexMap<String, Vec<String>>;

/// Named values handed to a view for rendering.
///
/// Keys are unique. Iteration follows insertion order so diagnostics and
/// generated URLs are stable, but no caller may rely on ordering for meaning.
#[derive(Debug, Clone, Default)]
pub struct Model {
    entries: IndexMap<String, Value>,
}

impl Model {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any existing entry under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Look up a value as a string slice.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove a value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the model has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Model {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl IntoIterator for Model {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A model fragment stored as a single value.
///
/// When a model holder is merged into a model its entries are expanded flat at
/// the point of encounter instead of being stored under a key of their own.
#[derive(Debug, Clone, Default)]
pub struct ModelHolder {
    model: Model,
}

impl ModelHolder {
    /// Wrap a model fragment.
    pub fn new(model: Model) -> Self {
        Self { model }
    }

    /// The wrapped fragment.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Unwrap the fragment.
    pub fn into_model(self) -> Model {
        self.model
    }
}

impl From<ModelHolder> for Value {
    fn from(holder: ModelHolder) -> Self {
        Value::new(holder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut model = Model::new().with("a", "1");
        assert!(model.insert("b", Value::new(2_u32)).is_none());
        assert_eq!(model.get_str("a"), Some("1"));
        assert_eq!(model.len(), 2);
        assert!(model.remove("a").is_some());
        assert!(!model.contains_key("a"));
    }

    #[test]
    fn test_holder_is_a_value() {
        let holder = ModelHolder::new(Model::new().with("m1", "v1"));
        let value: Value = holder.into();
        let back = value.downcast_ref::<ModelHolder>().unwrap();
        assert_eq!(back.model().get_str("m1"), Some("v1"));
    }
}
