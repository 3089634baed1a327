//! # Model Builder
//!
//! Merges model contributions from several sources into a single [`Model`].
//!
//! Contributors are added most authoritative first. Once a key is present,
//! later contributions for the same key are dropped. Every drop is recorded as
//! a [`DroppedEntry`] and logged at `debug`.
//!
//! # Contributor Shapes
//!
//! | Method                                           | Source                     |
//! |--------------------------------------------------|----------------------------|
//! | [`add_component_parameters`](ModelBuilder::add_component_parameters) | component parameter children |
//! | [`add_map`](ModelBuilder::add_map)               | already materialised values |
//! | [`add_parameters`](ModelBuilder::add_parameters) | request-style multimap     |
//! | [`add_holder`](ModelBuilder::add_holder)         | a nested model fragment    |
//!
//! A [`ModelHolder`] met through any of these is expanded flat at the point of
//! encounter. Its entries are never evaluated as expressions.

use navbridge_core::{
    ComponentRef, DataError, ExpressionResolver, Model, ModelHolder, Parameters, Value,
};
use tracing::debug;

/// Why a contribution did not make it into the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// A more authoritative contributor already supplied the key.
    Shadowed,
    /// A request parameter had this many values where one was expected.
    MultiValued(usize),
    /// The component parameter is disabled.
    Disabled,
    /// The contribution had no value.
    NoValue,
}

/// A contribution that was not merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedEntry {
    /// Model key of the contribution.
    pub key: String,
    /// Why it was dropped.
    pub reason: DropReason,
}

/// Builds a model from ordered contributors with first-write-wins precedence.
pub struct ModelBuilder<'a> {
    model: Model,
    dropped: Vec<DroppedEntry>,
    expressions: Option<&'a dyn ExpressionResolver>,
}

impl Default for ModelBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ModelBuilder<'a> {
    /// A builder that never evaluates expressions.
    pub fn new() -> Self {
        Self {
            model: Model::new(),
            dropped: Vec::new(),
            expressions: None,
        }
    }

    /// A builder that can evaluate expression strings in map contributions.
    pub fn with_expressions(expressions: &'a dyn ExpressionResolver) -> Self {
        Self {
            expressions: Some(expressions),
            ..Self::new()
        }
    }

    /// Add the parameter children of a component.
    ///
    /// Values are taken literally. They were evaluated when the component tree
    /// was built and evaluating them again would run user supplied markup.
    pub fn add_component_parameters(&mut self, component: &ComponentRef) -> &mut Self {
        for parameter in component.parameters() {
            let key = match (parameter.name(), parameter.value()) {
                (Some(name), _) => name.to_owned(),
                (None, Some(value)) => variable_name(value.type_name()),
                (None, None) => String::new(),
            };
            if parameter.is_disabled() {
                self.record_drop(key, DropReason::Disabled);
                continue;
            }
            match parameter.value() {
                Some(value) => self.put(&key, value.clone()),
                None => self.record_drop(key, DropReason::NoValue),
            }
        }
        self
    }

    /// Add every entry of `map`.
    ///
    /// With `resolve_expressions`, string values that look like `#{...}` are
    /// evaluated first. Keys already present are skipped without evaluating.
    pub fn add_map(&mut self, map: &Model, resolve_expressions: bool) -> Result<&mut Self, DataError> {
        for (key, value) in map.iter() {
            if value.is::<ModelHolder>() {
                self.put(key, value.clone());
                continue;
            }
            if self.model.contains_key(key) {
                self.record_drop(key.to_owned(), DropReason::Shadowed);
                continue;
            }
            let expression = value
                .as_str()
                .filter(|text| resolve_expressions && is_expression(text));
            match (expression, self.expressions) {
                (Some(expression), Some(expressions)) => {
                    let evaluated =
                        expressions
                            .evaluate(expression)
                            .map_err(|source| DataError::Expression {
                                expression: expression.to_owned(),
                                source,
                            })?;
                    match evaluated {
                        Some(evaluated) => self.put(key, evaluated),
                        None => self.record_drop(key.to_owned(), DropReason::NoValue),
                    }
                }
                _ => self.put(key, value.clone()),
            }
        }
        Ok(self)
    }

    /// Add request-style parameters. Only single-valued entries are promoted.
    pub fn add_parameters(&mut self, parameters: &Parameters) -> &mut Self {
        for (key, values) in parameters {
            match values.as_slice() {
                [value] => self.put(key, Value::from(value.as_str())),
                [] => self.record_drop(key.clone(), DropReason::NoValue),
                many => self.record_drop(key.clone(), DropReason::MultiValued(many.len())),
            }
        }
        self
    }

    /// Expand a model holder into the model.
    pub fn add_holder(&mut self, holder: &ModelHolder) -> &mut Self {
        self.expand(holder.model());
        self
    }

    /// The model merged so far.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Contributions dropped so far.
    pub fn dropped(&self) -> &[DroppedEntry] {
        &self.dropped
    }

    /// Finish and return the model.
    pub fn build(self) -> Model {
        self.model
    }

    /// Finish and return the model together with every drop.
    pub fn into_parts(self) -> (Model, Vec<DroppedEntry>) {
        (self.model, self.dropped)
    }

    fn put(&mut self, key: &str, value: Value) {
        if let Some(holder) = value.downcast_ref::<ModelHolder>() {
            self.expand(holder.model());
            return;
        }
        if self.model.contains_key(key) {
            self.record_drop(key.to_owned(), DropReason::Shadowed);
            return;
        }
        self.model.insert(key, value);
    }

    fn expand(&mut self, model: &Model) {
        for (key, value) in model.iter() {
            self.put(key, value.clone());
        }
    }

    fn record_drop(&mut self, key: String, reason: DropReason) {
        debug!(key = %key, reason = ?reason, "model contribution dropped");
        self.dropped.push(DroppedEntry { key, reason });
    }
}

/// Whether `text` looks like a `#{...}` expression.
///
/// Only checks for an opening `#{` with a `}` somewhere after it.
pub fn is_expression(text: &str) -> bool {
    text.find("#{")
        .is_some_and(|start| text[start + 2..].contains('}'))
}

/// Derive a model key from a type name.
///
/// `my_app::Hotel` becomes `hotel`, `Vec<Hotel>` becomes `hotelList`, and
/// smart pointers are looked through.
pub fn variable_name(type_name: &str) -> String {
    let (base, argument) = split_generic(type_name);
    let short = base
        .rsplit("::")
        .next()
        .unwrap_or(base)
        .trim_start_matches('&');
    match (short, argument) {
        ("Arc" | "Rc" | "Box", Some(inner)) => variable_name(inner),
        ("Vec" | "VecDeque" | "HashSet" | "BTreeSet" | "IndexSet", Some(inner)) => {
            format!("{}List", variable_name(inner))
        }
        _ => uncapitalize(short),
    }
}

fn split_generic(type_name: &str) -> (&str, Option<&str>) {
    match type_name.find('<') {
        Some(open) if type_name.ends_with('>') => (
            &type_name[..open],
            Some(&type_name[open + 1..type_name.len() - 1]),
        ),
        _ => (type_name, None),
    }
}

pub(crate) fn uncapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubExpressionResolver;
    use navbridge_core::UiParameter;

    struct Hotel;
    struct Button;

    #[test]
    fn test_first_contributor_wins() {
        let a = Model::new().with("x", Value::new(1_i32));
        let b = Model::new()
            .with("x", Value::new(2_i32))
            .with("y", Value::new(2_i32));

        let mut builder = ModelBuilder::new();
        builder.add_map(&a, false).unwrap();
        builder.add_map(&b, false).unwrap();

        assert_eq!(builder.dropped(), [DroppedEntry {
            key: "x".into(),
            reason: DropReason::Shadowed,
        }]);
        let model = builder.build();
        assert_eq!(model.len(), 2);
        assert_eq!(model.get("x").and_then(|v| v.downcast_ref::<i32>()), Some(&1));
        assert_eq!(model.get("y").and_then(|v| v.downcast_ref::<i32>()), Some(&2));
    }

    #[test]
    fn test_holder_expands_flat() {
        let existing = Model::new().with("m1", "existing");
        let holder = ModelHolder::new(Model::new().with("m1", "v1").with("m2", "v2"));
        let contributor = Model::new().with("holder", holder);

        let mut builder = ModelBuilder::new();
        builder.add_map(&existing, false).unwrap();
        builder.add_map(&contributor, false).unwrap();
        let model = builder.build();

        assert_eq!(model.len(), 2);
        assert_eq!(model.get_str("m1"), Some("existing"));
        assert_eq!(model.get_str("m2"), Some("v2"));
        assert!(!model.contains_key("holder"));
    }

    #[test]
    fn test_nested_holder_is_not_evaluated() {
        let expressions = StubExpressionResolver::new().with("#{hotel}", Value::new(Hotel));
        let inner = ModelHolder::new(Model::new().with("h", "#{hotel}"));
        let outer = ModelHolder::new(Model::new().with("inner", inner));

        let mut builder = ModelBuilder::with_expressions(&expressions);
        builder.add_map(&Model::new().with("outer", outer), true).unwrap();

        assert_eq!(builder.model().get_str("h"), Some("#{hotel}"));
        assert!(expressions.evaluated().is_empty());
    }

    #[test]
    fn test_component_values_are_literal() {
        let expressions = StubExpressionResolver::new().with("#{expression}", Value::new(Hotel));
        let component = ComponentRef::new("form:go", Button)
            .with_parameter(UiParameter::named("p", "#{expression}"));

        let mut builder = ModelBuilder::with_expressions(&expressions);
        builder.add_component_parameters(&component);
        builder
            .add_map(&Model::new().with("q", "#{expression}"), true)
            .unwrap();
        let model = builder.build();

        assert_eq!(model.get_str("p"), Some("#{expression}"));
        assert!(model.get("q").unwrap().is::<Hotel>());
        assert_eq!(expressions.evaluated(), ["#{expression}".to_owned()]);
    }

    #[test]
    fn test_component_parameter_names() {
        let component = ComponentRef::new("form:go", Button)
            .with_parameter(UiParameter::unnamed(Value::new(Hotel)))
            .with_parameter(UiParameter::unnamed(Value::new(vec![Hotel])))
            .with_parameter(UiParameter::named("skip", "x").disabled());

        let mut builder = ModelBuilder::new();
        builder.add_component_parameters(&component);

        assert!(builder.model().get("hotel").unwrap().is::<Hotel>());
        assert!(builder.model().contains_key("hotelList"));
        assert!(!builder.model().contains_key("skip"));
        assert_eq!(builder.dropped()[0].reason, DropReason::Disabled);
    }

    #[test]
    fn test_multi_valued_parameters_are_dropped() {
        let mut parameters = Parameters::new();
        parameters.insert("q".into(), vec!["paris".into()]);
        parameters.insert("tag".into(), vec!["a".into(), "b".into()]);

        let mut builder = ModelBuilder::new();
        builder.add_parameters(&parameters);
        let (model, dropped) = builder.into_parts();

        assert_eq!(model.get_str("q"), Some("paris"));
        assert!(!model.contains_key("tag"));
        assert_eq!(dropped, [DroppedEntry {
            key: "tag".into(),
            reason: DropReason::MultiValued(2),
        }]);
    }

    #[test]
    fn test_expression_detection() {
        assert!(is_expression("#{hotel.name}"));
        assert!(is_expression("Hello #{user}!"));
        assert!(!is_expression("#{unterminated"));
        assert!(!is_expression("}{#"));
        assert!(!is_expression("plain"));
    }

    #[test]
    fn test_expression_failure_is_reported() {
        let expressions = StubExpressionResolver::new();
        let mut builder = ModelBuilder::with_expressions(&expressions);
        let err = builder
            .add_map(&Model::new().with("q", "#{missing}"), true)
            .err()
            .unwrap();
        assert!(matches!(err, DataError::Expression { ref expression, .. } if expression == "#{missing}"));
    }

    #[test]
    fn test_variable_names() {
        assert_eq!(variable_name("my_app::model::Hotel"), "hotel");
        assert_eq!(variable_name("alloc::vec::Vec<my_app::Hotel>"), "hotelList");
        assert_eq!(variable_name("alloc::sync::Arc<my_app::Hotel>"), "hotel");
        assert_eq!(variable_name("alloc::string::String"), "string");
    }
}
