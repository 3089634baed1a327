//! Collaborators of the dispatch framework.
//!
//! The bridge delegates view-name resolution and data binding to the dispatch
//! framework through these traits and renders its views through [`View`].

use crate::error::{BoxError, DataError};
use crate::model::{Model, Parameters};
use crate::request::{Locale, WebRequest, WebResponse};
use std::sync::Arc;

/// A renderable dispatch-framework view.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `View`",
    label = "missing `View` implementation",
    note = "Views must implement `render` to write the response."
)]
pub trait View: Send + Sync {
    /// Render the model into the response.
    fn render(
        &self,
        model: &Model,
        request: &WebRequest,
        response: &mut WebResponse,
    ) -> Result<(), BoxError>;

    /// The content type this view produces.
    fn content_type(&self) -> Option<&str> {
        None
    }

    /// This view as a [`Bookmarkable`], when it can be reached by a plain GET.
    fn as_bookmarkable(&self) -> Option<&dyn Bookmarkable> {
        None
    }
}

/// A view that can be addressed by URL.
pub trait Bookmarkable: Send + Sync {
    /// The URL that reaches this view with `model` applied.
    fn bookmark_url(&self, model: &Model, request: &WebRequest) -> Result<String, BoxError>;
}

/// The dispatch framework's view-name resolution.
pub trait ViewResolver: Send + Sync {
    /// Resolve a logical view name, or `None` if this resolver does not know it.
    fn resolve_view_name(
        &self,
        name: &str,
        locale: &Locale,
    ) -> Result<Option<Arc<dyn View>>, BoxError>;
}

/// Rules controlling which request parameters bind onto an object.
#[derive(Debug, Clone, Default)]
pub struct DataBinder {
    object_name: String,
    allowed: Vec<String>,
    disallowed: Vec<String>,
    required: Vec<String>,
}

impl DataBinder {
    /// A binder for `object_name` that binds everything.
    pub fn new(object_name: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            ..Self::default()
        }
    }

    /// Name of the bound object.
    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    /// Restrict binding to these field patterns (`*` matches a prefix or suffix).
    pub fn set_allowed_fields<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = fields.into_iter().map(Into::into).collect();
    }

    /// Never bind these field patterns.
    pub fn set_disallowed_fields<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disallowed = fields.into_iter().map(Into::into).collect();
    }

    /// Fail binding when any of these fields is absent or empty.
    pub fn set_required_fields<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = fields.into_iter().map(Into::into).collect();
    }

    /// Whether `field` may be bound.
    pub fn is_allowed(&self, field: &str) -> bool {
        let allowed = self.allowed.is_empty()
            || self.allowed.iter().any(|pattern| matches_pattern(pattern, field));
        allowed && !self.disallowed.iter().any(|pattern| matches_pattern(pattern, field))
    }

    /// Filter `parameters` through the binding rules.
    pub fn bind(&self, parameters: &Parameters) -> Result<Parameters, DataError> {
        let bound: Parameters = parameters
            .iter()
            .filter(|(field, _)| self.is_allowed(field))
            .map(|(field, values)| (field.clone(), values.clone()))
            .collect();

        for field in &self.required {
            let present = bound
                .get(field)
                .is_some_and(|values| values.iter().any(|v| !v.is_empty()));
            if !present {
                return Err(DataError::MissingRequiredField {
                    object: self.object_name.clone(),
                    field: field.clone(),
                });
            }
        }
        Ok(bound)
    }
}

fn matches_pattern(pattern: &str, field: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix('*') {
        field.starts_with(prefix)
    } else if let Some(suffix) = pattern.strip_prefix('*') {
        field.ends_with(suffix)
    } else {
        pattern == field
    }
}

/// Creates data binders for handler method invocations.
pub trait BinderFactory: Send + Sync {
    /// Create a binder for `object_name` in the context of `request`.
    fn create_binder(&self, request: &WebRequest, object_name: &str)
    -> Result<DataBinder, BoxError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameters() -> Parameters {
        let mut parameters = Parameters::new();
        parameters.insert("name".into(), vec!["Ritz".into()]);
        parameters.insert("admin".into(), vec!["true".into()]);
        parameters.insert("address.city".into(), vec!["Paris".into()]);
        parameters
    }

    #[test]
    fn test_disallowed_fields_are_filtered() {
        let mut binder = DataBinder::new("hotel");
        binder.set_disallowed_fields(["admin"]);
        let bound = binder.bind(&parameters()).unwrap();
        assert!(bound.contains_key("name"));
        assert!(!bound.contains_key("admin"));
    }

    #[test]
    fn test_allowed_patterns() {
        let mut binder = DataBinder::new("hotel");
        binder.set_allowed_fields(["address.*"]);
        let bound = binder.bind(&parameters()).unwrap();
        assert_eq!(bound.len(), 1);
        assert!(bound.contains_key("address.city"));
    }

    #[test]
    fn test_missing_required_field() {
        let mut binder = DataBinder::new("hotel");
        binder.set_required_fields(["stars"]);
        let err = binder.bind(&parameters()).unwrap_err();
        assert!(matches!(err, DataError::MissingRequiredField { ref field, .. } if field == "stars"));
    }
}
