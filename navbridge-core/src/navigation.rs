//! Navigation attempts and their outcomes.

use crate::component::{ComponentRef, UiEvent};
use crate::dispatch::View;
use crate::model::{Model, Parameters};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Where a navigation leads.
///
/// Destinations are deliberately loose: a view-framework view id, a
/// dispatch-framework view name, a method-reference token and a prefixed
/// redirect are all plain names, and interpreting them is left to the
/// destination view resolvers.
#[derive(Clone)]
pub enum Destination {
    /// A name or token, interpreted by the destination view resolvers.
    Name(String),
    /// An already resolved dispatch-framework view.
    View(Arc<dyn View>),
    /// A resolver-specific marker object.
    Other(Value),
}

impl Destination {
    /// The name, if this is a [`Destination::Name`].
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Destination::Name(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Destination::View(_) => f.write_str("View(..)"),
            Destination::Other(value) => f.debug_tuple("Other").field(value).finish(),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Name(name) => f.write_str(name),
            Destination::View(_) => f.write_str("<view>"),
            Destination::Other(value) => write!(f, "<{}>", value.type_name()),
        }
    }
}

impl From<String> for Destination {
    fn from(name: String) -> Self {
        Destination::Name(name)
    }
}

impl From<&str> for Destination {
    fn from(name: &str) -> Self {
        Destination::Name(name.to_owned())
    }
}

impl From<Arc<dyn View>> for Destination {
    fn from(view: Arc<dyn View>) -> Self {
        Destination::View(view)
    }
}

/// The result of resolving a navigation.
#[derive(Debug, Clone)]
pub struct NavigationOutcome {
    destination: Destination,
    parameters: Option<Parameters>,
    implicit_model: Option<Model>,
}

impl NavigationOutcome {
    /// An outcome with no parameters.
    pub fn new(destination: impl Into<Destination>) -> Self {
        Self {
            destination: destination.into(),
            parameters: None,
            implicit_model: None,
        }
    }

    /// An outcome carrying request-style parameters.
    pub fn with_parameters(destination: impl Into<Destination>, parameters: Parameters) -> Self {
        Self {
            destination: destination.into(),
            parameters: Some(parameters),
            implicit_model: None,
        }
    }

    /// Attach the model accumulated while resolving. Empty models are dropped.
    pub fn with_implicit_model(mut self, model: Model) -> Self {
        self.implicit_model = (!model.is_empty()).then_some(model);
        self
    }

    /// Where to go.
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Parameters for the destination.
    pub fn parameters(&self) -> Option<&Parameters> {
        self.parameters.as_ref()
    }

    /// Model accumulated while resolving.
    pub fn implicit_model(&self) -> Option<&Model> {
        self.implicit_model.as_ref()
    }
}

/// One navigation attempt.
///
/// A fresh context is built for the pre-emptive check (made while rendering
/// links, before any action runs) and again for the real navigation after the
/// action fired. Contexts are immutable.
#[derive(Debug, Clone)]
pub struct NavigationContext {
    handler: Value,
    controller: Option<Value>,
    from_action: Option<String>,
    outcome: String,
    preemptive: bool,
    originating_event: Option<UiEvent>,
    component: Option<ComponentRef>,
}

impl NavigationContext {
    /// Start building a context for `outcome` under `handler`.
    pub fn builder(handler: Value, outcome: impl Into<String>) -> NavigationContextBuilder {
        NavigationContextBuilder {
            handler,
            controller: None,
            from_action: None,
            outcome: outcome.into(),
            preemptive: false,
            originating_event: None,
            component: None,
        }
    }

    /// The dispatch-framework handler serving the request.
    pub fn handler(&self) -> &Value {
        &self.handler
    }

    /// The controller bean behind the handler, if any.
    pub fn controller(&self) -> Option<&Value> {
        self.controller.as_ref()
    }

    /// The action expression that produced the outcome.
    pub fn from_action(&self) -> Option<&str> {
        self.from_action.as_deref()
    }

    /// The outcome string.
    pub fn outcome(&self) -> &str {
        &self.outcome
    }

    /// Whether this is the check made before any action listener ran.
    pub fn is_preemptive(&self) -> bool {
        self.preemptive
    }

    /// The UI event captured most recently before this navigation.
    pub fn originating_event(&self) -> Option<&UiEvent> {
        self.originating_event.as_ref()
    }

    /// The component that triggered the navigation.
    pub fn component(&self) -> Option<&ComponentRef> {
        self.component.as_ref()
    }
}

/// Builder for [`NavigationContext`].
pub struct NavigationContextBuilder {
    handler: Value,
    controller: Option<Value>,
    from_action: Option<String>,
    outcome: String,
    preemptive: bool,
    originating_event: Option<UiEvent>,
    component: Option<ComponentRef>,
}

impl NavigationContextBuilder {
    /// Set the controller.
    pub fn controller(mut self, controller: Option<Value>) -> Self {
        self.controller = controller;
        self
    }

    /// Set the originating action expression.
    pub fn from_action(mut self, from_action: Option<&str>) -> Self {
        self.from_action = from_action.map(str::to_owned);
        self
    }

    /// Mark the context as pre-emptive.
    pub fn preemptive(mut self, preemptive: bool) -> Self {
        self.preemptive = preemptive;
        self
    }

    /// Attach the originating event.
    pub fn originating_event(mut self, event: Option<UiEvent>) -> Self {
        self.originating_event = event;
        self
    }

    /// Attach the triggering component.
    pub fn component(mut self, component: Option<ComponentRef>) -> Self {
        self.component = component;
        self
    }

    /// Build the context. The component defaults to the event's source.
    pub fn build(self) -> NavigationContext {
        let component = self.component.or_else(|| {
            self.originating_event
                .as_ref()
                .and_then(|event| event.source().cloned())
        });
        NavigationContext {
            handler: self.handler,
            controller: self.controller,
            from_action: self.from_action,
            outcome: self.outcome,
            preemptive: self.preemptive,
            originating_event: self.originating_event,
            component,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Button;

    #[test]
    fn test_component_defaults_to_event_source() {
        let event = UiEvent::action(ComponentRef::new("form:search", Button));
        let context = NavigationContext::builder(Value::new(()), "search")
            .originating_event(Some(event))
            .build();
        assert_eq!(context.component().map(ComponentRef::id), Some("form:search"));
        assert!(!context.is_preemptive());
        assert_eq!(context.from_action(), None);
    }

    #[test]
    fn test_empty_implicit_model_is_dropped() {
        let outcome = NavigationOutcome::new("results").with_implicit_model(Model::new());
        assert!(outcome.implicit_model().is_none());
        assert!(outcome.parameters().is_none());
        assert_eq!(outcome.destination().as_name(), Some("results"));
    }
}
