//! Return value handling for navigation methods.
//!
//! Whatever a navigation method returns is converted into a [`ReturnValue`]
//! and offered to the return value handlers in order; the first that
//! [`supports`](ReturnValueHandler::supports) it records its effect in the
//! [`InvocationContainer`].

use super::invoker::InvocationContainer;
use navbridge_core::{
    BoxError, BridgeError, Destination, NavigationOutcome, ResolutionError, Value, View,
};
use std::sync::Arc;

/// Marker returned by a method that wrote the response itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseWritten;

/// What a navigation method produced.
#[derive(Debug, Clone)]
pub enum ReturnValue {
    /// Nothing; stay on the current view.
    Void,
    /// Navigate to a destination.
    Destination(Destination),
    /// A complete outcome.
    Outcome(NavigationOutcome),
    /// The response has been written; stop.
    ResponseWritten,
    /// Anything else, left to custom handlers.
    Other(Value),
}

impl ReturnValue {
    fn describe(&self) -> String {
        match self {
            ReturnValue::Void => "()".to_owned(),
            ReturnValue::Destination(destination) => format!("destination {destination}"),
            ReturnValue::Outcome(outcome) => format!("outcome {}", outcome.destination()),
            ReturnValue::ResponseWritten => "ResponseWritten".to_owned(),
            ReturnValue::Other(value) => value.type_name().to_owned(),
        }
    }
}

/// Conversion of method results into [`ReturnValue`]s.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be returned from a navigation method",
    label = "not convertible into a `ReturnValue`",
    note = "Return `()`, a view name, a `Destination`, a `NavigationOutcome`, `ResponseWritten`, or wrap the value in `Value`."
)]
pub trait IntoReturnValue {
    /// Convert. Errors are raised by the method itself.
    fn into_return_value(self) -> Result<ReturnValue, BoxError>;
}

impl IntoReturnValue for ReturnValue {
    fn into_return_value(self) -> Result<ReturnValue, BoxError> {
        Ok(self)
    }
}

impl IntoReturnValue for () {
    fn into_return_value(self) -> Result<ReturnValue, BoxError> {
        Ok(ReturnValue::Void)
    }
}

impl IntoReturnValue for String {
    fn into_return_value(self) -> Result<ReturnValue, BoxError> {
        Ok(ReturnValue::Destination(Destination::Name(self)))
    }
}

impl IntoReturnValue for &'static str {
    fn into_return_value(self) -> Result<ReturnValue, BoxError> {
        Ok(ReturnValue::Destination(Destination::from(self)))
    }
}

impl IntoReturnValue for Destination {
    fn into_return_value(self) -> Result<ReturnValue, BoxError> {
        Ok(ReturnValue::Destination(self))
    }
}

impl IntoReturnValue for Arc<dyn View> {
    fn into_return_value(self) -> Result<ReturnValue, BoxError> {
        Ok(ReturnValue::Destination(Destination::View(self)))
    }
}

impl IntoReturnValue for NavigationOutcome {
    fn into_return_value(self) -> Result<ReturnValue, BoxError> {
        Ok(ReturnValue::Outcome(self))
    }
}

impl IntoReturnValue for ResponseWritten {
    fn into_return_value(self) -> Result<ReturnValue, BoxError> {
        Ok(ReturnValue::ResponseWritten)
    }
}

impl IntoReturnValue for Value {
    fn into_return_value(self) -> Result<ReturnValue, BoxError> {
        Ok(ReturnValue::Other(self))
    }
}

impl<T: IntoReturnValue> IntoReturnValue for Option<T> {
    fn into_return_value(self) -> Result<ReturnValue, BoxError> {
        match self {
            Some(value) => value.into_return_value(),
            None => Ok(ReturnValue::Void),
        }
    }
}

impl<T, E> IntoReturnValue for Result<T, E>
where
    T: IntoReturnValue,
    E: Into<BoxError>,
{
    fn into_return_value(self) -> Result<ReturnValue, BoxError> {
        match self {
            Ok(value) => value.into_return_value(),
            Err(err) => Err(err.into()),
        }
    }
}

/// Applies a return value to the invocation container.
pub trait ReturnValueHandler: Send + Sync {
    /// Whether this handler accepts `value`.
    fn supports(&self, value: &ReturnValue) -> bool;

    /// Record the effect of `value`.
    fn handle(
        &self,
        value: ReturnValue,
        container: &mut InvocationContainer,
    ) -> Result<(), BridgeError>;
}

/// Accepts `()`: stay on the current view.
#[derive(Debug, Default)]
pub struct VoidReturnValueHandler;

impl ReturnValueHandler for VoidReturnValueHandler {
    fn supports(&self, value: &ReturnValue) -> bool {
        matches!(value, ReturnValue::Void)
    }

    fn handle(&self, _: ReturnValue, _: &mut InvocationContainer) -> Result<(), BridgeError> {
        Ok(())
    }
}

/// Accepts [`ResponseWritten`].
#[derive(Debug, Default)]
pub struct ResponseWrittenReturnValueHandler;

impl ReturnValueHandler for ResponseWrittenReturnValueHandler {
    fn supports(&self, value: &ReturnValue) -> bool {
        matches!(value, ReturnValue::ResponseWritten)
    }

    fn handle(&self, _: ReturnValue, container: &mut InvocationContainer) -> Result<(), BridgeError> {
        container.mark_handled();
        Ok(())
    }
}

/// Accepts destinations.
#[derive(Debug, Default)]
pub struct DestinationReturnValueHandler;

impl ReturnValueHandler for DestinationReturnValueHandler {
    fn supports(&self, value: &ReturnValue) -> bool {
        matches!(value, ReturnValue::Destination(_))
    }

    fn handle(
        &self,
        value: ReturnValue,
        container: &mut InvocationContainer,
    ) -> Result<(), BridgeError> {
        if let ReturnValue::Destination(destination) = value {
            container.set_destination(destination);
        }
        Ok(())
    }
}

/// Accepts complete outcomes. Their model joins the invocation's model
/// without overwriting it.
#[derive(Debug, Default)]
pub struct OutcomeReturnValueHandler;

impl ReturnValueHandler for OutcomeReturnValueHandler {
    fn supports(&self, value: &ReturnValue) -> bool {
        matches!(value, ReturnValue::Outcome(_))
    }

    fn handle(
        &self,
        value: ReturnValue,
        container: &mut InvocationContainer,
    ) -> Result<(), BridgeError> {
        if let ReturnValue::Outcome(outcome) = value {
            if let Some(model) = outcome.implicit_model() {
                container.merge_model(model);
            }
            if let Some(parameters) = outcome.parameters() {
                container.set_parameters(parameters.clone());
            }
            container.set_destination(outcome.destination().clone());
        }
        Ok(())
    }
}

/// The standard handlers in their default order.
pub fn standard_return_value_handlers() -> Vec<Arc<dyn ReturnValueHandler>> {
    vec![
        Arc::new(VoidReturnValueHandler),
        Arc::new(ResponseWrittenReturnValueHandler),
        Arc::new(DestinationReturnValueHandler),
        Arc::new(OutcomeReturnValueHandler),
    ]
}

pub(crate) fn unsupported(value: &ReturnValue) -> ResolutionError {
    ResolutionError::UnsupportedReturnValue(value.describe())
}

#[cfg(test)]
mod tests {
    use super::*;
    use navbridge_core::Model;

    #[test]
    fn test_conversions() {
        assert!(matches!(().into_return_value(), Ok(ReturnValue::Void)));
        assert!(matches!(
            "results".into_return_value(),
            Ok(ReturnValue::Destination(Destination::Name(ref name))) if name == "results"
        ));
        assert!(matches!(None::<String>.into_return_value(), Ok(ReturnValue::Void)));
        assert!(matches!(
            ResponseWritten.into_return_value(),
            Ok(ReturnValue::ResponseWritten)
        ));
    }

    #[test]
    fn test_result_error_propagates() {
        let result: Result<&'static str, std::io::Error> =
            Err(std::io::Error::other("hotel service down"));
        let err = result.into_return_value().unwrap_err();
        assert_eq!(err.to_string(), "hotel service down");
    }

    #[test]
    fn test_outcome_handler_keeps_invocation_model() {
        let mut container = InvocationContainer::new();
        container.model().lock().insert("x", "mine");
        let outcome = NavigationOutcome::new("results")
            .with_implicit_model(Model::new().with("x", "theirs").with("y", "2"));

        OutcomeReturnValueHandler
            .handle(ReturnValue::Outcome(outcome), &mut container)
            .unwrap();

        let model = container.model().lock().clone();
        assert_eq!(model.get_str("x"), Some("mine"));
        assert_eq!(model.get_str("y"), Some("2"));
        assert_eq!(container.destination().and_then(Destination::as_name), Some("results"));
    }
}
