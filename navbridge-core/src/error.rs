//! Error types for navbridge.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`BridgeError`] - Top-level error type for all bridge operations
//! - [`ConfigError`] - Wiring mistakes, surfaced at startup or first use
//! - [`ResolutionError`] - A strategy claimed work it could not complete
//! - [`StateError`] - Operations on a released or busy request context
//! - [`DataError`] - Values a binding required but could not obtain

use thiserror::Error;

/// A boxed error type for dynamic error handling.
///
/// Collaborator traits of both host frameworks report failures as `BoxError`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all bridge operations.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The bridge was wired inconsistently.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A resolver claimed a navigation or destination and then failed it.
    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// The request context could not perform the operation in its current state.
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// A binding required a value that was not available.
    #[error("data error: {0}")]
    Data(#[from] DataError),

    /// An error raised by a host framework collaborator or a handler method.
    #[error(transparent)]
    Custom(BoxError),
}

/// Wiring mistakes. These are never resolved by tie-breaking.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// More than one outcome resolver claimed the same navigation.
    #[error("outcome '{outcome}' is claimed by more than one resolver: {resolvers:?}")]
    DuplicateResolver {
        /// The outcome string being navigated.
        outcome: String,
        /// Names of every resolver that claimed it.
        resolvers: Vec<String>,
    },

    /// More than one navigation mapping method matched the same navigation.
    #[error("ambiguous navigation mapping for outcome '{outcome}': {candidates:?}")]
    AmbiguousNavigationMapping {
        /// The outcome string being navigated.
        outcome: String,
        /// Locations of every matching method.
        candidates: Vec<String>,
    },

    /// A method reference named several request-mapped methods.
    #[error("ambiguous handler method '{method}' on bean '{bean}': {candidates:?}")]
    AmbiguousHandlerMethod {
        /// Bean the reference points at.
        bean: String,
        /// Method name from the reference.
        method: String,
        /// Locations of every eligible method.
        candidates: Vec<String>,
    },

    /// A method reference named no request-mapped method.
    #[error("no request mapped method '{method}' on bean '{bean}'")]
    UnknownHandlerMethod {
        /// Bean the reference points at.
        bean: String,
        /// Method name from the reference.
        method: String,
    },

    /// A navigation method index past the end of the bean's methods.
    #[error("bean '{bean}' has no navigation method at index {index}")]
    UnknownNavigationMethod {
        /// The bean.
        bean: String,
        /// The requested index.
        index: usize,
    },

    /// No bean is registered under the name.
    #[error("no bean named '{0}'")]
    UnknownBean(String),

    /// A method reference omitted the bean and no controller is active.
    #[error("method reference '{0}' names no bean and no controller is handling the request")]
    NoCurrentBean(String),

    /// Two beans were registered under the same name.
    #[error("bean '{0}' is registered more than once")]
    DuplicateBean(String),

    /// A navigation mapping ended up with an empty outcome set.
    #[error("navigation mapping {0} declares no outcomes")]
    EmptyOutcomes(String),

    /// The same bean method was registered as a navigation mapping twice.
    #[error("navigation mapping {0} is registered more than once")]
    DuplicateMapping(String),

    /// A required collaborator was not supplied.
    #[error("missing required collaborator: {0}")]
    MissingCollaborator(&'static str),
}

/// Internal-consistency failures during resolution.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// `resolve` was called for a navigation that no resolver claims.
    #[error("no resolver claims outcome '{0}'")]
    NotClaimed(String),

    /// A resolver claimed a navigation but found nothing to resolve it with.
    #[error("resolver {resolver} claimed outcome '{outcome}' but found no mapping for it")]
    ClaimedButUnresolved {
        /// The claiming resolver.
        resolver: String,
        /// The outcome string being navigated.
        outcome: String,
    },

    /// No argument resolver supports a handler method parameter.
    #[error("no argument resolver supports parameter {index} ({type_name}) of {method}")]
    UnsupportedParameter {
        /// The method being invoked.
        method: String,
        /// Zero based parameter position.
        index: usize,
        /// Declared parameter type.
        type_name: &'static str,
    },

    /// No return value handler accepts what a handler method returned.
    #[error("no return value handler supports {0}")]
    UnsupportedReturnValue(String),

    /// A destination was recognised but could not be turned into a view.
    #[error("unable to resolve destination {destination}: {reason}")]
    Destination {
        /// Description of the destination.
        destination: String,
        /// Why it failed.
        reason: String,
    },
}

/// Request context misuse.
#[derive(Error, Debug)]
pub enum StateError {
    /// The context has been released.
    #[error("{0} has been released")]
    Released(String),

    /// A render was requested while another render was in flight.
    #[error("{context} is already rendering '{in_flight}', unable to render '{requested}'")]
    NestedRender {
        /// Name of the context.
        context: String,
        /// Artifact currently being rendered.
        in_flight: String,
        /// Artifact that was requested.
        requested: String,
    },

    /// An operation needed the current request context and none was active.
    #[error("no request context is active")]
    NoActiveContext,
}

/// Missing or unusable data for a binding that requires it.
#[derive(Error, Debug)]
pub enum DataError {
    /// A required handler argument resolved to nothing.
    #[error("missing required argument {index} ({type_name}) of {method}")]
    MissingArgument {
        /// The method being invoked.
        method: String,
        /// Zero based parameter position.
        index: usize,
        /// Declared parameter type.
        type_name: &'static str,
    },

    /// A resolved argument had a different type than the parameter.
    #[error("argument {index} of {method} resolved to {found}, expected {type_name}")]
    ArgumentType {
        /// The method being invoked.
        method: String,
        /// Zero based parameter position.
        index: usize,
        /// Declared parameter type.
        type_name: &'static str,
        /// Type of the resolved value.
        found: &'static str,
    },

    /// More than one model entry has the requested type.
    #[error("ambiguous model lookup for {type_name}: candidate keys {keys:?}")]
    AmbiguousModelType {
        /// The requested type.
        type_name: &'static str,
        /// Keys of every entry of that type.
        keys: Vec<String>,
    },

    /// A URI template variable had no model value.
    #[error("no model value for URI template variable '{variable}' in '{template}'")]
    MissingTemplateVariable {
        /// The template being expanded.
        template: String,
        /// The missing variable.
        variable: String,
    },

    /// An expression could not be evaluated.
    #[error("unable to evaluate expression '{expression}'")]
    Expression {
        /// The expression text.
        expression: String,
        /// Evaluator failure.
        #[source]
        source: BoxError,
    },

    /// A required field was absent while binding request parameters.
    #[error("required field '{field}' is missing while binding '{object}'")]
    MissingRequiredField {
        /// Name of the bound object.
        object: String,
        /// The missing field.
        field: String,
    },
}

impl From<BoxError> for BridgeError {
    fn from(err: BoxError) -> Self {
        BridgeError::Custom(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_render_names_both_artifacts() {
        let err = StateError::NestedRender {
            context: "RequestContext[/hotels]".into(),
            in_flight: "/search.xhtml".into(),
            requested: "/results.xhtml".into(),
        };
        let message = err.to_string();
        assert!(message.contains("/search.xhtml"));
        assert!(message.contains("/results.xhtml"));
    }

    #[test]
    fn test_box_error_converts_to_custom() {
        let boxed: BoxError = "collaborator failed".into();
        let err = BridgeError::from(boxed);
        assert!(matches!(err, BridgeError::Custom(_)));
        assert_eq!(err.to_string(), "collaborator failed");
    }
}
