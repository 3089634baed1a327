//! # Parameter Extractors
//!
//! A navigation method is a plain closure whose parameters are extractor
//! types. Each extractor describes itself as a [`Parameter`]; the argument
//! resolver pipeline turns that description into a [`Value`], and the
//! extractor converts the value back into itself.
//!
//! ```rust,ignore
//! BeanDefinition::controller("hotels", Arc::new(HotelsController))
//!     .navigation("onBook", NavigationMapping::new(), |hotel: ModelAttribute<Hotel>, model: ModelMap| {
//!         model.insert("hotelId", hotel.id.to_string());
//!         "@book"
//!     });
//! ```
//!
//! Wrap any extractor in `Option` to make it optional.

use crate::context::{NativeContextHandle, RequestContext};
use navbridge_core::{
    ComponentRef, DataBinder, Locale, Model, NativeContext, NavigationContext, Parameters, Value,
    WebRequest,
};
use parking_lot::{Mutex, MutexGuard};
use std::any::{Any, TypeId};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// What an argument resolver is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// The [`NavigationContext`] itself.
    NavigationContext,
    /// The outcome string.
    Outcome,
    /// The component that triggered the navigation.
    Component,
    /// The bean declaring the method.
    Bean,
    /// A value of the view's model, looked up by type.
    ModelAttribute,
    /// The whole model of the current view.
    ViewModel,
    /// The model accumulated by this invocation.
    ModelMap,
    /// The data binder.
    Binder,
    /// Request parameters filtered through the data binder.
    BoundParameters,
    /// The request.
    Request,
    /// The view framework's native context.
    NativeContext,
    /// Direct access to the response.
    Response,
    /// The request locale.
    Locale,
    /// A framework-native object attached to the request.
    Native,
    /// Left to custom argument resolvers.
    Custom,
}

/// Description of one navigation method parameter.
#[derive(Debug, Clone, Copy)]
pub struct Parameter {
    index: usize,
    kind: ParameterKind,
    target: TypeId,
    type_name: &'static str,
    optional: bool,
}

impl Parameter {
    /// Describe a parameter of `kind` targeting values of type `T`.
    pub fn new<T: Any + ?Sized>(kind: ParameterKind) -> Self {
        Self {
            index: 0,
            kind,
            target: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            optional: false,
        }
    }

    /// Set the position in the method signature.
    pub fn at(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Mark the parameter as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Zero based position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// What is asked for.
    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    /// `TypeId` of the target value type.
    pub fn target(&self) -> TypeId {
        self.target
    }

    /// Name of the target value type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether a missing value is acceptable.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether the target type is `T`.
    pub fn targets<T: Any + ?Sized>(&self) -> bool {
        self.target == TypeId::of::<T>()
    }
}

/// A type usable as a navigation method parameter.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be used as a navigation method parameter",
    label = "not a navigation argument",
    note = "Use one of the extractors in `navbridge_std::invocation`, or `Custom<T>` with a custom argument resolver."
)]
pub trait NavigationArgument: Sized + Send + 'static {
    /// Describe the parameter.
    fn parameter() -> Parameter;

    /// Convert a resolved value. `None` if the value has the wrong type.
    fn from_value(value: Value) -> Option<Self>;

    /// The argument to use when nothing was resolved, if any.
    fn missing() -> Option<Self> {
        None
    }
}

impl<A: NavigationArgument> NavigationArgument for Option<A> {
    fn parameter() -> Parameter {
        A::parameter().optional()
    }

    fn from_value(value: Value) -> Option<Self> {
        A::from_value(value).map(Some)
    }

    fn missing() -> Option<Self> {
        Some(None)
    }
}

impl NavigationArgument for NavigationContext {
    fn parameter() -> Parameter {
        Parameter::new::<NavigationContext>(ParameterKind::NavigationContext)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.downcast_ref::<NavigationContext>().cloned()
    }
}

impl NavigationArgument for ComponentRef {
    fn parameter() -> Parameter {
        Parameter::new::<ComponentRef>(ParameterKind::Component)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.downcast_ref::<ComponentRef>().cloned()
    }
}

impl NavigationArgument for Locale {
    fn parameter() -> Parameter {
        Parameter::new::<Locale>(ParameterKind::Locale)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.downcast_ref::<Locale>().cloned()
    }
}

/// The outcome string being navigated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome(pub String);

impl NavigationArgument for Outcome {
    fn parameter() -> Parameter {
        Parameter::new::<String>(ParameterKind::Outcome)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_str().map(|outcome| Outcome(outcome.to_owned()))
    }
}

macro_rules! shared_extractor {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        pub struct $name<T>(pub Arc<T>);

        impl<T> Deref for $name<T> {
            type Target = T;

            fn deref(&self) -> &T {
                &self.0
            }
        }

        impl<T> Clone for $name<T> {
            fn clone(&self) -> Self {
                Self(Arc::clone(&self.0))
            }
        }

        impl<T: fmt::Debug> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.0).finish()
            }
        }

        impl<T: Any + Send + Sync> NavigationArgument for $name<T> {
            fn parameter() -> Parameter {
                Parameter::new::<T>(ParameterKind::$kind)
            }

            fn from_value(value: Value) -> Option<Self> {
                value.downcast::<T>().map($name)
            }
        }
    };
}

shared_extractor!(
    /// The component that triggered the navigation, when it is a `T`.
    Component => Component
);
shared_extractor!(
    /// The bean declaring the navigation method.
    Bean => Bean
);
shared_extractor!(
    /// The unique value of type `T` in the current view's model.
    ModelAttribute => ModelAttribute
);
shared_extractor!(
    /// A framework-native object attached to the request.
    Native => Native
);
shared_extractor!(
    /// A value supplied by a custom argument resolver.
    Custom => Custom
);

/// The model of the current view, empty if it has none.
#[derive(Debug, Clone, Default)]
pub struct ViewModel(pub Model);

impl NavigationArgument for ViewModel {
    fn parameter() -> Parameter {
        Parameter::new::<Model>(ParameterKind::ViewModel)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.downcast_ref::<Model>().cloned().map(ViewModel)
    }

    fn missing() -> Option<Self> {
        Some(ViewModel::default())
    }
}

/// The model accumulated by this invocation.
///
/// Entries added here travel with the resulting outcome and take part in
/// building the destination's model.
#[derive(Debug, Clone)]
pub struct ModelMap(Arc<Mutex<Model>>);

impl ModelMap {
    /// Add an entry, replacing any entry under the same key.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.lock().insert(key, value);
    }

    /// Look up an entry.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.lock().get(key).cloned()
    }

    /// A copy of the model as it stands.
    pub fn snapshot(&self) -> Model {
        self.0.lock().clone()
    }
}

impl NavigationArgument for ModelMap {
    fn parameter() -> Parameter {
        Parameter::new::<Mutex<Model>>(ParameterKind::ModelMap)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.downcast::<Mutex<Model>>().map(ModelMap)
    }
}

/// The data binder of this invocation.
#[derive(Debug, Clone)]
pub struct Binder(Arc<Mutex<DataBinder>>);

impl Binder {
    /// Lock the binder for configuration or use.
    pub fn lock(&self) -> MutexGuard<'_, DataBinder> {
        self.0.lock()
    }
}

impl NavigationArgument for Binder {
    fn parameter() -> Parameter {
        Parameter::new::<Mutex<DataBinder>>(ParameterKind::Binder)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.downcast::<Mutex<DataBinder>>().map(Binder)
    }
}

/// Request parameters that passed the data binder's rules.
#[derive(Debug, Clone, Default)]
pub struct BoundParameters(pub Parameters);

impl NavigationArgument for BoundParameters {
    fn parameter() -> Parameter {
        Parameter::new::<Parameters>(ParameterKind::BoundParameters)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.downcast_ref::<Parameters>().cloned().map(BoundParameters)
    }
}

/// The request being served.
#[derive(Debug, Clone)]
pub struct Request(pub WebRequest);

impl NavigationArgument for Request {
    fn parameter() -> Parameter {
        Parameter::new::<WebRequest>(ParameterKind::Request)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.downcast_ref::<WebRequest>().cloned().map(Request)
    }
}

/// A counted reference to the view framework's native context.
#[derive(Debug, Clone)]
pub struct NativeContextRef(Arc<NativeContextHandle>);

impl Deref for NativeContextRef {
    type Target = dyn NativeContext;

    fn deref(&self) -> &Self::Target {
        &**self.0
    }
}

impl NavigationArgument for NativeContextRef {
    fn parameter() -> Parameter {
        Parameter::new::<NativeContextHandle>(ParameterKind::NativeContext)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.downcast::<NativeContextHandle>().map(NativeContextRef)
    }
}

/// Direct access to the response.
///
/// Writing anything ends navigation: no outcome is produced and the view
/// framework is told the response is complete.
#[derive(Debug, Clone)]
pub struct Response(Arc<RequestContext>);

impl Response {
    /// Append body content.
    pub fn write(&self, content: &str) {
        self.0.with_response(|response| response.write(content));
    }

    /// Set a header.
    pub fn set_header(&self, name: &str, value: &str) {
        self.0.with_response(|response| response.set_header(name, value));
    }

    /// Send a redirect.
    pub fn send_redirect(&self, location: &str) {
        self.0.with_response(|response| response.send_redirect(location));
    }
}

impl NavigationArgument for Response {
    fn parameter() -> Parameter {
        Parameter::new::<RequestContext>(ParameterKind::Response)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.downcast::<RequestContext>().map(Response)
    }
}
