//! # Navigation Method Invocation
//!
//! Navigation methods are plain closures registered ahead of time. Invoking
//! one runs two ordered pipelines, first match wins in both:
//!
//! 1. **Argument resolution**: every [`Parameter`] of the method is offered to
//!    the [`ArgumentResolver`]s (per-call custom resolvers first, then the
//!    configured ones).
//! 2. **Return value handling**: the [`ReturnValue`] is offered to the
//!    [`ReturnValueHandler`]s.
//!
//! The result is either a [`NavigationOutcome`](navbridge_core::NavigationOutcome)
//! carrying the model the method accumulated, or nothing, when the method
//! stayed on the current view or wrote the response itself.

mod argument;
mod invoker;
mod method;
mod parameter;
mod return_value;

pub use argument::{
    ArgumentResolver, BeanArgumentResolver, BinderArgumentResolver, Invocation,
    ModelArgumentResolver, NativeArgumentResolver, NavigationArgumentResolver,
    RequestArgumentResolver, find_by_type, standard_argument_resolvers,
};
pub use invoker::{InvocationContainer, InvokerBuilder, MethodTarget, NavigationMethodInvoker};
pub use method::{IntoNavigationMethod, NavigationMethod};
pub use parameter::{
    Bean, Binder, BoundParameters, Component, Custom, ModelAttribute, ModelMap, Native,
    NativeContextRef, NavigationArgument, Outcome, Parameter, ParameterKind, Request, Response,
    ViewModel,
};
pub use return_value::{
    DestinationReturnValueHandler, IntoReturnValue, OutcomeReturnValueHandler,
    ResponseWritten, ResponseWrittenReturnValueHandler, ReturnValue, ReturnValueHandler,
    VoidReturnValueHandler, standard_return_value_handlers,
};
