//! Navigation methods: closures taking extractor parameters.

use super::parameter::{NavigationArgument, Parameter};
use super::return_value::{IntoReturnValue, ReturnValue};
use navbridge_core::{BridgeError, DataError, Value};
use std::marker::PhantomData;
use std::sync::Arc;

/// A type-erased navigation method.
pub trait NavigationMethod: Send + Sync {
    /// Parameter descriptions, in signature order.
    fn parameters(&self) -> &[Parameter];

    /// Call the method with one resolved value per parameter.
    ///
    /// `method` names the method in error messages.
    fn invoke(&self, method: &str, arguments: Vec<Option<Value>>)
    -> Result<ReturnValue, BridgeError>;
}

/// Conversion of closures into [`NavigationMethod`]s.
///
/// Implemented for `Fn` closures of up to twelve [`NavigationArgument`]
/// parameters returning anything [`IntoReturnValue`]. `Args` is inferred from
/// the closure signature; annotate closure parameter types.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a navigation method",
    label = "parameters must be navigation arguments and the result must implement `IntoReturnValue`",
    note = "Annotate every closure parameter with an extractor type, e.g. `|context: NavigationContext| ...`."
)]
pub trait IntoNavigationMethod<Args>: Send + Sync + 'static {
    /// Erase the method.
    fn into_navigation_method(self) -> Arc<dyn NavigationMethod>;
}

struct MethodFn<F, Args> {
    f: F,
    parameters: Vec<Parameter>,
    _marker: PhantomData<fn(Args)>,
}

fn bind<A: NavigationArgument>(
    method: &str,
    index: usize,
    value: Option<Value>,
) -> Result<A, DataError> {
    match value {
        Some(value) => {
            let found = value.type_name();
            A::from_value(value).ok_or_else(|| DataError::ArgumentType {
                method: method.to_owned(),
                index,
                type_name: std::any::type_name::<A>(),
                found,
            })
        }
        None => A::missing().ok_or_else(|| DataError::MissingArgument {
            method: method.to_owned(),
            index,
            type_name: std::any::type_name::<A>(),
        }),
    }
}

macro_rules! impl_navigation_method {
    ($($T:ident),*) => {
        impl<F, R, $($T,)*> NavigationMethod for MethodFn<F, ($($T,)*)>
        where
            F: Fn($($T),*) -> R + Send + Sync + 'static,
            R: IntoReturnValue,
            $($T: NavigationArgument,)*
        {
            fn parameters(&self) -> &[Parameter] {
                &self.parameters
            }

            #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
            fn invoke(
                &self,
                method: &str,
                arguments: Vec<Option<Value>>,
            ) -> Result<ReturnValue, BridgeError> {
                let mut arguments = arguments.into_iter();
                let mut index = 0usize;
                $(
                    let $T = bind::<$T>(method, index, arguments.next().flatten())?;
                    index += 1;
                )*
                (self.f)($($T),*)
                    .into_return_value()
                    .map_err(BridgeError::Custom)
            }
        }

        impl<F, R, $($T,)*> IntoNavigationMethod<($($T,)*)> for F
        where
            F: Fn($($T),*) -> R + Send + Sync + 'static,
            R: IntoReturnValue + 'static,
            $($T: NavigationArgument,)*
        {
            #[allow(unused_mut)]
            fn into_navigation_method(self) -> Arc<dyn NavigationMethod> {
                let mut parameters = Vec::new();
                $(
                    parameters.push($T::parameter().at(parameters.len()));
                )*
                Arc::new(MethodFn {
                    f: self,
                    parameters,
                    _marker: PhantomData,
                })
            }
        }
    };
}

impl_navigation_method!();
impl_navigation_method!(T1);
impl_navigation_method!(T1, T2);
impl_navigation_method!(T1, T2, T3);
impl_navigation_method!(T1, T2, T3, T4);
impl_navigation_method!(T1, T2, T3, T4, T5);
impl_navigation_method!(T1, T2, T3, T4, T5, T6);
impl_navigation_method!(T1, T2, T3, T4, T5, T6, T7);
impl_navigation_method!(T1, T2, T3, T4, T5, T6, T7, T8);
impl_navigation_method!(T1, T2, T3, T4, T5, T6, T7, T8, T9);
impl_navigation_method!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10);
impl_navigation_method!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
impl_navigation_method!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12);
