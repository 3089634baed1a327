//! Argument resolution for navigation methods.
//!
//! Resolvers are tried in order and the first one that
//! [`supports`](ArgumentResolver::supports) a parameter resolves it. A
//! resolver returning `Ok(None)` means "no value"; whether that is acceptable
//! is decided by the parameter's extractor.

use super::invoker::{InvocationContainer, NavigationMethodInvoker};
use super::parameter::{Parameter, ParameterKind};
use crate::bean::BeanDefinition;
use crate::context::RequestContext;
use crate::model_builder::variable_name;
use navbridge_core::{
    BridgeError, ComponentRef, DataBinder, DataError, Model, NavigationContext, Value,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Everything an argument resolver may draw on.
#[derive(Clone, Copy)]
pub struct Invocation<'a> {
    pub(crate) invoker: &'a NavigationMethodInvoker,
    pub(crate) method: &'a str,
    pub(crate) navigation: &'a NavigationContext,
    pub(crate) context: &'a Arc<RequestContext>,
    pub(crate) bean: Option<&'a BeanDefinition>,
    pub(crate) container: &'a InvocationContainer,
    pub(crate) custom: &'a [Arc<dyn ArgumentResolver>],
}

impl<'a> Invocation<'a> {
    /// Name of the method being invoked.
    pub fn method(&self) -> &'a str {
        self.method
    }

    /// The navigation being resolved.
    pub fn navigation(&self) -> &'a NavigationContext {
        self.navigation
    }

    /// The request context.
    pub fn request_context(&self) -> &'a Arc<RequestContext> {
        self.context
    }

    /// The bean declaring the method.
    pub fn bean(&self) -> Option<&'a BeanDefinition> {
        self.bean
    }

    /// The model accumulated by this invocation.
    pub fn implicit_model(&self) -> &'a Arc<Mutex<Model>> {
        self.container.model()
    }

    /// The model of the view currently shown, if it has one.
    pub fn view_model(&self) -> Result<Option<Model>, BridgeError> {
        let native = self.context.acquire_native()?;
        Ok(native
            .view_root()
            .and_then(|root| root.model().cloned()))
    }

    /// The data binder, created on first use.
    pub fn binder(&self) -> Result<Arc<Mutex<DataBinder>>, BridgeError> {
        self.invoker.binder(self)
    }
}

/// Resolves navigation method parameters.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `ArgumentResolver`",
    label = "missing `ArgumentResolver` implementation"
)]
pub trait ArgumentResolver: Send + Sync {
    /// Whether this resolver handles `parameter`.
    fn supports(&self, parameter: &Parameter) -> bool;

    /// Produce the argument value.
    fn resolve(
        &self,
        parameter: &Parameter,
        invocation: &Invocation<'_>,
    ) -> Result<Option<Value>, BridgeError>;
}

/// Resolves the navigation context, the outcome and the originating component.
#[derive(Debug, Default)]
pub struct NavigationArgumentResolver;

impl ArgumentResolver for NavigationArgumentResolver {
    fn supports(&self, parameter: &Parameter) -> bool {
        matches!(
            parameter.kind(),
            ParameterKind::NavigationContext | ParameterKind::Outcome | ParameterKind::Component
        )
    }

    fn resolve(
        &self,
        parameter: &Parameter,
        invocation: &Invocation<'_>,
    ) -> Result<Option<Value>, BridgeError> {
        let navigation = invocation.navigation();
        Ok(match parameter.kind() {
            ParameterKind::NavigationContext => Some(Value::new(navigation.clone())),
            ParameterKind::Outcome => Some(Value::from(navigation.outcome())),
            ParameterKind::Component => navigation.component().and_then(|component| {
                if parameter.targets::<ComponentRef>() {
                    Some(Value::new(component.clone()))
                } else {
                    (component.component().value_type_id() == parameter.target())
                        .then(|| component.component().clone())
                }
            }),
            _ => None,
        })
    }
}

/// Resolves the bean declaring the method.
#[derive(Debug, Default)]
pub struct BeanArgumentResolver;

impl ArgumentResolver for BeanArgumentResolver {
    fn supports(&self, parameter: &Parameter) -> bool {
        parameter.kind() == ParameterKind::Bean
    }

    fn resolve(
        &self,
        parameter: &Parameter,
        invocation: &Invocation<'_>,
    ) -> Result<Option<Value>, BridgeError> {
        Ok(invocation
            .bean()
            .map(BeanDefinition::instance)
            .filter(|instance| instance.value_type_id() == parameter.target())
            .cloned())
    }
}

/// Resolves the request, its locale and framework-native request attachments.
#[derive(Debug, Default)]
pub struct RequestArgumentResolver;

impl ArgumentResolver for RequestArgumentResolver {
    fn supports(&self, parameter: &Parameter) -> bool {
        matches!(
            parameter.kind(),
            ParameterKind::Request | ParameterKind::Locale | ParameterKind::Native
        )
    }

    fn resolve(
        &self,
        parameter: &Parameter,
        invocation: &Invocation<'_>,
    ) -> Result<Option<Value>, BridgeError> {
        let request = invocation.request_context().request();
        Ok(match parameter.kind() {
            ParameterKind::Request => Some(Value::new(request.clone())),
            ParameterKind::Locale => Some(Value::new(request.locale().clone())),
            ParameterKind::Native => request.extensions().get_by_id(parameter.target()).cloned(),
            _ => None,
        })
    }
}

/// Resolves the native context and direct response access.
#[derive(Debug, Default)]
pub struct NativeArgumentResolver;

impl ArgumentResolver for NativeArgumentResolver {
    fn supports(&self, parameter: &Parameter) -> bool {
        matches!(
            parameter.kind(),
            ParameterKind::NativeContext | ParameterKind::Response
        )
    }

    fn resolve(
        &self,
        parameter: &Parameter,
        invocation: &Invocation<'_>,
    ) -> Result<Option<Value>, BridgeError> {
        let context = invocation.request_context();
        Ok(match parameter.kind() {
            ParameterKind::NativeContext => Some(Value::new(context.acquire_native()?)),
            ParameterKind::Response => Some(Value::from_arc(Arc::clone(context))),
            _ => None,
        })
    }
}

/// Resolves model values of the current view and the invocation's own model.
#[derive(Debug, Default)]
pub struct ModelArgumentResolver;

impl ArgumentResolver for ModelArgumentResolver {
    fn supports(&self, parameter: &Parameter) -> bool {
        matches!(
            parameter.kind(),
            ParameterKind::ModelAttribute | ParameterKind::ViewModel | ParameterKind::ModelMap
        )
    }

    fn resolve(
        &self,
        parameter: &Parameter,
        invocation: &Invocation<'_>,
    ) -> Result<Option<Value>, BridgeError> {
        match parameter.kind() {
            ParameterKind::ModelMap => Ok(Some(Value::from_arc(Arc::clone(
                invocation.implicit_model(),
            )))),
            ParameterKind::ViewModel => Ok(invocation.view_model()?.map(Value::new)),
            ParameterKind::ModelAttribute => match invocation.view_model()? {
                Some(model) => Ok(find_by_type(&model, parameter)?),
                None => Ok(None),
            },
            _ => Ok(None),
        }
    }
}

/// Find the model value of the parameter's target type.
///
/// An entry under the conventional name of the type wins. Otherwise the value
/// must be the only one of its type; several candidates are an error rather
/// than an arbitrary pick.
pub fn find_by_type(model: &Model, parameter: &Parameter) -> Result<Option<Value>, DataError> {
    let conventional = variable_name(parameter.type_name());
    if let Some(value) = model
        .get(&conventional)
        .filter(|value| value.value_type_id() == parameter.target())
    {
        return Ok(Some(value.clone()));
    }

    let candidates: Vec<(&str, &Value)> = model
        .iter()
        .filter(|(_, value)| value.value_type_id() == parameter.target())
        .collect();
    match candidates.as_slice() {
        [] => Ok(None),
        [(_, value)] => Ok(Some((*value).clone())),
        many => Err(DataError::AmbiguousModelType {
            type_name: parameter.type_name(),
            keys: many.iter().map(|(key, _)| (*key).to_owned()).collect(),
        }),
    }
}

/// Resolves the data binder and the parameters it lets through.
#[derive(Debug, Default)]
pub struct BinderArgumentResolver;

impl ArgumentResolver for BinderArgumentResolver {
    fn supports(&self, parameter: &Parameter) -> bool {
        matches!(
            parameter.kind(),
            ParameterKind::Binder | ParameterKind::BoundParameters
        )
    }

    fn resolve(
        &self,
        parameter: &Parameter,
        invocation: &Invocation<'_>,
    ) -> Result<Option<Value>, BridgeError> {
        let binder = invocation.binder()?;
        match parameter.kind() {
            ParameterKind::Binder => Ok(Some(Value::from_arc(binder))),
            ParameterKind::BoundParameters => {
                let parameters = invocation.request_context().request().parameters();
                let bound = binder.lock().bind(parameters)?;
                Ok(Some(Value::new(bound)))
            }
            _ => Ok(None),
        }
    }
}

/// The standard resolvers in their default order.
pub fn standard_argument_resolvers() -> Vec<Arc<dyn ArgumentResolver>> {
    vec![
        Arc::new(NavigationArgumentResolver),
        Arc::new(BeanArgumentResolver),
        Arc::new(RequestArgumentResolver),
        Arc::new(NativeArgumentResolver),
        Arc::new(ModelArgumentResolver),
        Arc::new(BinderArgumentResolver),
    ]
}
