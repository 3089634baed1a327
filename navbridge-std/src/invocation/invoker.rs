//! Invocation of navigation methods.

use super::argument::{ArgumentResolver, Invocation, standard_argument_resolvers};
use super::method::NavigationMethod;
use super::return_value::{
    ReturnValue, ReturnValueHandler, standard_return_value_handlers, unsupported,
};
use crate::bean::BeanDefinition;
use crate::context::RequestContext;
use navbridge_core::{
    BinderFactory, BridgeError, DataBinder, Destination, Model, NavigationContext,
    NavigationOutcome, Parameters, ResolutionError, Value,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, trace};

/// State accumulated while invoking one navigation method.
pub struct InvocationContainer {
    model: Arc<Mutex<Model>>,
    binder: Mutex<Option<Arc<Mutex<DataBinder>>>>,
    destination: Option<Destination>,
    parameters: Option<Parameters>,
    handled: bool,
}

impl Default for InvocationContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl InvocationContainer {
    /// An empty container.
    pub fn new() -> Self {
        Self {
            model: Arc::new(Mutex::new(Model::new())),
            binder: Mutex::new(None),
            destination: None,
            parameters: None,
            handled: false,
        }
    }

    /// The model accumulated so far.
    pub fn model(&self) -> &Arc<Mutex<Model>> {
        &self.model
    }

    /// Add entries of `model` whose keys are not present yet.
    pub fn merge_model(&mut self, model: &Model) {
        let mut current = self.model.lock();
        for (key, value) in model.iter() {
            if !current.contains_key(key) {
                current.insert(key, value.clone());
            }
        }
    }

    /// Navigate to `destination`.
    pub fn set_destination(&mut self, destination: Destination) {
        self.destination = Some(destination);
    }

    /// The destination, if one was set.
    pub fn destination(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }

    /// Parameters to pass with the destination.
    pub fn set_parameters(&mut self, parameters: Parameters) {
        self.parameters = Some(parameters);
    }

    /// Record that the response was written directly.
    pub fn mark_handled(&mut self) {
        self.handled = true;
    }

    /// Whether the response was written directly.
    pub fn is_handled(&self) -> bool {
        self.handled
    }

    fn binder(&self) -> Option<Arc<Mutex<DataBinder>>> {
        self.binder.lock().clone()
    }

    fn set_binder(&self, binder: Arc<Mutex<DataBinder>>) {
        *self.binder.lock() = Some(binder);
    }

    fn into_outcome(self) -> Option<NavigationOutcome> {
        let destination = self.destination?;
        let outcome = match self.parameters {
            Some(parameters) => NavigationOutcome::with_parameters(destination, parameters),
            None => NavigationOutcome::new(destination),
        };
        let model = self.model.lock().clone();
        Some(outcome.with_implicit_model(model))
    }
}

/// A method to invoke, with the bean declaring it.
#[derive(Clone, Copy)]
pub struct MethodTarget<'a> {
    name: &'a str,
    method: &'a dyn NavigationMethod,
    bean: Option<&'a BeanDefinition>,
}

impl<'a> MethodTarget<'a> {
    /// A free-standing method.
    pub fn new(name: &'a str, method: &'a dyn NavigationMethod) -> Self {
        Self {
            name,
            method,
            bean: None,
        }
    }

    /// Attach the declaring bean.
    pub fn on_bean(mut self, bean: &'a BeanDefinition) -> Self {
        self.bean = Some(bean);
        self
    }
}

/// Invokes navigation methods through the argument and return value pipelines.
pub struct NavigationMethodInvoker {
    argument_resolvers: Vec<Arc<dyn ArgumentResolver>>,
    return_value_handlers: Vec<Arc<dyn ReturnValueHandler>>,
    binder_factory: Option<Arc<dyn BinderFactory>>,
}

impl Default for NavigationMethodInvoker {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl NavigationMethodInvoker {
    /// Start from the standard resolvers and handlers.
    pub fn builder() -> InvokerBuilder {
        InvokerBuilder {
            argument_resolvers: standard_argument_resolvers(),
            return_value_handlers: standard_return_value_handlers(),
            binder_factory: None,
        }
    }

    /// Invoke `target` for `navigation`.
    ///
    /// Returns `Ok(None)` when the method chose to stay on the current view or
    /// wrote the response itself. In the latter case the view framework is
    /// told the response is complete.
    pub fn invoke(
        &self,
        target: MethodTarget<'_>,
        navigation: &NavigationContext,
        context: &Arc<RequestContext>,
    ) -> Result<Option<NavigationOutcome>, BridgeError> {
        self.invoke_with(target, navigation, context, &[])
    }

    /// Like [`invoke`](Self::invoke), trying `custom` resolvers before the
    /// configured ones.
    pub fn invoke_with(
        &self,
        target: MethodTarget<'_>,
        navigation: &NavigationContext,
        context: &Arc<RequestContext>,
        custom: &[Arc<dyn ArgumentResolver>],
    ) -> Result<Option<NavigationOutcome>, BridgeError> {
        let mut container = InvocationContainer::new();
        let value = {
            let invocation = Invocation {
                invoker: self,
                method: target.name,
                navigation,
                context,
                bean: target.bean,
                container: &container,
                custom,
            };
            let arguments = self.resolve_arguments(target.method, &invocation)?;
            debug!(method = target.name, outcome = navigation.outcome(), "invoking navigation method");
            target.method.invoke(target.name, arguments)?
        };

        self.handle_return_value(value, &mut container)?;

        if container.is_handled() || context.with_response(|response| response.is_committed()) {
            let native = context.acquire_native()?;
            native.response_complete();
            debug!(method = target.name, "response written by navigation method");
            return Ok(None);
        }
        Ok(container.into_outcome())
    }

    fn resolve_arguments(
        &self,
        method: &dyn NavigationMethod,
        invocation: &Invocation<'_>,
    ) -> Result<Vec<Option<Value>>, BridgeError> {
        let mut arguments = Vec::with_capacity(method.parameters().len());
        for parameter in method.parameters() {
            let resolver = invocation
                .custom
                .iter()
                .chain(&self.argument_resolvers)
                .find(|resolver| resolver.supports(parameter))
                .ok_or_else(|| ResolutionError::UnsupportedParameter {
                    method: invocation.method.to_owned(),
                    index: parameter.index(),
                    type_name: parameter.type_name(),
                })?;
            let value = resolver.resolve(parameter, invocation)?;
            trace!(
                method = invocation.method,
                index = parameter.index(),
                kind = ?parameter.kind(),
                resolved = value.is_some(),
                "resolved argument"
            );
            arguments.push(value);
        }
        Ok(arguments)
    }

    fn handle_return_value(
        &self,
        value: ReturnValue,
        container: &mut InvocationContainer,
    ) -> Result<(), BridgeError> {
        let handler = self
            .return_value_handlers
            .iter()
            .find(|handler| handler.supports(&value))
            .ok_or_else(|| unsupported(&value))?;
        handler.handle(value, container)
    }

    /// The data binder of `invocation`, created and initialised on first use.
    ///
    /// Init-binder methods of the declaring bean run once, through the same
    /// argument pipeline, before the binder is handed out.
    pub(crate) fn binder(
        &self,
        invocation: &Invocation<'_>,
    ) -> Result<Arc<Mutex<DataBinder>>, BridgeError> {
        if let Some(binder) = invocation.container.binder() {
            return Ok(binder);
        }

        let object_name = invocation.bean.map_or("target", BeanDefinition::name);
        let binder = match &self.binder_factory {
            Some(factory) => factory.create_binder(invocation.context.request(), object_name)?,
            None => DataBinder::new(object_name),
        };
        let binder = Arc::new(Mutex::new(binder));
        invocation.container.set_binder(Arc::clone(&binder));

        if let Some(bean) = invocation.bean {
            for init in bean.init_binders() {
                let init_invocation = Invocation {
                    method: init.name(),
                    ..*invocation
                };
                let arguments = self.resolve_arguments(init.method(), &init_invocation)?;
                init.method().invoke(init.name(), arguments)?;
                debug!(bean = bean.name(), method = init.name(), "ran init-binder method");
            }
        }
        Ok(binder)
    }
}

/// Builder for [`NavigationMethodInvoker`].
pub struct InvokerBuilder {
    argument_resolvers: Vec<Arc<dyn ArgumentResolver>>,
    return_value_handlers: Vec<Arc<dyn ReturnValueHandler>>,
    binder_factory: Option<Arc<dyn BinderFactory>>,
}

impl InvokerBuilder {
    /// Append an argument resolver after the ones already configured.
    pub fn argument_resolver(mut self, resolver: Arc<dyn ArgumentResolver>) -> Self {
        self.argument_resolvers.push(resolver);
        self
    }

    /// Insert an argument resolver before the ones already configured.
    pub fn prepend_argument_resolver(mut self, resolver: Arc<dyn ArgumentResolver>) -> Self {
        self.argument_resolvers.insert(0, resolver);
        self
    }

    /// Append a return value handler after the ones already configured.
    pub fn return_value_handler(mut self, handler: Arc<dyn ReturnValueHandler>) -> Self {
        self.return_value_handlers.push(handler);
        self
    }

    /// Insert a return value handler before the ones already configured.
    pub fn prepend_return_value_handler(mut self, handler: Arc<dyn ReturnValueHandler>) -> Self {
        self.return_value_handlers.insert(0, handler);
        self
    }

    /// Delegate data binder creation to the dispatch framework.
    pub fn binder_factory(mut self, factory: Arc<dyn BinderFactory>) -> Self {
        self.binder_factory = Some(factory);
        self
    }

    /// Build the invoker.
    pub fn build(self) -> NavigationMethodInvoker {
        NavigationMethodInvoker {
            argument_resolvers: self.argument_resolvers,
            return_value_handlers: self.return_value_handlers,
            binder_factory: self.binder_factory,
        }
    }
}
