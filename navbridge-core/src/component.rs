//! Component-tree types of the view framework.
//!
//! Only the pieces the bridge inspects are modelled: the component that
//! originated a navigation, its parameter children, the UI event that fired,
//! and the view root that is eventually rendered.

use crate::dispatch::View;
use crate::model::Model;
use crate::value::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A parameter child of a UI component.
#[derive(Debug, Clone, Default)]
pub struct UiParameter {
    name: Option<String>,
    value: Option<Value>,
    disabled: bool,
}

impl UiParameter {
    /// A named parameter.
    pub fn named(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value.into()),
            disabled: false,
        }
    }

    /// An unnamed parameter; its model key is derived from the value type.
    pub fn unnamed(value: impl Into<Value>) -> Self {
        Self {
            name: None,
            value: Some(value.into()),
            disabled: false,
        }
    }

    /// Mark the parameter as disabled.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// The declared name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The already evaluated value.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Whether the parameter is disabled.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

/// A reference to a UI component in the current view.
#[derive(Debug, Clone)]
pub struct ComponentRef {
    id: String,
    component: Value,
    parameters: Vec<UiParameter>,
}

impl ComponentRef {
    /// Reference a component instance.
    pub fn new<T: Any + Send + Sync>(id: impl Into<String>, component: T) -> Self {
        Self {
            id: id.into(),
            component: Value::new(component),
            parameters: Vec::new(),
        }
    }

    /// Add a parameter child.
    pub fn with_parameter(mut self, parameter: UiParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// The client id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The component instance.
    pub fn component(&self) -> &Value {
        &self.component
    }

    /// The component instance as a `T`, if it is one.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.component.downcast()
    }

    /// Parameter children in document order.
    pub fn parameters(&self) -> &[UiParameter] {
        &self.parameters
    }
}

/// The phase or action a UI event belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEventKind {
    /// An action source fired.
    Action,
    /// A component is about to render.
    PreRenderComponent,
    /// Any other system event.
    Other(String),
}

/// A UI event captured so that a later navigation can refer back to it.
#[derive(Debug, Clone)]
pub struct UiEvent {
    kind: UiEventKind,
    source: Option<ComponentRef>,
}

impl UiEvent {
    /// Create an event.
    pub fn new(kind: UiEventKind, source: Option<ComponentRef>) -> Self {
        Self { kind, source }
    }

    /// An action event fired by `source`.
    pub fn action(source: ComponentRef) -> Self {
        Self::new(UiEventKind::Action, Some(source))
    }

    /// A pre-render event for `source`.
    pub fn pre_render(source: ComponentRef) -> Self {
        Self::new(UiEventKind::PreRenderComponent, Some(source))
    }

    /// The event kind.
    pub fn kind(&self) -> &UiEventKind {
        &self.kind
    }

    /// The component that fired the event.
    pub fn source(&self) -> Option<&ComponentRef> {
        self.source.as_ref()
    }
}

/// A view rendered by the dispatch framework in place of a component tree.
#[derive(Clone)]
pub struct DelegatedRender {
    view: Arc<dyn View>,
    model: Model,
}

impl DelegatedRender {
    /// Pair a dispatch-framework view with its model.
    pub fn new(view: Arc<dyn View>, model: Model) -> Self {
        Self { view, model }
    }

    /// The view.
    pub fn view(&self) -> &Arc<dyn View> {
        &self.view
    }

    /// The model the view renders.
    pub fn model(&self) -> &Model {
        &self.model
    }
}

impl fmt::Debug for DelegatedRender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegatedRender")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

/// The root of a view's component tree.
#[derive(Debug, Clone)]
pub struct ViewRoot {
    view_id: String,
    model: Option<Model>,
    delegated: Option<DelegatedRender>,
}

impl ViewRoot {
    /// A component-tree root for `view_id`.
    pub fn new(view_id: impl Into<String>) -> Self {
        Self {
            view_id: view_id.into(),
            model: None,
            delegated: None,
        }
    }

    /// A root whose rendering is handed to a dispatch-framework view.
    pub fn delegated(view_id: impl Into<String>, render: DelegatedRender) -> Self {
        Self {
            view_id: view_id.into(),
            model: None,
            delegated: Some(render),
        }
    }

    /// Attach the model held by this view across postbacks.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = Some(model);
        self
    }

    /// The view id.
    pub fn view_id(&self) -> &str {
        &self.view_id
    }

    /// The model held by this view.
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// The dispatch-framework render, if this root delegates.
    pub fn delegated_render(&self) -> Option<&DelegatedRender> {
        self.delegated.as_ref()
    }
}
