//! Testing utilities for navbridge.
//!
//! Recording and stub implementations of the collaborator traits, so that
//! resolvers, decorators and the request context can be exercised without a
//! real view framework or dispatch framework.
//!
//! # Features
//!
//! - [`RecordingNativeContextFactory`]: creates [`RecordingNativeContext`]s and
//!   keeps them for inspection
//! - [`RecordingLifecycle`]: records rendered view ids, optionally failing
//! - [`StubExpressionResolver`]: evaluates a fixed table of expressions
//! - [`FixedOutcomeResolver`]: claims one outcome and resolves it to a fixed
//!   destination
//! - [`AlternatingFilter`]: a stateful navigation mapping filter
//! - [`RecordingView`] and [`StubViewResolver`]: dispatch-framework views
//! - [`StubNavigationHandler`], [`StubViewHandler`] and
//!   [`StubResponseStateManager`]: the view framework's own singletons

use crate::outcome::NavigationMappingFilter;
use indexmap::IndexMap;
use navbridge_core::{
    BoxError, BridgeError, ExpressionResolver, Locale, Model, NativeContext, NativeContextFactory,
    NavigationCase, NavigationContext, NavigationHandler, NavigationOutcome,
    NavigationOutcomeResolver, Parameters, RenderLifecycle, ResponseStateManager, Value, View,
    ViewHandler, ViewResolver, ViewRoot, WebRequest, WebResponse,
};
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

// ============================================================================
// Native Context
// ============================================================================

/// A native context that records what was done to it.
#[derive(Default)]
pub struct RecordingNativeContext {
    released: AtomicBool,
    response_complete: AtomicBool,
    view_root: Mutex<Option<ViewRoot>>,
}

impl RecordingNativeContext {
    /// Whether [`NativeContext::release`] has been called.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl NativeContext for RecordingNativeContext {
    fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
    }

    fn response_complete(&self) {
        self.response_complete.store(true, Ordering::SeqCst);
    }

    fn is_response_complete(&self) -> bool {
        self.response_complete.load(Ordering::SeqCst)
    }

    fn view_root(&self) -> Option<ViewRoot> {
        self.view_root.lock().clone()
    }

    fn set_view_root(&self, root: ViewRoot) {
        *self.view_root.lock() = Some(root);
    }
}

/// Creates [`RecordingNativeContext`]s.
///
/// # Example
///
/// ```rust,ignore
/// let factory = Arc::new(RecordingNativeContextFactory::new());
/// let context = RequestContext::builder(request, handler)
///     .native_factory(factory.clone())
///     .build()?;
///
/// drop(context.acquire_native()?);
/// assert!(factory.last().unwrap().is_released());
/// ```
#[derive(Default)]
pub struct RecordingNativeContextFactory {
    created: Mutex<Vec<Arc<RecordingNativeContext>>>,
}

impl RecordingNativeContextFactory {
    /// Create a new factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of native contexts created so far.
    pub fn created_count(&self) -> usize {
        self.created.lock().len()
    }

    /// The most recently created native context.
    pub fn last(&self) -> Option<Arc<RecordingNativeContext>> {
        self.created.lock().last().cloned()
    }
}

impl NativeContextFactory for RecordingNativeContextFactory {
    fn create(&self, _: &WebRequest) -> Result<Arc<dyn NativeContext>, BoxError> {
        let native = Arc::new(RecordingNativeContext::default());
        self.created.lock().push(Arc::clone(&native));
        Ok(native)
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// A render lifecycle recording the view ids it rendered.
#[derive(Default)]
pub struct RecordingLifecycle {
    failing: Option<String>,
    rendered: Mutex<Vec<String>>,
}

impl RecordingLifecycle {
    /// A lifecycle that renders everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the execute phase for `view_id`.
    pub fn failing_on(mut self, view_id: impl Into<String>) -> Self {
        self.failing = Some(view_id.into());
        self
    }

    /// View ids rendered successfully, in order.
    pub fn rendered(&self) -> Vec<String> {
        self.rendered.lock().clone()
    }
}

impl RenderLifecycle for RecordingLifecycle {
    fn execute(&self, _: &dyn NativeContext, view_id: &str) -> Result<(), BoxError> {
        if self.failing.as_deref() == Some(view_id) {
            return Err(format!("lifecycle failed for {view_id}").into());
        }
        Ok(())
    }

    fn render(&self, _: &dyn NativeContext, view_id: &str) -> Result<(), BoxError> {
        self.rendered.lock().push(view_id.to_owned());
        Ok(())
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// Evaluates expressions from a fixed table. Unknown expressions fail.
#[derive(Default)]
pub struct StubExpressionResolver {
    values: IndexMap<String, Option<Value>>,
    evaluated: Mutex<Vec<String>>,
}

impl StubExpressionResolver {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate `expression` to `value`.
    pub fn with(mut self, expression: impl Into<String>, value: Value) -> Self {
        self.values.insert(expression.into(), Some(value));
        self
    }

    /// Evaluate `expression` to null.
    pub fn with_null(mut self, expression: impl Into<String>) -> Self {
        self.values.insert(expression.into(), None);
        self
    }

    /// Expressions evaluated so far, in order.
    pub fn evaluated(&self) -> Vec<String> {
        self.evaluated.lock().clone()
    }
}

impl ExpressionResolver for StubExpressionResolver {
    fn evaluate(&self, expression: &str) -> Result<Option<Value>, BoxError> {
        self.evaluated.lock().push(expression.to_owned());
        self.values
            .get(expression)
            .cloned()
            .ok_or_else(|| format!("unknown expression {expression}").into())
    }
}

// ============================================================================
// Outcome Resolution
// ============================================================================

/// Claims a single outcome and resolves it to a fixed destination.
pub struct FixedOutcomeResolver {
    outcome: String,
    destination: Option<String>,
}

impl FixedOutcomeResolver {
    /// Resolve `outcome` to `destination`.
    pub fn new(outcome: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            outcome: outcome.into(),
            destination: Some(destination.into()),
        }
    }

    /// Claim `outcome` and stay on the current view.
    pub fn staying(outcome: impl Into<String>) -> Self {
        Self {
            outcome: outcome.into(),
            destination: None,
        }
    }
}

impl NavigationOutcomeResolver for FixedOutcomeResolver {
    fn can_resolve(&self, context: &NavigationContext) -> Result<bool, BridgeError> {
        Ok(context.outcome() == self.outcome)
    }

    fn resolve(
        &self,
        _: &NavigationContext,
    ) -> Result<Option<NavigationOutcome>, BridgeError> {
        Ok(self.destination.as_deref().map(NavigationOutcome::new))
    }
}

/// A filter that matches on its first call and alternates afterwards.
///
/// Clones share their state.
#[derive(Clone, Default)]
pub struct AlternatingFilter {
    calls: Arc<AtomicUsize>,
}

impl AlternatingFilter {
    /// Create a new filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the filter was consulted.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl NavigationMappingFilter for AlternatingFilter {
    fn matches(&self, _: &NavigationContext) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst) % 2 == 0
    }
}

// ============================================================================
// Dispatch Views
// ============================================================================

/// A view that writes its name and records the models it rendered.
pub struct RecordingView {
    name: String,
    content_type: String,
    models: Mutex<Vec<Model>>,
}

impl RecordingView {
    /// A view named `name` with content type `text/{name}`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            content_type: format!("text/{name}"),
            name,
            models: Mutex::new(Vec::new()),
        }
    }

    /// Models rendered so far.
    pub fn rendered_models(&self) -> Vec<Model> {
        self.models.lock().clone()
    }
}

impl View for RecordingView {
    fn render(&self, model: &Model, _: &WebRequest, response: &mut WebResponse) -> Result<(), BoxError> {
        self.models.lock().push(model.clone());
        response.write(&self.name);
        Ok(())
    }

    fn content_type(&self) -> Option<&str> {
        Some(&self.content_type)
    }
}

/// A dispatch-framework view resolver over a fixed table of views.
#[derive(Default)]
pub struct StubViewResolver {
    views: IndexMap<String, Arc<dyn View>>,
    failing: bool,
    lookups: Mutex<Vec<String>>,
}

impl StubViewResolver {
    /// An empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `name` to `view`.
    pub fn with_view(self, name: impl Into<String>, view: impl View + 'static) -> Self {
        self.with_shared_view(name, Arc::new(view))
    }

    /// Resolve `name` to a view the test keeps a handle on.
    pub fn with_shared_view(mut self, name: impl Into<String>, view: Arc<dyn View>) -> Self {
        self.views.insert(name.into(), view);
        self
    }

    /// Fail every lookup.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Names looked up so far, in order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().clone()
    }
}

impl ViewResolver for StubViewResolver {
    fn resolve_view_name(
        &self,
        name: &str,
        _: &Locale,
    ) -> Result<Option<Arc<dyn View>>, BoxError> {
        self.lookups.lock().push(name.to_owned());
        if self.failing {
            return Err(format!("view resolution failed for {name}").into());
        }
        Ok(self.views.get(name).cloned())
    }
}

// ============================================================================
// View Framework Singletons
// ============================================================================

/// A navigation handler that records calls and never navigates.
#[derive(Default)]
pub struct StubNavigationHandler {
    cases: Mutex<Vec<String>>,
    handled: Mutex<Vec<Option<String>>>,
}

impl StubNavigationHandler {
    /// Create a new handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcomes passed to `navigation_case`.
    pub fn cases(&self) -> Vec<String> {
        self.cases.lock().clone()
    }

    /// Outcomes passed to `handle_navigation`.
    pub fn handled(&self) -> Vec<Option<String>> {
        self.handled.lock().clone()
    }
}

impl NavigationHandler for StubNavigationHandler {
    fn navigation_case(
        &self,
        _: &dyn NativeContext,
        _: Option<&str>,
        outcome: &str,
    ) -> Result<Option<NavigationCase>, BoxError> {
        self.cases.lock().push(outcome.to_owned());
        Ok(None)
    }

    fn handle_navigation(
        &self,
        _: &dyn NativeContext,
        _: Option<&str>,
        outcome: Option<&str>,
    ) -> Result<(), BoxError> {
        self.handled.lock().push(outcome.map(str::to_owned));
        Ok(())
    }
}

/// A view handler creating plain view roots. URLs are the view id itself.
#[derive(Default)]
pub struct StubViewHandler {
    created: Mutex<Vec<String>>,
}

impl StubViewHandler {
    /// Create a new handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// View ids passed to `create_view`.
    pub fn created(&self) -> Vec<String> {
        self.created.lock().clone()
    }
}

impl ViewHandler for StubViewHandler {
    fn create_view(&self, _: &dyn NativeContext, view_id: &str) -> Result<ViewRoot, BoxError> {
        self.created.lock().push(view_id.to_owned());
        Ok(ViewRoot::new(view_id))
    }

    fn restore_view(&self, _: &dyn NativeContext, _: &str) -> Result<Option<ViewRoot>, BoxError> {
        Ok(None)
    }

    fn render_view(&self, _: &dyn NativeContext, _: &ViewRoot) -> Result<(), BoxError> {
        Ok(())
    }

    fn action_url(&self, _: &dyn NativeContext, view_id: &str) -> Result<String, BoxError> {
        Ok(view_id.to_owned())
    }

    fn bookmarkable_url(
        &self,
        _: &dyn NativeContext,
        view_id: &str,
        _: &Parameters,
    ) -> Result<String, BoxError> {
        Ok(view_id.to_owned())
    }

    fn redirect_url(
        &self,
        _: &dyn NativeContext,
        view_id: &str,
        _: &Parameters,
    ) -> Result<String, BoxError> {
        Ok(view_id.to_owned())
    }
}

/// Request parameter carrying the state written by [`StubResponseStateManager`].
pub const STUB_STATE_PARAMETER: &str = "view-state";

/// A state manager writing `<state>..</state>` markers.
#[derive(Default)]
pub struct StubResponseStateManager;

impl StubResponseStateManager {
    /// Create a new state manager.
    pub fn new() -> Self {
        Self
    }
}

impl ResponseStateManager for StubResponseStateManager {
    fn write_state(&self, _: &dyn NativeContext, out: &mut String, state: &str) -> Result<(), BoxError> {
        out.push_str("<state>");
        out.push_str(state);
        out.push_str("</state>");
        Ok(())
    }

    fn is_postback(&self, request: &WebRequest) -> bool {
        request.parameter(STUB_STATE_PARAMETER).is_some()
    }

    fn state(&self, request: &WebRequest) -> Option<String> {
        request.parameter(STUB_STATE_PARAMETER).map(str::to_owned)
    }
}
