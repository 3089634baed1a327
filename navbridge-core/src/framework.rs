//! # View Framework Extension Points
//!
//! The view framework exposes a handful of singletons (navigation handler,
//! view handler, response state manager) that integrations may wrap, plus a
//! heavyweight per-request native context. The bridge never reaches into the
//! framework any other way.
//!
//! Each extension point is a small trait. The bridge's decorators hold the
//! framework's original implementation as a `delegate` and override only the
//! calls that concern bridged navigation.

use crate::component::ViewRoot;
use crate::error::BoxError;
use crate::model::Parameters;
use crate::request::WebRequest;
use crate::value::Value;
use std::sync::Arc;

/// The view framework's per-request context.
///
/// Creating one is expensive; the bridge obtains it lazily and reference
/// counts it so that exactly one instance exists per request.
pub trait NativeContext: Send + Sync {
    /// Tear the context down. Called once, when the last reference goes away.
    fn release(&self);

    /// Signal that the response has been fully written.
    fn response_complete(&self);

    /// Whether the response has been fully written.
    fn is_response_complete(&self) -> bool;

    /// The current view root.
    fn view_root(&self) -> Option<ViewRoot>;

    /// Replace the current view root.
    fn set_view_root(&self, root: ViewRoot);
}

/// Creates native contexts.
pub trait NativeContextFactory: Send + Sync {
    /// Create the native context for `request`.
    fn create(&self, request: &WebRequest) -> Result<Arc<dyn NativeContext>, BoxError>;
}

/// The view framework's request lifecycle.
pub trait RenderLifecycle: Send + Sync {
    /// Run the decode/validate/invoke phases for `view_id`.
    fn execute(&self, native: &dyn NativeContext, view_id: &str) -> Result<(), BoxError>;

    /// Run the render phase for `view_id`.
    fn render(&self, native: &dyn NativeContext, view_id: &str) -> Result<(), BoxError>;
}

/// Evaluates view-framework expressions such as `#{hotel.name}`.
pub trait ExpressionResolver: Send + Sync {
    /// Evaluate an expression. `Ok(None)` means it evaluated to null.
    fn evaluate(&self, expression: &str) -> Result<Option<Value>, BoxError>;
}

/// A navigation rule selected by the navigation handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationCase {
    from_action: Option<String>,
    from_outcome: String,
    to_view_id: String,
    redirect: bool,
}

impl NavigationCase {
    /// A non-redirecting case.
    pub fn new(
        from_action: Option<&str>,
        from_outcome: impl Into<String>,
        to_view_id: impl Into<String>,
    ) -> Self {
        Self {
            from_action: from_action.map(str::to_owned),
            from_outcome: from_outcome.into(),
            to_view_id: to_view_id.into(),
            redirect: false,
        }
    }

    /// Make the case redirect.
    pub fn redirecting(mut self) -> Self {
        self.redirect = true;
        self
    }

    /// The originating action.
    pub fn from_action(&self) -> Option<&str> {
        self.from_action.as_deref()
    }

    /// The outcome that selected this case.
    pub fn from_outcome(&self) -> &str {
        &self.from_outcome
    }

    /// The target view id.
    pub fn to_view_id(&self) -> &str {
        &self.to_view_id
    }

    /// Whether navigation redirects.
    pub fn is_redirect(&self) -> bool {
        self.redirect
    }
}

/// The view framework's navigation handler.
pub trait NavigationHandler: Send + Sync {
    /// Pre-emptively select a case, for example while rendering a link.
    fn navigation_case(
        &self,
        native: &dyn NativeContext,
        from_action: Option<&str>,
        outcome: &str,
    ) -> Result<Option<NavigationCase>, BoxError>;

    /// Navigate after an action produced `outcome`.
    fn handle_navigation(
        &self,
        native: &dyn NativeContext,
        from_action: Option<&str>,
        outcome: Option<&str>,
    ) -> Result<(), BoxError>;
}

/// The view framework's view handler.
pub trait ViewHandler: Send + Sync {
    /// Build a new view for `view_id`.
    fn create_view(&self, native: &dyn NativeContext, view_id: &str) -> Result<ViewRoot, BoxError>;

    /// Restore a previously rendered view, or `None` if it cannot be restored.
    fn restore_view(
        &self,
        native: &dyn NativeContext,
        view_id: &str,
    ) -> Result<Option<ViewRoot>, BoxError>;

    /// Render a view root.
    fn render_view(&self, native: &dyn NativeContext, root: &ViewRoot) -> Result<(), BoxError>;

    /// The URL a form in `view_id` posts back to.
    fn action_url(&self, native: &dyn NativeContext, view_id: &str) -> Result<String, BoxError>;

    /// A GET-able URL for `view_id`.
    fn bookmarkable_url(
        &self,
        native: &dyn NativeContext,
        view_id: &str,
        parameters: &Parameters,
    ) -> Result<String, BoxError>;

    /// The URL to redirect to for `view_id`.
    fn redirect_url(
        &self,
        native: &dyn NativeContext,
        view_id: &str,
        parameters: &Parameters,
    ) -> Result<String, BoxError>;
}

/// The view framework's view-state persistence.
pub trait ResponseStateManager: Send + Sync {
    /// Write the serialized view state into the response markup.
    fn write_state(
        &self,
        native: &dyn NativeContext,
        out: &mut String,
        state: &str,
    ) -> Result<(), BoxError>;

    /// Whether `request` posts back a previously rendered view.
    fn is_postback(&self, request: &WebRequest) -> bool;

    /// The serialized view state carried by `request`.
    fn state(&self, request: &WebRequest) -> Option<String>;
}
