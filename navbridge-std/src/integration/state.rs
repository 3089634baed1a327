use crate::context::ContextProvider;
use navbridge_core::{BoxError, NativeContext, ResponseStateManager, WebRequest};
use std::sync::Arc;

/// Request parameter naming the view rendered on behalf of the dispatch
/// framework.
pub const RENDERED_VIEW_PARAMETER: &str = "navbridge.view";

/// Decorates the view framework's response state manager.
///
/// Forms of a view rendered through the request context carry the view id in
/// a hidden field, so the postback reaches the dispatch handler again and is
/// recognised as a postback of that view.
pub struct BridgeResponseStateManager {
    delegate: Arc<dyn ResponseStateManager>,
    provider: Arc<dyn ContextProvider>,
}

impl BridgeResponseStateManager {
    /// Decorate `delegate`.
    pub fn new(delegate: Arc<dyn ResponseStateManager>, provider: Arc<dyn ContextProvider>) -> Self {
        Self { delegate, provider }
    }

    /// The view id a postback refers to, if it was rendered by the bridge.
    pub fn rendered_view<'r>(&self, request: &'r WebRequest) -> Option<&'r str> {
        request
            .parameter(RENDERED_VIEW_PARAMETER)
            .filter(|view_id| !view_id.is_empty())
    }
}

impl ResponseStateManager for BridgeResponseStateManager {
    fn write_state(
        &self,
        native: &dyn NativeContext,
        out: &mut String,
        state: &str,
    ) -> Result<(), BoxError> {
        self.delegate.write_state(native, out, state)?;
        let rendering = self
            .provider
            .current()
            .and_then(|context| context.rendering());
        if let Some(artifact) = rendering {
            out.push_str("<input type=\"hidden\" name=\"");
            out.push_str(RENDERED_VIEW_PARAMETER);
            out.push_str("\" value=\"");
            push_escaped(out, artifact.view_id());
            out.push_str("\"/>");
        }
        Ok(())
    }

    fn is_postback(&self, request: &WebRequest) -> bool {
        self.rendered_view(request).is_some() || self.delegate.is_postback(request)
    }

    fn state(&self, request: &WebRequest) -> Option<String> {
        self.delegate.state(request)
    }
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}
