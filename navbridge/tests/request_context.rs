use navbridge::{
    BeanRegistry, BoxError, BridgeError, BridgeInterceptor, BridgeResponseStateManager,
    ContextPhase, DelegatedRender, Destination, DestinationViewResolver, Locale, Model,
    NativeContext, NavigationHandler, RENDERED_VIEW_PARAMETER, RenderLifecycle,
    RenderingArtifact, RequestContext, ResponseStateManager, StateError, ThreadContextProvider,
    Value, View, ViewHandler, ViewRoot, WebRequest, WebResponse, destination::NativeViewResolver,
};
use std::sync::{Arc, Mutex};

mod common;
use common::Bridge;

/// Writes the view state while rendering and tries a nested render.
struct FormLifecycle {
    state_manager: Arc<BridgeResponseStateManager>,
    markup: Mutex<String>,
    nested: Mutex<Option<BridgeError>>,
}

impl RenderLifecycle for FormLifecycle {
    fn execute(&self, _: &dyn NativeContext, _: &str) -> Result<(), BoxError> {
        Ok(())
    }

    fn render(&self, native: &dyn NativeContext, view_id: &str) -> Result<(), BoxError> {
        let mut markup = format!("<form id=\"{view_id}\">");
        self.state_manager.write_state(native, &mut markup, "s1")?;
        markup.push_str("</form>");
        *self.markup.lock().unwrap() = markup;

        let context = RequestContext::require_current()?;
        let nested = context.render(RenderingArtifact::new("/other.xhtml", Model::new()));
        *self.nested.lock().unwrap() = nested.err();
        Ok(())
    }
}

#[test]
fn test_dispatch_handler_renders_native_view() {
    let bridge = Bridge::new(BeanRegistry::builder().build().unwrap());
    let lifecycle = Arc::new(FormLifecycle {
        state_manager: Arc::clone(bridge.integration.state_manager()),
        markup: Mutex::new(String::new()),
        nested: Mutex::new(None),
    });
    let interceptor =
        BridgeInterceptor::new(bridge.native_factory.clone()).with_lifecycle(lifecycle.clone());
    let active = interceptor
        .pre_handle(WebRequest::new("/hotels"), Value::new(()), None)
        .unwrap();

    let resolver = NativeViewResolver::new(Arc::new(ThreadContextProvider))
        .with_prefix("/WEB-INF/views/")
        .with_suffix(".xhtml");
    let view = resolver
        .resolve_destination(&Destination::from("hotels/list"), &Locale::default())
        .unwrap()
        .unwrap();
    let mut response = WebResponse::new();
    view.render(&Model::new(), active.context().request(), &mut response)
        .unwrap();

    assert_eq!(
        *lifecycle.markup.lock().unwrap(),
        "<form id=\"/WEB-INF/views/hotels/list.xhtml\"><state>s1</state>\
         <input type=\"hidden\" name=\"navbridge.view\" value=\"/WEB-INF/views/hotels/list.xhtml\"/></form>"
    );
    match lifecycle.nested.lock().unwrap().take() {
        Some(BridgeError::State(StateError::NestedRender { in_flight, requested, .. })) => {
            assert_eq!(in_flight, "/WEB-INF/views/hotels/list.xhtml");
            assert_eq!(requested, "/other.xhtml");
        }
        other => panic!("expected a nested render error, got {other:?}"),
    }
    assert!(active.context().rendering().is_none());
    assert_eq!(active.context().native_references(), 0);
}

/// Writes both to the response it is given and to the shared request response.
struct SideWritingView;

impl View for SideWritingView {
    fn render(
        &self,
        _: &Model,
        _: &WebRequest,
        response: &mut WebResponse,
    ) -> Result<(), BoxError> {
        response.set_header("Content-Type", "text/html");
        response.write("view;");
        RequestContext::require_current()?.with_response(|shared| shared.write("side;"));
        Ok(())
    }
}

#[test]
fn test_delegated_render_keeps_shared_response_writes() {
    let bridge = Bridge::new(BeanRegistry::builder().build().unwrap());
    let active = bridge
        .interceptor
        .pre_handle(WebRequest::new("/hotels"), Value::new(()), None)
        .unwrap();
    active
        .context()
        .with_response(|response| response.set_header("X-Request", "hotels"));
    let native = active.context().acquire_native().unwrap();

    let root = ViewRoot::delegated(
        "/hotels.xhtml",
        DelegatedRender::new(Arc::new(SideWritingView), Model::new()),
    );
    bridge
        .integration
        .view_handler()
        .render_view(&*native, &root)
        .unwrap();

    drop(native);
    let response = active.after_completion();
    assert_eq!(response.body(), "side;view;");
    assert_eq!(response.header("X-Request"), Some("hotels"));
    assert_eq!(response.header("Content-Type"), Some("text/html"));
}

#[test]
fn test_postback_of_bridged_view() {
    let bridge = Bridge::new(BeanRegistry::builder().build().unwrap());
    let state_manager = bridge.integration.state_manager();

    let postback = WebRequest::new("/hotels")
        .with_parameter(RENDERED_VIEW_PARAMETER, "/WEB-INF/views/hotels/list.xhtml");
    assert!(state_manager.is_postback(&postback));
    assert_eq!(
        state_manager.rendered_view(&postback),
        Some("/WEB-INF/views/hotels/list.xhtml")
    );
    assert!(!state_manager.is_postback(&WebRequest::new("/hotels")));
}

#[test]
fn test_release_is_terminal() {
    let bridge = Bridge::new(BeanRegistry::builder().build().unwrap());
    let active = bridge
        .interceptor
        .pre_handle(WebRequest::new("/hotels"), Value::new(()), None)
        .unwrap();
    let context = Arc::clone(active.context());
    let native = context.acquire_native().unwrap();
    assert_eq!(context.phase(), ContextPhase::Active);

    // Released with a handle still alive: the native context goes anyway.
    active.after_completion();
    assert!(bridge.native_factory.last().unwrap().is_released());
    assert!(matches!(
        context.acquire_native(),
        Err(BridgeError::State(StateError::Released(_)))
    ));
    assert!(context.destinations().is_err());
    drop(native);
    assert_eq!(context.phase(), ContextPhase::Released);
}

#[test]
fn test_navigation_outside_a_request_is_not_bridged() {
    let bridge = Bridge::new(BeanRegistry::builder().build().unwrap());
    let context = RequestContext::builder(WebRequest::new("/"), Value::new(()))
        .native_factory(bridge.native_factory.clone())
        .build()
        .unwrap();
    let native = context.acquire_native().unwrap();

    let navigation = bridge.integration.navigation_handler();
    assert!(navigation
        .navigation_case(&*native, None, "dispatch:results")
        .unwrap()
        .is_none());
    assert_eq!(bridge.original_navigation.cases(), ["dispatch:results".to_owned()]);
}
