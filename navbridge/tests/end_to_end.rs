use navbridge::{
    BeanDefinition, BeanRegistry, NavigationHandler, Parameters, Value, ViewHandler, WebRequest,
    invocation::{ModelMap, Outcome},
    outcome::NavigationMapping,
};
use std::sync::Arc;

mod common;
use common::{Bridge, BookingController, HotelsController};

fn hotel_beans(hotels: Arc<HotelsController>) -> BeanRegistry {
    BeanRegistry::builder()
        .bean(
            BeanDefinition::controller("hotelsController", hotels)
                .navigation("onSearch", NavigationMapping::new(), |model: ModelMap| {
                    model.insert("q", "paris");
                    "results"
                })
                .navigation(
                    "show",
                    NavigationMapping::new().outcome("details"),
                    |model: ModelMap| {
                        model.insert("id", "7");
                        "@hotelsController.show"
                    },
                )
                .request_mapping("show", "/hotels/{id}")
                .request_mapping("list", "/hotels"),
        )
        .build()
        .unwrap()
}

fn hotels_request() -> WebRequest {
    WebRequest::new("/hotels").with_context_path("/app")
}

#[test]
fn test_preemptive_search_renders_dispatch_view() {
    let hotels = Arc::new(HotelsController);
    let bridge = Bridge::new(hotel_beans(Arc::clone(&hotels)));
    let active = bridge
        .interceptor
        .pre_handle(hotels_request(), Value::new(()), Some(Value::from_arc(hotels)))
        .unwrap();
    let context = Arc::clone(active.context());
    let native = context.acquire_native().unwrap();

    let case = bridge
        .integration
        .navigation_handler()
        .navigation_case(&*native, None, "search")
        .unwrap()
        .unwrap();
    assert!(case.is_redirect());
    assert_eq!(case.from_outcome(), "search");

    let outcome = context.outcomes().unwrap().get(case.to_view_id()).unwrap();
    assert_eq!(outcome.destination().as_name(), Some("results"));
    assert!(outcome.parameters().is_none());
    assert_eq!(
        outcome.implicit_model().and_then(|model| model.get_str("q")),
        Some("paris")
    );

    let views = bridge.integration.view_handler();
    let root = views.create_view(&*native, case.to_view_id()).unwrap();
    assert!(root.delegated_render().is_some());
    assert_eq!(
        views.action_url(&*native, case.to_view_id()).unwrap(),
        "/app/hotels"
    );
    views.render_view(&*native, &root).unwrap();

    let rendered = bridge.results.rendered_models();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].get_str("q"), Some("paris"));
    assert!(bridge.original_navigation.cases().is_empty());
    assert!(bridge.original_views.created().is_empty());

    drop(native);
    let response = active.after_completion();
    assert_eq!(response.body(), "results");
    assert!(context.is_released());
    assert!(bridge.native_factory.last().unwrap().is_released());
}

#[test]
fn test_action_navigation_replaces_view_root() {
    let hotels = Arc::new(HotelsController);
    let bridge = Bridge::new(hotel_beans(Arc::clone(&hotels)));
    let active = bridge
        .interceptor
        .pre_handle(hotels_request(), Value::new(()), Some(Value::from_arc(hotels)))
        .unwrap();
    let native = active.context().acquire_native().unwrap();

    bridge
        .integration
        .navigation_handler()
        .handle_navigation(&*native, Some("#{hotelsController.search}"), Some("search"))
        .unwrap();

    let root = native.view_root().unwrap();
    assert!(active.context().destinations().unwrap().owns(root.view_id()));
    let render = root.delegated_render().unwrap();
    assert_eq!(render.model().get_str("q"), Some("paris"));
    assert_eq!(render.view().content_type(), Some("text/results"));
    assert!(bridge.original_navigation.handled().is_empty());
}

#[test]
fn test_method_reference_redirects_to_handler_mapping() {
    let hotels = Arc::new(HotelsController);
    let bridge = Bridge::new(hotel_beans(Arc::clone(&hotels)));
    let active = bridge
        .interceptor
        .pre_handle(hotels_request(), Value::new(()), Some(Value::from_arc(hotels)))
        .unwrap();
    let native = active.context().acquire_native().unwrap();

    let case = bridge
        .integration
        .navigation_handler()
        .navigation_case(&*native, None, "details")
        .unwrap()
        .unwrap();
    let url = bridge
        .integration
        .view_handler()
        .redirect_url(&*native, case.to_view_id(), &Parameters::new())
        .unwrap();
    assert_eq!(url, "/app/hotels/7");
}

#[test]
fn test_implicit_dispatch_outcomes() {
    let bridge = Bridge::new(BeanRegistry::builder().build().unwrap());
    let active = bridge
        .interceptor
        .pre_handle(hotels_request(), Value::new(()), None)
        .unwrap();
    let native = active.context().acquire_native().unwrap();
    let navigation = bridge.integration.navigation_handler();
    let views = bridge.integration.view_handler();

    let case = navigation
        .navigation_case(&*native, None, "dispatch:redirect:/hotels")
        .unwrap()
        .unwrap();
    assert_eq!(
        views
            .bookmarkable_url(&*native, case.to_view_id(), &Parameters::new())
            .unwrap(),
        "/app/hotels"
    );

    navigation
        .handle_navigation(&*native, None, Some("dispatch:results"))
        .unwrap();
    let root = native.view_root().unwrap();
    assert_eq!(
        root.delegated_render().unwrap().view().content_type(),
        Some("text/results")
    );
}

#[test]
fn test_unclaimed_outcomes_reach_original_handler() {
    let hotels = Arc::new(HotelsController);
    let bridge = Bridge::new(hotel_beans(hotels));
    let active = bridge
        .interceptor
        .pre_handle(
            hotels_request(),
            Value::new(()),
            Some(Value::new(BookingController)),
        )
        .unwrap();
    let native = active.context().acquire_native().unwrap();
    let navigation = bridge.integration.navigation_handler();

    // "search" belongs to the hotels controller, which is not handling this request.
    assert!(navigation.navigation_case(&*native, None, "search").unwrap().is_none());
    navigation
        .handle_navigation(&*native, None, Some("home"))
        .unwrap();

    assert_eq!(bridge.original_navigation.cases(), ["search".to_owned()]);
    assert_eq!(bridge.original_navigation.handled(), [Some("home".to_owned())]);
    assert!(native.view_root().is_none());
}

#[test]
fn test_outcome_handler_method_can_stay_on_view() {
    let bridge = Bridge::new(
        BeanRegistry::builder()
            .bean(
                BeanDefinition::global("navigation", Arc::new(HotelsController)).navigation(
                    "refresh",
                    NavigationMapping::new(),
                    |outcome: Outcome| {
                        assert_eq!(outcome.0, "refresh");
                    },
                ),
            )
            .build()
            .unwrap(),
    );
    let active = bridge
        .interceptor
        .pre_handle(hotels_request(), Value::new(()), None)
        .unwrap();
    let native = active.context().acquire_native().unwrap();

    bridge
        .integration
        .navigation_handler()
        .handle_navigation(&*native, None, Some("refresh"))
        .unwrap();
    assert!(native.view_root().is_none());
    assert!(bridge.original_navigation.handled().is_empty());
    assert!(active.context().destinations().unwrap().is_empty());
}
