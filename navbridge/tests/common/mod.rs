#![allow(dead_code)]

use navbridge::{
    BeanRegistry, BridgeConfig, BridgeInterceptor, ContextProvider, Integration,
    IntegrationFactory, NavigationOutcomeResolver, ThreadContextProvider, Value, View,
    ViewResolver,
    destination::{
        DestinationViewResolverChain, HandlerMethodDestinationViewResolver, NativeViewResolver,
        RedirectDestinationViewResolver, ViewResolverAdapter,
    },
    invocation::NavigationMethodInvoker,
    outcome::{
        ImplicitNavigationOutcomeResolver, MappedNavigationOutcomeResolver,
        NavigationOutcomeResolverChain,
    },
    testing::{
        RecordingLifecycle, RecordingNativeContextFactory, RecordingView, StubExpressionResolver,
        StubNavigationHandler, StubResponseStateManager, StubViewHandler, StubViewResolver,
    },
};
use std::sync::{Arc, Once};

// ============================================================================
// Logging
// ============================================================================

static TRACING: Once = Once::new();

/// Route `tracing` output to the test harness. Honours `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Test Beans
// ============================================================================

#[derive(Debug)]
pub struct HotelsController;

#[derive(Debug)]
pub struct BookingController;

#[derive(Debug, PartialEq)]
pub struct Hotel {
    pub name: &'static str,
}

#[derive(Debug)]
pub struct SearchButton;

// ============================================================================
// Bridge Fixture
// ============================================================================

/// The whole bridge wired the way an application would wire it, with the
/// view framework and the dispatch framework replaced by stubs.
pub struct Bridge {
    pub beans: Arc<BeanRegistry>,
    pub interceptor: BridgeInterceptor,
    pub integration: Integration,
    pub native_factory: Arc<RecordingNativeContextFactory>,
    pub lifecycle: Arc<RecordingLifecycle>,
    pub original_navigation: Arc<StubNavigationHandler>,
    pub original_views: Arc<StubViewHandler>,
    pub results: Arc<RecordingView>,
}

impl Bridge {
    pub fn new(beans: BeanRegistry) -> Self {
        init_tracing();
        let beans = Arc::new(beans);
        let config = BridgeConfig::default();
        let provider: Arc<dyn ContextProvider> = Arc::new(ThreadContextProvider);

        let mapped = MappedNavigationOutcomeResolver::new(
            Arc::new(NavigationMethodInvoker::default()),
            Arc::clone(&provider),
        );
        mapped.on_context_refreshed(&beans, &config).unwrap();
        let outcomes = NavigationOutcomeResolverChain::builder()
            .resolver(Arc::new(mapped) as Arc<dyn NavigationOutcomeResolver>)
            .resolver(Arc::new(ImplicitNavigationOutcomeResolver::new(&config)))
            .build();

        let results = Arc::new(RecordingView::new("results"));
        let dispatch: Arc<dyn ViewResolver> = Arc::new(
            StubViewResolver::new().with_shared_view("results", results.clone() as Arc<dyn View>),
        );
        let destinations = DestinationViewResolverChain::builder()
            .resolver(Arc::new(RedirectDestinationViewResolver))
            .resolver(Arc::new(HandlerMethodDestinationViewResolver::new(
                Arc::clone(&beans),
                Arc::clone(&provider),
                &config,
            )))
            .resolver(Arc::new(ViewResolverAdapter::new(vec![dispatch])))
            .resolver(Arc::new(
                NativeViewResolver::new(Arc::clone(&provider))
                    .with_prefix("/WEB-INF/views/")
                    .with_suffix(".xhtml"),
            ))
            .build();

        let original_navigation = Arc::new(StubNavigationHandler::new());
        let original_views = Arc::new(StubViewHandler::new());
        let integration = IntegrationFactory::new()
            .navigation_handler(original_navigation.clone())
            .view_handler(original_views.clone())
            .state_manager(Arc::new(StubResponseStateManager::new()))
            .outcome_resolver(Arc::new(outcomes))
            .destination_resolver(Arc::new(destinations))
            .expressions(Arc::new(
                StubExpressionResolver::new()
                    .with("#{hotel}", Value::new(Hotel { name: "Ritz" }))
                    .with_null("#{missing}"),
            ))
            .provider(provider)
            .build()
            .unwrap();

        let native_factory = Arc::new(RecordingNativeContextFactory::new());
        let lifecycle = Arc::new(RecordingLifecycle::new());
        let interceptor =
            BridgeInterceptor::new(native_factory.clone()).with_lifecycle(lifecycle.clone());

        Self {
            beans,
            interceptor,
            integration,
            native_factory,
            lifecycle,
            original_navigation,
            original_views,
            results,
        }
    }
}
