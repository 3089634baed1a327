//! # navbridge - View/Dispatch Navigation Bridge
//!
//! `navbridge` lets a component-tree view framework hand its navigations to an
//! action-dispatch framework, and lets dispatch handlers render view framework
//! views. Navigation outcomes are resolved by mapped methods on registered
//! beans, stored under synthetic view ids, and turned back into dispatch views
//! when the view framework asks for them.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use navbridge::prelude::*;
//!
//! let beans = Arc::new(
//!     BeanRegistry::builder()
//!         .bean(
//!             BeanDefinition::controller("hotelsController", Arc::new(HotelsController))
//!                 .navigation("onSearch", NavigationMapping::new().outcome("search"), |model: ModelMap| {
//!                     model.insert("q", "paris");
//!                     "results"
//!                 }),
//!         )
//!         .build()?,
//! );
//!
//! let provider: Arc<dyn ContextProvider> = Arc::new(ThreadContextProvider);
//! let mapped = MappedNavigationOutcomeResolver::new(Arc::default(), provider.clone());
//! mapped.on_context_refreshed(&beans, &BridgeConfig::default())?;
//!
//! let integration = IntegrationFactory::new()
//!     .navigation_handler(original_navigation)
//!     .view_handler(original_views)
//!     .state_manager(original_state)
//!     .outcome_resolver(Arc::new(
//!         NavigationOutcomeResolverChain::builder().resolver(Arc::new(mapped)).build(),
//!     ))
//!     .destination_resolver(Arc::new(destinations))
//!     .build()?;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use navbridge_core::{
    // Errors
    BoxError,
    BridgeError,
    // Dispatch framework
    BinderFactory,
    Bookmarkable,
    // Components
    ComponentRef,
    ConfigError,
    DataBinder,
    DataError,
    DelegatedRender,
    // Navigation
    Destination,
    DestinationViewResolver,
    // View framework
    ExpressionResolver,
    // Request
    Extensions,
    Locale,
    // Model
    Model,
    ModelHolder,
    NativeContext,
    NativeContextFactory,
    NavigationCase,
    NavigationContext,
    NavigationContextBuilder,
    NavigationHandler,
    NavigationOutcome,
    NavigationOutcomeResolver,
    Parameters,
    RenderLifecycle,
    ResolutionError,
    ResponseStateManager,
    StateError,
    UiEvent,
    UiEventKind,
    UiParameter,
    // Values
    Value,
    View,
    ViewHandler,
    ViewResolver,
    ViewRoot,
    WebRequest,
    WebResponse,
};

// Startup
pub use navbridge_std::{
    bean::{BeanDefinition, BeanRegistry, BeanRegistryBuilder, BeanScope},
    config::BridgeConfig,
};

// Request scope
pub use navbridge_std::{
    context::{
        ContextPhase, ContextProvider, ContextScope, NativeContextHandle, RenderingArtifact,
        RequestContext, ThreadContextProvider,
    },
    interceptor::{ActiveRequest, BridgeInterceptor},
    registry::{DestinationAndModel, DestinationRegistry, OutcomeRegistry},
};

// Integration
pub use navbridge_std::integration::{
    BridgeNavigationHandler, BridgeResponseStateManager, BridgeViewHandler, Integration,
    IntegrationFactory, RENDERED_VIEW_PARAMETER,
};

#[cfg(feature = "inventory")]
pub use navbridge_std::{collected::CollectedNavigationMapping, inventory};

/// Navigation outcome resolvers.
pub mod outcome {
    #![allow(clippy::wildcard_imports)]
    pub use navbridge_std::outcome::*;
}

/// Destination view resolvers.
pub mod destination {
    #![allow(clippy::wildcard_imports)]
    pub use navbridge_std::destination::*;
}

/// Navigation method invocation.
pub mod invocation {
    #![allow(clippy::wildcard_imports)]
    pub use navbridge_std::invocation::*;
}

/// Model merging.
pub mod model_builder {
    #![allow(clippy::wildcard_imports)]
    pub use navbridge_std::model_builder::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use navbridge_std::testing::*;
}

/// Prelude module - common imports for navbridge.
///
/// # Usage
///
/// ```rust,ignore
/// use navbridge::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Startup
        BeanDefinition,
        BeanRegistry,
        BridgeConfig,
        // Errors
        BridgeError,
        // Request scope
        BridgeInterceptor,
        ContextProvider,
        Destination,
        DestinationViewResolver,
        IntegrationFactory,
        Model,
        NavigationContext,
        NavigationOutcome,
        NavigationOutcomeResolver,
        RequestContext,
        ThreadContextProvider,
        Value,
        View,
        WebRequest,
    };
    pub use crate::destination::{
        DestinationViewResolverChain, HandlerMethodDestinationViewResolver, NativeViewResolver,
        RedirectDestinationViewResolver, ViewResolverAdapter,
    };
    pub use crate::invocation::{
        Bean, Component, ModelAttribute, ModelMap, Outcome, Request, Response, ViewModel,
    };
    pub use crate::outcome::{
        ImplicitNavigationOutcomeResolver, MappedNavigationOutcomeResolver, NavigationMapping,
        NavigationOutcomeResolverChain,
    };
    pub use std::sync::Arc;
}
