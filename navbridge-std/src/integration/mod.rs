//! # View Framework Integration
//!
//! The view framework exposes no event bus. The bridge wraps three of its
//! singletons instead, each keeping the original as a delegate:
//!
//! - [`BridgeNavigationHandler`] offers every navigation to the outcome
//!   resolver and hands claimed ones back to the framework as synthetic view
//!   ids.
//! - [`BridgeViewHandler`] turns synthetic view ids into dispatch-framework
//!   views and builds their model.
//! - [`BridgeResponseStateManager`] marks forms of bridged views so their
//!   postbacks find their way back.
//!
//! [`IntegrationFactory`] composes all three at startup.

mod factory;
mod navigation;
mod state;
mod view;

pub use factory::{Integration, IntegrationFactory};
pub use navigation::BridgeNavigationHandler;
pub use state::{BridgeResponseStateManager, RENDERED_VIEW_PARAMETER};
pub use view::BridgeViewHandler;
