//! # navbridge-core
//!
//! Core types and traits for bridging a stateful, component-tree view
//! framework with an action-dispatch web framework.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! adapters that plug a concrete framework into the bridge without pulling in
//! the standard implementations from `navbridge-std`.
//!
//! # The Seam
//!
//! The view framework can only navigate to a view id string. The dispatch
//! framework wants rich outcomes: a destination plus a model. The bridge
//! closes that gap with two strategy contracts:
//!
//! ## Outcome Resolution ([`NavigationOutcomeResolver`])
//!
//! Turns a [`NavigationContext`] into a [`NavigationOutcome`].
//!
//! - **Exclusive**: at most one resolver in a chain may claim a context
//! - **Tri-state**: declining, "handled, stay here" and "navigate" are distinct
//!
//! ## Destination Resolution ([`DestinationViewResolver`])
//!
//! Turns a [`Destination`] into a renderable dispatch-framework [`View`].
//!
//! - **Chained**: first non-null result wins
//! - **Tolerant**: unrecognised destination shapes yield `None`, never an error
//!
//! ## Framework Collaborators
//!
//! - [`framework`]: the view framework's extension points
//!   ([`NavigationHandler`], [`ViewHandler`], [`ResponseStateManager`]) and
//!   its heavyweight [`NativeContext`]
//! - [`dispatch`]: the dispatch framework's [`View`], [`ViewResolver`] and
//!   [`BinderFactory`]
//!
//! # Error Types
//!
//! - [`BridgeError`] - Top-level error type
//! - [`ConfigError`] - Wiring mistakes
//! - [`ResolutionError`] - Claimed work that could not be completed
//! - [`StateError`] - Misuse of the per-request context
//! - [`DataError`] - Values a binding required but could not obtain

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod component;
mod error;
mod model;
mod navigation;
mod request;
mod resolver;
mod value;

pub mod dispatch;
pub mod framework;

// Re-exports
pub use component::{ComponentRef, DelegatedRender, UiEvent, UiEventKind, UiParameter, ViewRoot};
pub use dispatch::{BinderFactory, Bookmarkable, DataBinder, View, ViewResolver};
pub use error::{BoxError, BridgeError, ConfigError, DataError, ResolutionError, StateError};
pub use framework::{
    ExpressionResolver, NativeContext, NativeContextFactory, NavigationCase, NavigationHandler,
    RenderLifecycle, ResponseStateManager, ViewHandler,
};
pub use model::{Model, ModelHolder, Parameters};
pub use navigation::{Destination, NavigationContext, NavigationContextBuilder, NavigationOutcome};
pub use request::{Extensions, Locale, WebRequest, WebResponse};
pub use resolver::{DestinationViewResolver, NavigationOutcomeResolver};
pub use value::Value;

pub use indexmap;
