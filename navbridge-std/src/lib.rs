//! # navbridge-std
//!
//! Standard implementations for the navbridge view/dispatch bridge.
//!
//! This crate provides:
//! - **Outcome resolution**: [`NavigationOutcomeResolverChain`](outcome::NavigationOutcomeResolverChain),
//!   mapped navigation methods and implicit `dispatch:` outcomes
//! - **Destination resolution**: [`DestinationViewResolverChain`](destination::DestinationViewResolverChain),
//!   redirects, method references and native views
//! - **Invocation**: typed navigation methods with pluggable argument and
//!   return value pipelines
//! - **Request scope**: [`RequestContext`](context::RequestContext), the
//!   synthetic key registries and the dispatch [`interceptor`]
//! - **Integration**: decorators for the view framework's singletons

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use navbridge_core;

// Modules
pub mod bean;
pub mod config;
pub mod context;
pub mod destination;
pub mod integration;
pub mod interceptor;
pub mod invocation;
pub mod model_builder;
pub mod outcome;
pub mod registry;
pub mod testing;

#[cfg(feature = "inventory")]
pub mod collected;

#[cfg(feature = "inventory")]
pub use inventory;
