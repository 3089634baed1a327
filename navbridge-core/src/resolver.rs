//! # Resolution Strategies
//!
//! Two strategy contracts sit at the heart of the bridge:
//!
//! - [`NavigationOutcomeResolver`] turns a view-framework navigation into a
//!   [`NavigationOutcome`]. Resolvers are chained with a uniqueness contract:
//!   at most one may claim a given context.
//! - [`DestinationViewResolver`] turns a [`Destination`] into a renderable
//!   [`View`]. Resolvers are chained first-non-null-wins.

use crate::dispatch::View;
use crate::error::BridgeError;
use crate::navigation::{Destination, NavigationContext, NavigationOutcome};
use crate::request::Locale;
use std::sync::Arc;

/// Resolves view-framework navigations.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `NavigationOutcomeResolver`",
    label = "missing `NavigationOutcomeResolver` implementation",
    note = "Resolvers must implement both `can_resolve` and `resolve`."
)]
pub trait NavigationOutcomeResolver: Send + Sync {
    /// Whether this resolver claims `context`.
    fn can_resolve(&self, context: &NavigationContext) -> Result<bool, BridgeError>;

    /// Resolve a claimed context.
    ///
    /// `Ok(None)` means "handled, re-render the current view"; it is not the
    /// same as declining, which is expressed by `can_resolve` returning false.
    fn resolve(&self, context: &NavigationContext)
    -> Result<Option<NavigationOutcome>, BridgeError>;

    /// A name for diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Resolves destinations into views.
pub trait DestinationViewResolver: Send + Sync {
    /// Resolve `destination`.
    ///
    /// Return `Ok(None)` for destinations of a shape this resolver does not
    /// recognise so the next resolver can try. Errors are reserved for
    /// destinations that were recognised and then failed.
    fn resolve_destination(
        &self,
        destination: &Destination,
        locale: &Locale,
    ) -> Result<Option<Arc<dyn View>>, BridgeError>;
}

impl<T: NavigationOutcomeResolver + ?Sized> NavigationOutcomeResolver for Arc<T> {
    fn can_resolve(&self, context: &NavigationContext) -> Result<bool, BridgeError> {
        (**self).can_resolve(context)
    }

    fn resolve(
        &self,
        context: &NavigationContext,
    ) -> Result<Option<NavigationOutcome>, BridgeError> {
        (**self).resolve(context)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<T: DestinationViewResolver + ?Sized> DestinationViewResolver for Arc<T> {
    fn resolve_destination(
        &self,
        destination: &Destination,
        locale: &Locale,
    ) -> Result<Option<Arc<dyn View>>, BridgeError> {
        (**self).resolve_destination(destination, locale)
    }
}
