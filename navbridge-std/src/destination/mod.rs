//! # Destination View Resolution
//!
//! A [`Destination`](navbridge_core::Destination) is turned into a renderable
//! view by a [`DestinationViewResolverChain`]; the first resolver returning a
//! view wins. Resolvers return `Ok(None)` for destinations they do not
//! recognise.
//!
//! | Resolver                                | Recognises                         |
//! |-----------------------------------------|------------------------------------|
//! | [`HandlerMethodDestinationViewResolver`] | `@bean.method`, `@method`          |
//! | [`RedirectDestinationViewResolver`]     | `redirect:/path/{var}`             |
//! | [`ViewResolverAdapter`]                 | names known to the dispatch framework |
//! | [`NativeViewResolver`]                  | any plain name, as a view framework view |

mod chain;
mod method_reference;
mod native;
mod redirect;

pub use chain::{
    DestinationViewResolverChain, DestinationViewResolverChainBuilder, ViewResolverAdapter,
};
pub use method_reference::HandlerMethodDestinationViewResolver;
pub use native::{NativeView, NativeViewResolver};
pub use redirect::{BookmarkableRedirectView, REDIRECT_PREFIX, RedirectDestinationViewResolver};
