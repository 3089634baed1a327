use super::redirect::BookmarkableRedirectView;
use crate::bean::{BeanDefinition, BeanRegistry};
use crate::config::BridgeConfig;
use crate::context::ContextProvider;
use navbridge_core::{BridgeError, ConfigError, Destination, DestinationViewResolver, Locale, View};
use std::sync::Arc;
use tracing::debug;

/// Resolves method-reference destinations into redirects to request-mapped
/// handler methods.
///
/// `@hotelsController.show` names the `show` handler of `hotelsController`;
/// `@show` names the `show` handler of the controller serving the current
/// request. The target must be exactly one handler method carrying a request
/// mapping, and the redirect goes to that mapping's URI template.
pub struct HandlerMethodDestinationViewResolver {
    beans: Arc<BeanRegistry>,
    provider: Arc<dyn ContextProvider>,
    prefix: String,
}

impl HandlerMethodDestinationViewResolver {
    /// Resolve against `beans`, using the configured destination prefix.
    pub fn new(
        beans: Arc<BeanRegistry>,
        provider: Arc<dyn ContextProvider>,
        config: &BridgeConfig,
    ) -> Self {
        Self {
            beans,
            provider,
            prefix: config.destination_prefix().to_owned(),
        }
    }

    fn bean(&self, name: Option<&str>, token: &str) -> Result<&Arc<BeanDefinition>, ConfigError> {
        match name {
            Some(name) => self
                .beans
                .find(name)
                .ok_or_else(|| ConfigError::UnknownBean(name.to_owned())),
            None => self
                .provider
                .current()
                .and_then(|context| context.controller().cloned())
                .and_then(|controller| self.beans.find_by_instance(&controller))
                .ok_or_else(|| ConfigError::NoCurrentBean(token.to_owned())),
        }
    }

    fn resolve_token(&self, token: &str, reference: &str) -> Result<BookmarkableRedirectView, ConfigError> {
        let (bean_name, method) = match reference.rsplit_once('.') {
            Some((bean, method)) => (Some(bean), method),
            None => (None, reference),
        };
        let bean = self.bean(bean_name, token)?;

        let candidates: Vec<_> = bean
            .handler_methods()
            .iter()
            .filter(|handler| handler.name() == method)
            .filter_map(|handler| handler.path().map(|path| (handler, path)))
            .collect();
        match candidates.as_slice() {
            [] => Err(ConfigError::UnknownHandlerMethod {
                bean: bean.name().to_owned(),
                method: method.to_owned(),
            }),
            [(handler, path)] => {
                debug!(token, bean = bean.name(), path, location = %handler.location(), "method reference resolved");
                Ok(BookmarkableRedirectView::new(*path))
            }
            _ => Err(ConfigError::AmbiguousHandlerMethod {
                bean: bean.name().to_owned(),
                method: method.to_owned(),
                candidates: candidates
                    .iter()
                    .map(|(handler, path)| {
                        let location = handler.location();
                        format!("{} {} ({}:{})", handler.name(), path, location.file(), location.line())
                    })
                    .collect(),
            }),
        }
    }
}

impl DestinationViewResolver for HandlerMethodDestinationViewResolver {
    fn resolve_destination(
        &self,
        destination: &Destination,
        _: &Locale,
    ) -> Result<Option<Arc<dyn View>>, BridgeError> {
        let Some(token) = destination.as_name() else {
            return Ok(None);
        };
        let Some(reference) = token.strip_prefix(self.prefix.as_str()) else {
            return Ok(None);
        };
        let view = self.resolve_token(token, reference)?;
        Ok(Some(Arc::new(view)))
    }
}
