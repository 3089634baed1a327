use navbridge_core::{
    BoxError, Bookmarkable, BridgeError, DataError, Destination, DestinationViewResolver, Locale,
    Model, View, WebRequest, WebResponse,
};
use std::collections::HashSet;
use std::sync::Arc;
use url::form_urlencoded;

/// Destination prefix of plain redirects.
pub const REDIRECT_PREFIX: &str = "redirect:";

/// Redirects to a URI template expanded against the model.
///
/// `{name}` placeholders are filled from the model and must be present.
/// Every other model entry with a simple value (strings, numbers, booleans)
/// is appended as a query parameter. Templates starting with `/` are relative
/// to the application context path.
#[derive(Debug, Clone)]
pub struct BookmarkableRedirectView {
    template: String,
    context_relative: bool,
}

impl BookmarkableRedirectView {
    /// A redirect to `template`.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            context_relative: true,
        }
    }

    /// Do not prefix the context path.
    pub fn absolute(mut self) -> Self {
        self.context_relative = false;
        self
    }

    /// The URI template.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Expand the template into the redirect URL.
    pub fn expand(&self, model: &Model, request: &WebRequest) -> Result<String, DataError> {
        let mut url = String::new();
        if self.context_relative && self.template.starts_with('/') {
            url.push_str(request.context_path());
        }

        let mut used = HashSet::new();
        let mut rest = self.template.as_str();
        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|close| open + close) else {
                break;
            };
            url.push_str(&rest[..open]);
            let variable = &rest[open + 1..close];
            let value = model
                .get(variable)
                .and_then(|value| value.to_display_string())
                .ok_or_else(|| DataError::MissingTemplateVariable {
                    template: self.template.clone(),
                    variable: variable.to_owned(),
                })?;
            url.push_str(&encode_path_segment(&value));
            used.insert(variable);
            rest = &rest[close + 1..];
        }
        url.push_str(rest);

        let mut query = form_urlencoded::Serializer::new(String::new());
        let mut has_query = false;
        for (key, value) in model.iter() {
            if used.contains(key) {
                continue;
            }
            if let Some(value) = value.to_display_string() {
                query.append_pair(key, &value);
                has_query = true;
            }
        }
        if has_query {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query.finish());
        }
        Ok(url)
    }
}

fn encode_path_segment(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

impl View for BookmarkableRedirectView {
    fn render(
        &self,
        model: &Model,
        request: &WebRequest,
        response: &mut WebResponse,
    ) -> Result<(), BoxError> {
        let url = self.expand(model, request)?;
        response.send_redirect(url);
        Ok(())
    }

    fn as_bookmarkable(&self) -> Option<&dyn Bookmarkable> {
        Some(self)
    }
}

impl Bookmarkable for BookmarkableRedirectView {
    fn bookmark_url(&self, model: &Model, request: &WebRequest) -> Result<String, BoxError> {
        Ok(self.expand(model, request)?)
    }
}

/// Resolves `redirect:` destinations.
#[derive(Debug, Default)]
pub struct RedirectDestinationViewResolver;

impl DestinationViewResolver for RedirectDestinationViewResolver {
    fn resolve_destination(
        &self,
        destination: &Destination,
        _: &Locale,
    ) -> Result<Option<Arc<dyn View>>, BridgeError> {
        Ok(destination
            .as_name()
            .and_then(|name| name.strip_prefix(REDIRECT_PREFIX))
            .map(|target| Arc::new(BookmarkableRedirectView::new(target)) as Arc<dyn View>))
    }
}
