//! Request and response as seen by both host frameworks.

use crate::model::Parameters;
use crate::value::Value;
use indexmap::IndexMap;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A language tag such as `en` or `fr-CA`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale(String);

impl Locale {
    /// Create a locale from a language tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The language tag.
    pub fn tag(&self) -> &str {
        &self.0
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new("en")
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Framework-native objects attached to a request, keyed by type.
#[derive(Debug, Clone, Default)]
pub struct Extensions {
    map: HashMap<TypeId, Value>,
}

impl Extensions {
    /// Attach a value, replacing any value of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.map.insert(TypeId::of::<T>(), Value::new(value));
    }

    /// Look up a value by type.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.map.get(&TypeId::of::<T>()).and_then(Value::downcast)
    }

    /// Look up a value by `TypeId`.
    pub fn get_by_id(&self, type_id: TypeId) -> Option<&Value> {
        self.map.get(&type_id)
    }
}

/// An incoming request.
#[derive(Debug, Clone, Default)]
pub struct WebRequest {
    context_path: String,
    path: String,
    parameters: Parameters,
    locale: Locale,
    extensions: Extensions,
}

impl WebRequest {
    /// Create a request for a context-relative path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Set the application context path (for example `/app`).
    pub fn with_context_path(mut self, context_path: impl Into<String>) -> Self {
        self.context_path = context_path.into();
        self
    }

    /// Add a request parameter value.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    /// Set the locale.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Attach a framework-native object.
    pub fn with_extension<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.extensions.insert(value);
        self
    }

    /// The application context path.
    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    /// The context-relative path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The full request URI (context path + path).
    pub fn uri(&self) -> String {
        format!("{}{}", self.context_path, self.path)
    }

    /// All request parameters.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// First value of a parameter.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// The request locale.
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Framework-native objects.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }
}

/// An outgoing response.
#[derive(Debug, Clone)]
pub struct WebResponse {
    status: u16,
    headers: IndexMap<String, String>,
    body: String,
    committed: bool,
}

impl Default for WebResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: IndexMap::new(),
            body: String::new(),
            committed: false,
        }
    }
}

impl WebResponse {
    /// Create an empty `200` response.
    pub fn new() -> Self {
        Self::default()
    }

    /// The status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Set the status code.
    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Set a header.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Look up a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Append body content and commit the response.
    pub fn write(&mut self, content: &str) {
        self.body.push_str(content);
        self.committed = true;
    }

    /// The body written so far.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Send a `302` redirect and commit the response.
    pub fn send_redirect(&mut self, location: impl Into<String>) {
        self.status = 302;
        self.set_header("Location", location);
        self.committed = true;
    }

    /// The redirect target, if a redirect was sent.
    pub fn redirect_location(&self) -> Option<&str> {
        match self.status {
            301 | 302 | 303 | 307 | 308 => self.header("Location"),
            _ => None,
        }
    }

    /// Whether anything has been written.
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Apply what was written to `other` on top of this response.
    ///
    /// The body is appended, headers overwrite, and a non-`200` status wins.
    pub fn merge(&mut self, other: WebResponse) {
        if other.status != 200 {
            self.status = other.status;
        }
        self.headers.extend(other.headers);
        self.body.push_str(&other.body);
        self.committed |= other.committed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tenant(&'static str);

    #[test]
    fn test_parameters_accumulate() {
        let request = WebRequest::new("/hotels")
            .with_parameter("q", "paris")
            .with_parameter("tag", "a")
            .with_parameter("tag", "b");
        assert_eq!(request.parameter("q"), Some("paris"));
        assert_eq!(request.parameters()["tag"], vec!["a", "b"]);
        assert_eq!(request.parameter("missing"), None);
    }

    #[test]
    fn test_extensions_by_type() {
        let request = WebRequest::new("/").with_extension(Tenant("acme"));
        assert_eq!(request.extensions().get::<Tenant>().unwrap().0, "acme");
        assert!(request.extensions().get::<String>().is_none());
    }

    #[test]
    fn test_redirect_commits() {
        let mut response = WebResponse::new();
        assert!(!response.is_committed());
        response.send_redirect("/app/hotels/1");
        assert!(response.is_committed());
        assert_eq!(response.redirect_location(), Some("/app/hotels/1"));
    }

    #[test]
    fn test_merge_keeps_earlier_writes() {
        let mut response = WebResponse::new();
        response.write("head;");
        response.set_header("X-Trace", "1");

        let mut rendered = WebResponse::new();
        rendered.set_header("Content-Type", "text/html");
        rendered.write("body;");
        response.merge(rendered);

        assert_eq!(response.body(), "head;body;");
        assert_eq!(response.status(), 200);
        assert_eq!(response.header("X-Trace"), Some("1"));
        assert_eq!(response.header("Content-Type"), Some("text/html"));

        let mut redirect = WebResponse::new();
        redirect.send_redirect("/app/hotels");
        response.merge(redirect);
        assert_eq!(response.redirect_location(), Some("/app/hotels"));
    }
}
