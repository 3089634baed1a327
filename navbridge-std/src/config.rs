//! Wiring-time configuration.

/// Prefix that marks an outcome as an implicit dispatch destination.
pub const DEFAULT_OUTCOME_PREFIX: &str = "dispatch:";

/// Prefix that marks a destination as a handler method reference.
pub const DEFAULT_DESTINATION_PREFIX: &str = "@";

/// Options recognised by the bridge.
///
/// Everything here is fixed at wiring time; nothing is looked up while a
/// request is being served.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    outcome_prefix: String,
    destination_prefix: String,
    ignored_method_prefixes: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            outcome_prefix: DEFAULT_OUTCOME_PREFIX.to_owned(),
            destination_prefix: DEFAULT_DESTINATION_PREFIX.to_owned(),
            ignored_method_prefixes: vec!["on".to_owned()],
        }
    }
}

impl BridgeConfig {
    /// The default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the implicit navigation prefix (`dispatch:` by default).
    pub fn with_outcome_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.outcome_prefix = prefix.into();
        self
    }

    /// Set the method reference prefix (`@` by default).
    pub fn with_destination_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.destination_prefix = prefix.into();
        self
    }

    /// Replace the method name prefixes stripped when deriving outcomes.
    pub fn with_ignored_method_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_method_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// The implicit navigation prefix.
    pub fn outcome_prefix(&self) -> &str {
        &self.outcome_prefix
    }

    /// The method reference prefix.
    pub fn destination_prefix(&self) -> &str {
        &self.destination_prefix
    }

    /// Method name prefixes stripped when deriving outcomes.
    pub fn ignored_method_prefixes(&self) -> &[String] {
        &self.ignored_method_prefixes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.outcome_prefix(), "dispatch:");
        assert_eq!(config.destination_prefix(), "@");
        assert_eq!(config.ignored_method_prefixes(), ["on".to_owned()]);
    }

    #[test]
    fn test_overrides() {
        let config = BridgeConfig::new()
            .with_outcome_prefix("spring:")
            .with_ignored_method_prefixes(["handle", "on"]);
        assert_eq!(config.outcome_prefix(), "spring:");
        assert_eq!(config.ignored_method_prefixes().len(), 2);
    }
}
