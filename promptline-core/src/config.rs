//! Handler configuration
//!
//! Configuration is read from the process environment on every invocation.
//! Empty values are treated the same as unset ones.

use std::str::FromStr;

/// Model used when `MODEL_ID` is not set
pub const DEFAULT_MODEL_ID: &str = "amazon.nova-pro-v1:0";

/// Region the legacy gateway mode always targets
pub const LEGACY_REGION: &str = "us-east-1";

/// Environment variable holding the model identifier
pub const MODEL_ID_VAR: &str = "MODEL_ID";

/// Environment variable holding the target region
pub const REGION_VAR: &str = "AWS_REGION";

/// Environment variable selecting the [`HandlerMode`]
pub const HANDLER_MODE_VAR: &str = "HANDLER_MODE";

/// Which flavour of event handling to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HandlerMode {
    /// Direct, OPTIONS, custom-resource and gateway events; profile chosen by model ID
    #[default]
    Full,

    /// Gateway events only, fixed Nova model, every failure answered with 500
    Legacy,
}

impl FromStr for HandlerMode {
    type Err = std::convert::Infallible;

    /// Unknown values fall back to [`HandlerMode::Full`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Self::Legacy,
            _ => Self::Full,
        })
    }
}

/// Settings for a single dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    model_id: String,
    region: Option<String>,
    mode: HandlerMode,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            region: None,
            mode: HandlerMode::Full,
        }
    }
}

impl DispatcherConfig {
    /// Create a config with defaults: Nova Pro, ambient region, full mode
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `MODEL_ID`, `AWS_REGION` and `HANDLER_MODE` from the environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup
    ///
    /// ```
    /// use promptline_core::DispatcherConfig;
    ///
    /// let config = DispatcherConfig::from_lookup(|key| match key {
    ///     "MODEL_ID" => Some("arn:aws:bedrock:us-east-1::foundation-model/x".to_string()),
    ///     _ => None,
    /// });
    /// assert!(config.model_id().starts_with("arn:"));
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        if let Some(model_id) = non_empty(MODEL_ID_VAR) {
            config.model_id = model_id;
        }
        config.region = non_empty(REGION_VAR);
        if let Some(Ok(mode)) = non_empty(HANDLER_MODE_VAR).map(|m| m.parse::<HandlerMode>())
        {
            config.mode = mode;
        }
        config
    }

    /// Set the model identifier
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Set the target region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the handler mode
    pub fn with_mode(mut self, mode: HandlerMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Target region, `None` meaning the SDK's ambient region
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn mode(&self) -> HandlerMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DispatcherConfig::from_lookup(|_| None);
        assert_eq!(config.model_id(), DEFAULT_MODEL_ID);
        assert_eq!(config.region(), None);
        assert_eq!(config.mode(), HandlerMode::Full);
        assert_eq!(config, DispatcherConfig::new());
    }

    #[test]
    fn test_reads_all_keys() {
        let config = DispatcherConfig::from_lookup(lookup_from(&[
            ("MODEL_ID", "arn:aws:bedrock:us-west-2:123:inference-profile/x"),
            ("AWS_REGION", "us-west-2"),
            ("HANDLER_MODE", "legacy"),
        ]));

        assert_eq!(
            config.model_id(),
            "arn:aws:bedrock:us-west-2:123:inference-profile/x"
        );
        assert_eq!(config.region(), Some("us-west-2"));
        assert_eq!(config.mode(), HandlerMode::Legacy);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = DispatcherConfig::from_lookup(lookup_from(&[
            ("MODEL_ID", ""),
            ("AWS_REGION", "  "),
            ("HANDLER_MODE", ""),
        ]));

        assert_eq!(config.model_id(), DEFAULT_MODEL_ID);
        assert_eq!(config.region(), None);
        assert_eq!(config.mode(), HandlerMode::Full);
    }

    #[test]
    fn test_handler_mode_parsing() {
        let cases = [
            ("legacy", HandlerMode::Legacy),
            ("LEGACY", HandlerMode::Legacy),
            (" Legacy ", HandlerMode::Legacy),
            ("full", HandlerMode::Full),
            ("something-else", HandlerMode::Full),
        ];

        for (input, expected) in cases {
            assert_eq!(
                input.parse::<HandlerMode>().unwrap(),
                expected,
                "Failed for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_builder_chaining() {
        let config = DispatcherConfig::new()
            .with_model_id("amazon.nova-lite-v1:0")
            .with_region("eu-west-1")
            .with_mode(HandlerMode::Legacy);

        assert_eq!(config.model_id(), "amazon.nova-lite-v1:0");
        assert_eq!(config.region(), Some("eu-west-1"));
        assert_eq!(config.mode(), HandlerMode::Legacy);
    }
}
