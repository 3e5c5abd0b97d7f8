//! # Application Configuration
//!
//! Configuration shared by the CLI, the diagnostic probe and the library.
//!
//! ## Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `API_KEY` | yes | – | Credential for the generative model API |
//! | `UPCYCLE_MODEL` | no | `gemini-2.5-flash` | Model name |
//! | `UPCYCLE_API_BASE` | no | `https://generativelanguage.googleapis.com` | API root |
//! | `UPCYCLE_GEO_ENDPOINT` | no | `http://ip-api.com/json` | Automatic location lookup |
//!
//! A missing `API_KEY` is not a load error: the configuration still loads so
//! the surface can show a configuration screen. [`AppConfig::require_api_key`]
//! is the check that turns it into an error.
//!
//! ## Examples
//!
//! ```rust
//! use upcycle_impact::config::AppConfig;
//!
//! let config = AppConfig::default().with_api_key("test-key");
//! assert!(config.validate().is_ok());
//! assert_eq!(config.require_api_key().unwrap(), "test-key");
//! ```

use std::time::Duration;

use upcycle_scale::presets::PhotoPreset;

use crate::error::{UpcycleError, UpcycleResult};
use crate::impact::{CostPolicy, ImpactCalculator};

pub const API_KEY_VAR: &str = "API_KEY";
pub const MODEL_VAR: &str = "UPCYCLE_MODEL";
pub const API_BASE_VAR: &str = "UPCYCLE_API_BASE";
pub const GEO_ENDPOINT_VAR: &str = "UPCYCLE_GEO_ENDPOINT";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEO_ENDPOINT: &str = "http://ip-api.com/json";

/// Configuration for one analysis session.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Credential for the model API. `None` until set.
    pub api_key: Option<String>,

    /// Model used for classification.
    pub model: String,

    /// Root URL of the model API, without trailing slash.
    pub api_base: String,

    /// URL queried for automatic location lookup.
    pub geolocation_endpoint: String,

    /// Longest side of the photo sent to the model.
    pub photo_preset: PhotoPreset,

    /// JPEG quality of the encoded payload (1-100).
    pub jpeg_quality: u8,

    /// How the upcycling cost is estimated.
    pub cost_policy: CostPolicy,

    /// Result card scale factor over its 400×500 base size (1-4).
    pub card_pixel_ratio: u32,

    /// Optional cap on the classification request. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            geolocation_endpoint: DEFAULT_GEO_ENDPOINT.to_string(),
            photo_preset: PhotoPreset::default(),
            jpeg_quality: 85,
            cost_policy: CostPolicy::default(),
            card_pixel_ratio: 2,
            request_timeout: None,
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();
        config.api_key = get(API_KEY_VAR);
        if let Some(model) = get(MODEL_VAR) {
            config.model = model;
        }
        if let Some(base) = get(API_BASE_VAR) {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(endpoint) = get(GEO_ENDPOINT_VAR) {
            config.geolocation_endpoint = endpoint;
        }
        config
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_geolocation_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.geolocation_endpoint = endpoint.into();
        self
    }

    pub fn with_cost_policy(mut self, policy: CostPolicy) -> Self {
        self.cost_policy = policy;
        self
    }

    pub fn with_photo_preset(mut self, preset: PhotoPreset) -> Self {
        self.photo_preset = preset;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// The credential, or the configuration error that blocks all analysis.
    pub fn require_api_key(&self) -> UpcycleResult<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(UpcycleError::configuration(
                API_KEY_VAR,
                "environment variable is not set",
            )),
        }
    }

    /// Validates the configuration parameters (the credential is checked separately).
    pub fn validate(&self) -> UpcycleResult<()> {
        if self.model.trim().is_empty() {
            return Err(UpcycleError::validation("model", "must not be empty", ""));
        }
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            return Err(UpcycleError::validation(
                "api_base",
                "must be an http(s) URL",
                self.api_base.clone(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(UpcycleError::validation(
                "jpeg_quality",
                "must be between 1 and 100",
                self.jpeg_quality.to_string(),
            ));
        }
        if !(1..=4).contains(&self.card_pixel_ratio) {
            return Err(UpcycleError::validation(
                "card_pixel_ratio",
                "must be between 1 and 4",
                self.card_pixel_ratio.to_string(),
            ));
        }
        Ok(())
    }

    /// Impact calculator bound to the configured cost policy.
    pub fn calculator(&self) -> ImpactCalculator {
        ImpactCalculator::with_policy(self.cost_policy)
    }

    /// Full URL of the `generateContent` method for the configured model.
    pub fn generate_content_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.jpeg_quality, 85);
        assert_eq!(config.cost_policy, CostPolicy::ConditionAware);
        assert!(config.request_timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let config = AppConfig::from_lookup(env(&[("API_KEY", "   ")]));
        let err = config.require_api_key().unwrap_err();
        assert_eq!(err.category(), "configuration");
        assert!(err.to_string().contains("API_KEY"));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = AppConfig::from_lookup(env(&[
            ("API_KEY", "abc"),
            ("UPCYCLE_MODEL", "gemini-2.0-pro"),
            ("UPCYCLE_API_BASE", "http://127.0.0.1:9999/"),
        ]));
        assert_eq!(config.require_api_key().unwrap(), "abc");
        assert_eq!(
            config.generate_content_url(),
            "http://127.0.0.1:9999/v1beta/models/gemini-2.0-pro:generateContent"
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.jpeg_quality = 0;
        assert!(config.validate().is_err());
        config.jpeg_quality = 85;

        config.card_pixel_ratio = 9;
        assert!(config.validate().is_err());
        config.card_pixel_ratio = 2;

        config.api_base = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
        config.api_base = DEFAULT_API_BASE.to_string();

        config.model = " ".to_string();
        assert!(config.validate().is_err());
    }
}
