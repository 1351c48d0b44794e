//! Configuration for the map controller
//!
//! The API key is the only setting a style load cannot do without; everything
//! else has a sensible default. Configurations can be built in code, read from
//! JSON or picked up from the environment.

use crate::{
    core::constants::{API_KEY_ENV_VAR, DEFAULT_FIND_ME_ANIMATION, DEFAULT_FOLLOW_ANIMATION},
    scene::style::StyleSelection,
    MapError, Result,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Key sent with every style load as a scene update
    pub api_key: Option<String>,
    /// Camera animation when the find-me button re-centres the map
    pub find_me_animation: Duration,
    /// Camera animation when follow mode tracks a location update
    pub follow_animation: Duration,
    /// Style loaded by `MapController::load_default_style`
    pub default_style: Option<StyleSelection>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            find_me_animation: DEFAULT_FIND_ME_ANIMATION,
            follow_animation: DEFAULT_FOLLOW_ANIMATION,
            default_style: None,
        }
    }
}

impl ControllerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with the API key taken from `MAPZEN_API_KEY`, if set
    pub fn from_env() -> Result<Self> {
        let config = Self {
            api_key: std::env::var(API_KEY_ENV_VAR).ok(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_default_style(mut self, style: StyleSelection) -> Self {
        self.default_style = Some(style);
        self
    }

    /// Rejects a key that is present but blank. An absent key is fine until a style load.
    pub fn validate(&self) -> Result<()> {
        match &self.api_key {
            Some(key) if key.trim().is_empty() => {
                Err(MapError::Config("api_key is set but blank".to_string()))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.find_me_animation, Duration::from_secs(1));
        assert_eq!(config.follow_animation, Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config =
            ControllerConfig::from_json_str(r#"{ "api_key": "testKey", "default_style": "zinc" }"#)
                .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("testKey"));
        assert_eq!(config.default_style, Some(StyleSelection::Zinc));
        assert_eq!(config.find_me_animation, DEFAULT_FIND_ME_ANIMATION);
    }

    #[test]
    fn test_blank_key_is_a_config_error() {
        let err = ControllerConfig::from_json_str(r#"{ "api_key": "  " }"#).unwrap_err();
        assert!(matches!(err, MapError::Config(_)));
    }

    #[test]
    fn test_malformed_json_is_a_serialization_error() {
        let err = ControllerConfig::from_json_str("{ api_key: ").unwrap_err();
        assert!(matches!(err, MapError::Serialization(_)));
    }

    #[test]
    fn test_builder_helpers() {
        let config = ControllerConfig::default()
            .with_api_key("k")
            .with_default_style(StyleSelection::Cinnabar);
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.default_style, Some(StyleSelection::Cinnabar));
    }
}
