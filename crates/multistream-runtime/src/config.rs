#![forbid(unsafe_code)]

//! Layout configuration.
//!
//! Every tunable of the layout engine in one [`LayoutConfig`] that can be
//! loaded from TOML or JSON. Missing fields take the defaults of the browser
//! viewer.
//!
//! ```toml
//! gap = 8
//! margin_top = 12
//! initial_cols = 3
//!
//! [aspect_ratio]
//! width = 4
//! height = 3
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use multistream_layout::{
    ASPECT_TOLERANCE_PX, AspectRatio, DEFAULT_GAP, DEFAULT_STORAGE_KEY_PREFIX, Size,
    TileSizeParams, clamp_cols,
};

/// Tunables for a [`LayoutSession`](crate::LayoutSession).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Pixels between tiles.
    pub gap: f64,
    /// Target tile ratio.
    pub aspect_ratio: AspectRatio,
    /// Height drift in pixels tolerated before a resized tile is snapped.
    pub aspect_tolerance: f64,
    /// Inset above the grid, subtracted from the usable height.
    pub header_height: f64,
    /// Top margin, subtracted from the usable height.
    pub margin_top: f64,
    /// Column count of a fresh session.
    pub initial_cols: usize,
    /// Keep the previous tile size while it still fits.
    pub prevent_shrink_on_row_add: bool,
    /// Prefix of every persisted stream-set key.
    pub storage_key_prefix: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            gap: DEFAULT_GAP,
            aspect_ratio: AspectRatio::WIDESCREEN,
            aspect_tolerance: ASPECT_TOLERANCE_PX,
            header_height: 0.0,
            margin_top: 12.0,
            initial_cols: 2,
            prevent_shrink_on_row_add: true,
            storage_key_prefix: DEFAULT_STORAGE_KEY_PREFIX.to_owned(),
        }
    }
}

impl LayoutConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load a file by extension (`.json` is JSON, anything else TOML) and
    /// reject it if [`validate`](Self::validate) reports problems.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_file(path)?,
            _ => Self::from_toml_file(path)?,
        };
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let non_negative = [
            ("gap", self.gap),
            ("aspect_tolerance", self.aspect_tolerance),
            ("header_height", self.header_height),
            ("margin_top", self.margin_top),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!("{name} must be a finite value >= 0, got {value}"));
            }
        }

        if AspectRatio::new(self.aspect_ratio.width, self.aspect_ratio.height).is_none() {
            errors.push(format!(
                "aspect_ratio terms must be > 0, got {}:{}",
                self.aspect_ratio.width, self.aspect_ratio.height
            ));
        }

        if self.initial_cols == 0 {
            errors.push("initial_cols must be > 0".into());
        }

        if self.storage_key_prefix.is_empty() {
            errors.push("storage_key_prefix must not be empty".into());
        }

        errors
    }

    /// Sizing parameters for one pass with these tunables.
    #[must_use]
    pub fn tile_size_params(
        &self,
        container: Size,
        num_tiles: usize,
        cols: usize,
    ) -> TileSizeParams {
        TileSizeParams::new(container, num_tiles, clamp_cols(cols))
            .gap(self.gap)
            .header_height(self.header_height)
            .margin_top(self.margin_top)
            .aspect(self.aspect_ratio)
            .prevent_shrink_on_row_add(self.prevent_shrink_on_row_add)
    }
}

/// Errors that can occur when loading a layout configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_viewer() {
        let config = LayoutConfig::default();
        assert_eq!(config.gap, 8.0);
        assert_eq!(config.aspect_ratio, AspectRatio::WIDESCREEN);
        assert_eq!(config.aspect_tolerance, 2.0);
        assert_eq!(config.header_height, 0.0);
        assert_eq!(config.margin_top, 12.0);
        assert_eq!(config.initial_cols, 2);
        assert!(config.prevent_shrink_on_row_add);
        assert_eq!(config.storage_key_prefix, "multistream-custom-layout:");
    }

    #[test]
    fn default_validates_clean() {
        let errors = LayoutConfig::default().validate();
        assert!(errors.is_empty(), "default should validate: {errors:?}");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = LayoutConfig::from_toml_str(
            r#"
            gap = 4
            initial_cols = 3

            [aspect_ratio]
            width = 4
            height = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.gap, 4.0);
        assert_eq!(config.initial_cols, 3);
        assert_eq!(config.aspect_ratio, AspectRatio::new(4.0, 3.0).unwrap());
        assert_eq!(config.margin_top, 12.0);
    }

    #[test]
    fn json_round_trip() {
        let config = LayoutConfig {
            header_height: 48.0,
            ..LayoutConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(LayoutConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn validate_catches_bad_values() {
        let config = LayoutConfig {
            gap: -1.0,
            aspect_ratio: AspectRatio {
                width: 16.0,
                height: 0.0,
            },
            initial_cols: 0,
            storage_key_prefix: String::new(),
            ..LayoutConfig::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(errors.iter().any(|e| e.contains("gap")));
        assert!(errors.iter().any(|e| e.contains("aspect_ratio")));
        assert!(errors.iter().any(|e| e.contains("initial_cols")));
        assert!(errors.iter().any(|e| e.contains("storage_key_prefix")));
    }

    #[test]
    fn parse_errors_are_typed() {
        assert!(matches!(
            LayoutConfig::from_toml_str("gap = \"wide\""),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            LayoutConfig::from_json_str("{"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn tile_size_params_carry_tunables() {
        let config = LayoutConfig::default();
        let params = config.tile_size_params(Size::new(1600.0, 900.0), 4, 0);
        assert_eq!(params.cols.get(), 1);
        assert_eq!(params.margin_top, 12.0);
        assert_eq!(params.gap, 8.0);
    }
}
