//! Host-tunable layout settings.
//!
//! # Responsibility
//! - Hold layout knobs that are not zoom-dependent.
//! - Load settings from the host's JSON config and validate them.
//!
//! # Invariants
//! - Sizes are finite and non-negative.
//! - `default_color` is a `#RRGGBB` or `#RRGGBBAA` hex color.

use chrono::Weekday;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$").expect("hex color pattern is valid")
});

/// Fallback color when neither the task, its category nor an ancestor has one.
pub const DEFAULT_TASK_COLOR: &str = "#4F6BED";

/// Returns whether `value` is a supported hex display color.
pub fn is_valid_hex_color(value: &str) -> bool {
    HEX_COLOR.is_match(value.trim())
}

/// Layout knobs shared by every zoom level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// First day of a week period.
    pub week_starts_on: Weekday,
    /// Time-axis size floor so short tasks stay clickable.
    pub minimum_visible_size: f64,
    /// Seam between adjacent columns on the cross axis.
    pub column_gutter: f64,
    pub default_color: String,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            week_starts_on: Weekday::Sun,
            minimum_visible_size: 6.0,
            column_gutter: 2.0,
            default_color: DEFAULT_TASK_COLOR.to_string(),
        }
    }
}

impl LayoutSettings {
    /// Parses and validates settings from JSON. Missing keys use defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            serde_json::from_str(raw).map_err(|err| SettingsError::Parse(err.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        check_size("minimum_visible_size", self.minimum_visible_size)?;
        check_size("column_gutter", self.column_gutter)?;
        if !is_valid_hex_color(&self.default_color) {
            return Err(SettingsError::InvalidColor(self.default_color.clone()));
        }
        Ok(())
    }
}

fn check_size(field: &'static str, value: f64) -> Result<(), SettingsError> {
    if !value.is_finite() || value < 0.0 {
        return Err(SettingsError::InvalidSize { field, value });
    }
    Ok(())
}

/// Settings load/validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    Parse(String),
    InvalidSize { field: &'static str, value: f64 },
    InvalidColor(String),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid layout settings json: {message}"),
            Self::InvalidSize { field, value } => {
                write!(f, "layout setting {field} must be finite and >= 0, got {value}")
            }
            Self::InvalidColor(value) => write!(f, "layout color is not #RRGGBB[AA]: {value}"),
        }
    }
}

impl Error for SettingsError {}

#[cfg(test)]
mod tests {
    use super::{is_valid_hex_color, LayoutSettings, SettingsError};
    use chrono::Weekday;

    #[test]
    fn defaults_are_valid() {
        let settings = LayoutSettings::default();
        settings.validate().expect("defaults must validate");
        assert_eq!(settings.week_starts_on, Weekday::Sun);
    }

    #[test]
    fn from_json_fills_missing_keys_with_defaults() {
        let settings =
            LayoutSettings::from_json_str(r#"{ "week_starts_on": "Mon", "column_gutter": 0 }"#)
                .expect("partial settings should load");
        assert_eq!(settings.week_starts_on, Weekday::Mon);
        assert_eq!(settings.column_gutter, 0.0);
        assert_eq!(
            settings.minimum_visible_size,
            LayoutSettings::default().minimum_visible_size
        );
    }

    #[test]
    fn from_json_rejects_negative_size_and_bad_color() {
        let err = LayoutSettings::from_json_str(r#"{ "minimum_visible_size": -1 }"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidSize {
                field: "minimum_visible_size",
                ..
            }
        ));

        let err = LayoutSettings::from_json_str(r#"{ "default_color": "blue" }"#).unwrap_err();
        assert_eq!(err, SettingsError::InvalidColor("blue".to_string()));
    }

    #[test]
    fn from_json_reports_parse_errors() {
        let err = LayoutSettings::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn hex_color_accepts_rgb_and_rgba_only() {
        assert!(is_valid_hex_color("#a1B2c3"));
        assert!(is_valid_hex_color("#a1B2c3FF"));
        assert!(!is_valid_hex_color("#abc"));
        assert!(!is_valid_hex_color("a1b2c3"));
    }
}
