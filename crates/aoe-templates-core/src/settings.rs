//! User-facing settings consumed by placement sessions.

use crate::error::{PlacementError, PlacementResult};
use crate::expiration::DEFAULT_ROUND_TIME;
use serde::{Deserialize, Serialize};

/// Measurement units shown in range text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Units {
    #[default]
    Imperial,
    Metric,
}

impl Units {
    /// Localization key for the short unit label.
    pub fn short_label_key(self) -> &'static str {
        match self {
            Units::Imperial => "distance.ftShort",
            Units::Metric => "distance.mShort",
        }
    }
}

/// Settings read (never written) by placement sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlacementSettings {
    /// Pathfinder-style measuring: cones rotate by 90/45 degrees instead of 15/5.
    pub measure_style: bool,
    /// Units for range text.
    pub units: Units,
    /// Degrees per wheel notch for advanced rotation. Zero disables rotation.
    pub cone_rotation: f64,
    /// Target tokens inside the template automatically.
    pub auto_target: bool,
    /// Seconds per combat round.
    pub round_time: f64,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            measure_style: true,
            units: Units::Imperial,
            cone_rotation: 15.0,
            auto_target: true,
            round_time: DEFAULT_ROUND_TIME,
        }
    }
}

impl PlacementSettings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> PlacementResult<Self> {
        serde_json::from_str(json).map_err(|e| PlacementError::Settings(e.to_string()))
    }

    /// Serialize settings to pretty JSON.
    pub fn to_json(&self) -> PlacementResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| PlacementError::Settings(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = PlacementSettings::from_json(r#"{"coneRotation": 0, "units": "metric"}"#).unwrap();
        assert_eq!(settings.cone_rotation, 0.0);
        assert_eq!(settings.units, Units::Metric);
        assert!(settings.auto_target);
        assert_eq!(settings.round_time, 6.0);
    }

    #[test]
    fn test_invalid_json() {
        let result = PlacementSettings::from_json("{ not json");
        assert!(matches!(result, Err(PlacementError::Settings(_))));
    }

    #[test]
    fn test_json_roundtrip() {
        let settings = PlacementSettings {
            auto_target: false,
            ..Default::default()
        };
        let json = settings.to_json().unwrap();
        assert_eq!(PlacementSettings::from_json(&json).unwrap(), settings);
    }
}
