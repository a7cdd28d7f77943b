//! Localization lookup with `{name}` interpolation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const ENGLISH: &[(&str, &str)] = &[
    ("circle", "Circle"),
    ("cone", "Cone"),
    ("ray", "Line"),
    ("rect", "Rectangle"),
    ("range", "Range: {range} {unit}"),
    ("errors.outOfRange", "Out of range"),
    ("hints.chooseStart", "Choose the starting point"),
    ("selectOrigin.square", "Select origin square"),
    ("distance.ftShort", "ft"),
    ("distance.mShort", "m"),
];

/// A key to string table. Missing keys localize to themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localizer {
    strings: HashMap<String, String>,
}

impl Default for Localizer {
    fn default() -> Self {
        Self::english()
    }
}

impl Localizer {
    /// Built-in English strings.
    pub fn english() -> Self {
        Self {
            strings: ENGLISH
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Replace or add strings.
    pub fn with_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.strings.extend(overrides);
        self
    }

    /// Look up a key.
    pub fn localize(&self, key: &str) -> String {
        self.strings.get(key).cloned().unwrap_or_else(|| key.to_string())
    }

    /// Look up a key and substitute `{name}` placeholders.
    pub fn format(&self, key: &str, args: &[(&str, String)]) -> String {
        args.iter().fold(self.localize(key), |text, (name, value)| {
            text.replace(&format!("{{{}}}", name), value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localize_and_fallback() {
        let i18n = Localizer::english();
        assert_eq!(i18n.localize("errors.outOfRange"), "Out of range");
        assert_eq!(i18n.localize("missing.key"), "missing.key");
    }

    #[test]
    fn test_format() {
        let i18n = Localizer::english();
        let text = i18n.format("range", &[("range", "20".to_string()), ("unit", "ft".to_string())]);
        assert_eq!(text, "Range: 20 ft");
    }

    #[test]
    fn test_overrides() {
        let mut overrides = HashMap::new();
        overrides.insert("errors.outOfRange".to_string(), "Hors de portée".to_string());
        let i18n = Localizer::english().with_overrides(overrides);
        assert_eq!(i18n.localize("errors.outOfRange"), "Hors de portée");
        assert_eq!(i18n.localize("cone"), "Cone");
    }
}
