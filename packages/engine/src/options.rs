use crate::error::OutlinerError;
use serde::{Deserialize, Serialize};

/// Configuration options for normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlinerOptions {
    /// Rebuild root ordering for scenes written before folders could nest.
    /// When false, legacy group references are still read as parents but
    /// root ordering is left to the positional fallback.
    #[serde(default = "default_legacy_migration")]
    pub legacy_migration: bool,

    /// Prefix for ids synthesized for records that arrive without one
    #[serde(default = "default_generated_id_prefix")]
    pub generated_id_prefix: String,
}

fn default_legacy_migration() -> bool {
    true
}

fn default_generated_id_prefix() -> String {
    "repaired".to_string()
}

impl Default for OutlinerOptions {
    fn default() -> Self {
        Self {
            legacy_migration: default_legacy_migration(),
            generated_id_prefix: default_generated_id_prefix(),
        }
    }
}

impl OutlinerOptions {
    /// Options that never run the legacy migration
    pub fn strict() -> Self {
        Self {
            legacy_migration: false,
            ..Default::default()
        }
    }

    pub fn with_generated_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.generated_id_prefix = prefix.into();
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, OutlinerError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        let json = r#"{
            "legacyMigration": false,
            "generatedIdPrefix": "fixed"
        }"#;

        let options = OutlinerOptions::from_json_str(json).unwrap();
        assert!(!options.legacy_migration);
        assert_eq!(options.generated_id_prefix, "fixed");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let options = OutlinerOptions::from_json_str("{}").unwrap();
        assert_eq!(options, OutlinerOptions::default());
        assert!(options.legacy_migration);
        assert_eq!(options.generated_id_prefix, "repaired");
    }

    #[test]
    fn test_strict() {
        let options = OutlinerOptions::strict().with_generated_id_prefix("x");
        assert!(!options.legacy_migration);
        assert_eq!(options.generated_id_prefix, "x");
    }
}
