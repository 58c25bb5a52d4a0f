//! The application's typed configuration view.
//!
//! This is what the rest of TSToy reads: the config files of both scopes,
//! environment variables and explicit flags merged over these defaults.
//! Environment variables use the `TSTOY__` prefix with `__` between levels:
//!
//! ```text
//! TSTOY__UPDATES__AUTOMATIC=true
//! TSTOY__UPDATES__CHECKFREQUENCY=30
//! ```

use confique::Config;
use serde::{Deserialize, Serialize};

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Update behaviour.
    #[config(nested)]
    pub updates: UpdatesConfig,
}

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdatesConfig {
    /// Whether the application installs updates on its own.
    #[config(default = false)]
    pub automatic: bool,

    /// Days between update checks (1-90).
    #[config(default = 90)]
    pub check_frequency: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults() {
        let config = AppConfig::builder().load().unwrap();
        assert!(!config.updates.automatic);
        assert_eq!(config.updates.check_frequency, 90);
    }

    #[test]
    fn serializes_with_file_spelling() {
        let config = AppConfig::builder().load().unwrap();
        assert_eq!(
            serde_json::to_value(config).unwrap(),
            json!({"updates": {"automatic": false, "checkFrequency": 90}})
        );
    }

    #[test]
    fn meta_lists_leaf_fields() {
        let updates = AppConfig::META
            .fields
            .iter()
            .find(|f| f.name == "updates")
            .unwrap();
        match &updates.kind {
            confique::meta::FieldKind::Nested { meta, .. } => {
                let names: Vec<_> = meta.fields.iter().map(|f| f.name).collect();
                assert_eq!(names, vec!["automatic", "check_frequency"]);
            }
            _ => panic!("Expected updates to be a nested section"),
        }
    }
}
