//! Core resolution pipeline: merge all config layers and produce a typed config.
//!
//! Operates on pre-loaded data (`ResolveInput`) with no I/O, making the full
//! pipeline testable with synthetic inputs. Steps:
//!
//! 1. Canonicalise and deep-merge the config documents (later overrides earlier)
//! 2. Deep-merge env vars on top
//! 3. Deep-merge CLI overrides on top (highest priority)
//! 4. Deserialize the merged tree into `AppConfig`'s layer type
//! 5. Let confique fill defaults
//! 6. Check the merged update frequency

use std::path::PathBuf;

use confique::Config;
use serde_json::Value;
use tracing::debug;

use crate::env;
use crate::error::TstoyError;
use crate::merge::deep_merge;
use crate::options::AppConfig;
use crate::overrides::{canonicalize_keys, overrides_to_map};
use crate::settings::Document;
use crate::types::Frequency;

type AppLayer = <AppConfig as Config>::Layer;

/// All pre-loaded data needed to resolve a config. No I/O happens here.
#[derive(Debug, Clone, Default)]
pub struct ResolveInput {
    /// Parsed documents in precedence order: first = lowest priority, last = highest.
    pub documents: Vec<(PathBuf, Document)>,
    /// Raw environment variable pairs (pass `std::env::vars().collect()` or synthetic data).
    pub env_vars: Vec<(String, String)>,
    /// Env var prefix (e.g. `"TSTOY"`). `None` means env disabled.
    pub env_prefix: Option<String>,
    /// CLI overrides as `(dotted_key, value)` pairs.
    pub cli_overrides: Vec<(String, Value)>,
}

/// Resolve the merged configuration view from pre-loaded inputs.
pub fn resolve(input: ResolveInput) -> Result<AppConfig, TstoyError> {
    let meta = &AppConfig::META;

    let mut merged = Document::new();
    for (path, document) in input.documents {
        debug!(path = %path.display(), "merging config layer");
        merged = deep_merge(merged, canonicalize_keys(document, meta));
    }

    if let Some(prefix) = &input.env_prefix {
        let env_map = env::env_to_map(prefix, input.env_vars);
        merged = deep_merge(merged, canonicalize_keys(env_map, meta));
    }

    if !input.cli_overrides.is_empty() {
        let cli_map = overrides_to_map(&input.cli_overrides);
        merged = deep_merge(merged, canonicalize_keys(cli_map, meta));
    }

    let layer: AppLayer =
        serde_json::from_value(Value::Object(merged)).map_err(|e| TstoyError::InvalidValue {
            key: "<merged>".into(),
            reason: e.to_string(),
        })?;

    let config = AppConfig::builder().preloaded(layer).load()?;

    let frequency = Frequency(config.updates.check_frequency);
    if !frequency.is_valid() {
        return Err(TstoyError::InvalidFrequency {
            value: frequency.days(),
        });
    }
    Ok(config)
}

/// The configuration made of defaults only.
pub fn defaults() -> Result<AppConfig, TstoyError> {
    Ok(AppConfig::builder().load()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("Expected object, got {other}"),
        }
    }

    fn file(name: &str, value: Value) -> (PathBuf, Document) {
        (name.into(), doc(value))
    }

    #[test]
    fn defaults_only() {
        let config = resolve(ResolveInput::default()).unwrap();
        assert!(!config.updates.automatic);
        assert_eq!(config.updates.check_frequency, 90);
        assert_eq!(defaults().unwrap(), config);
    }

    #[test]
    fn file_overrides_default() {
        let input = ResolveInput {
            documents: vec![file("machine.json", json!({"updates": {"checkFrequency": 30}}))],
            ..ResolveInput::default()
        };
        let config = resolve(input).unwrap();
        assert_eq!(config.updates.check_frequency, 30);
        assert!(!config.updates.automatic); // default preserved
    }

    #[test]
    fn user_overrides_machine() {
        let input = ResolveInput {
            documents: vec![
                file("machine.json", json!({"updates": {"automatic": true, "checkFrequency": 30}})),
                file("user.json", json!({"updates": {"checkFrequency": 7}})),
            ],
            ..ResolveInput::default()
        };
        let config = resolve(input).unwrap();
        assert!(config.updates.automatic); // from machine
        assert_eq!(config.updates.check_frequency, 7); // from user
    }

    #[test]
    fn env_overrides_files() {
        let input = ResolveInput {
            documents: vec![file("user.json", json!({"updates": {"checkFrequency": 7}}))],
            env_vars: vec![("TSTOY__UPDATES__CHECKFREQUENCY".into(), "14".into())],
            env_prefix: Some("TSTOY".into()),
            ..ResolveInput::default()
        };
        assert_eq!(resolve(input).unwrap().updates.check_frequency, 14);
    }

    #[test]
    fn env_ignored_without_prefix() {
        let input = ResolveInput {
            env_vars: vec![("TSTOY__UPDATES__AUTOMATIC".into(), "true".into())],
            ..ResolveInput::default()
        };
        assert!(!resolve(input).unwrap().updates.automatic);
    }

    #[test]
    fn cli_overrides_all() {
        let input = ResolveInput {
            documents: vec![file("user.json", json!({"updates": {"automatic": false}}))],
            env_vars: vec![("TSTOY__UPDATES__AUTOMATIC".into(), "false".into())],
            env_prefix: Some("TSTOY".into()),
            cli_overrides: vec![("updates.automatic".into(), json!(true))],
        };
        assert!(resolve(input).unwrap().updates.automatic);
    }

    #[test]
    fn unmanaged_keys_are_ignored() {
        let input = ResolveInput {
            documents: vec![file(
                "user.json",
                json!({"unmanagedKey": "keep-me", "updates": {"channel": "beta"}}),
            )],
            ..ResolveInput::default()
        };
        assert_eq!(resolve(input).unwrap().updates.check_frequency, 90);
    }

    #[test]
    fn wrong_type_is_invalid_value() {
        let input = ResolveInput {
            documents: vec![file("user.json", json!({"updates": {"automatic": "yes"}}))],
            ..ResolveInput::default()
        };
        match resolve(input) {
            Err(TstoyError::InvalidValue { key, .. }) => assert_eq!(key, "<merged>"),
            other => panic!("Expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_frequency_is_rejected() {
        let input = ResolveInput {
            cli_overrides: vec![("updates.checkFrequency".into(), json!(120))],
            ..ResolveInput::default()
        };
        assert!(matches!(
            resolve(input),
            Err(TstoyError::InvalidFrequency { value: 120 })
        ));
    }
}
