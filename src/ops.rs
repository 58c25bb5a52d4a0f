//! Result types returned by [`Tstoy::handle`](crate::Tstoy) and how they print.
//!
//! Every result except [`ConfigResult::Path`] prints as one JSON object:
//! compact with `{}`, two-space indented with `{:#}`.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::TstoyError;
use crate::options::AppConfig;
use crate::reconcile::TestResult;
use crate::settings::{Document, Settings};
use crate::types::{Layer, Scope};

/// Result of one unit of work. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResult {
    /// The actual state of a scope, after `get` or `set`.
    State(Settings),
    /// The outcome of comparing desired with actual state.
    Test(TestResult),
    /// A scope's config file path.
    Path { scope: Scope, path: PathBuf },
    /// Selected layers of the merged configuration, keyed by layer name.
    Layers(Map<String, Value>),
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pretty = f.alternate();
        let json = match self {
            ConfigResult::Path { path, .. } => return write!(f, "{}", path.display()),
            ConfigResult::State(settings) => render(settings, pretty),
            ConfigResult::Test(result) => render(result, pretty),
            ConfigResult::Layers(layers) => render(layers, pretty),
        };
        f.write_str(&json.map_err(|_| fmt::Error)?)
    }
}

fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

/// Raw and merged configuration layers, collected for `show`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerView {
    pub default: AppConfig,
    pub machine: Option<Document>,
    pub user: Option<Document>,
    pub merged: AppConfig,
}

impl LayerView {
    /// The requested layers as one object. An empty selection means all.
    pub fn select(&self, only: &[Layer]) -> Result<ConfigResult, TstoyError> {
        let selected: &[Layer] = if only.is_empty() { &Layer::ALL } else { only };
        let mut layers = Map::new();
        for layer in selected {
            let value = match layer {
                Layer::Default => to_value(&self.default)?,
                Layer::Machine => raw_value(&self.machine),
                Layer::User => raw_value(&self.user),
                Layer::Final => to_value(&self.merged)?,
            };
            layers.insert(layer.as_str().to_string(), value);
        }
        Ok(ConfigResult::Layers(layers))
    }
}

fn to_value<T: Serialize>(config: &T) -> Result<Value, TstoyError> {
    serde_json::to_value(config).map_err(|e| TstoyError::InvalidValue {
        key: "<show>".into(),
        reason: e.to_string(),
    })
}

fn raw_value(document: &Option<Document>) -> Value {
    document.clone().map(Value::Object).unwrap_or(Value::Null)
}
