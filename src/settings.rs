//! The desired/actual settings record and its conversions to and from the
//! on-disk document.
//!
//! The document (`{"updates": {"automatic": bool, "checkFrequency": int}}`)
//! and [`Settings`] are two different shapes. A document may
//! carry keys this tool does not manage, so updates always merge into the raw
//! document tree; only the create path builds a document from scratch.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::TstoyError;
use crate::types::{Ensure, Frequency, Scope};

/// A raw configuration document: the top-level JSON object of a config file.
pub type Document = Map<String, Value>;

pub const UPDATES_KEY: &str = "updates";
pub const AUTOMATIC_KEY: &str = "automatic";
pub const CHECK_FREQUENCY_KEY: &str = "checkFrequency";

/// The configurable state of one scope's configuration file.
///
/// Used both for the state a caller asks for and the state read back from
/// disk. Every field is optional so that "not specified" never collapses
/// into `false` or `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ensure: Option<Ensure>,

    /// Maps to `updates.automatic`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_automatically: Option<bool>,

    /// Maps to `updates.checkFrequency`. Zero or `null` means unset.
    #[serde(
        default,
        deserialize_with = "nullable_frequency",
        skip_serializing_if = "Frequency::is_unset"
    )]
    pub update_frequency: Frequency,
}

impl Settings {
    pub fn new(scope: Scope) -> Self {
        Settings {
            scope: Some(scope),
            ..Settings::default()
        }
    }

    /// The state of a scope whose file does not exist.
    pub fn absent(scope: Scope) -> Self {
        Settings {
            scope: Some(scope),
            ensure: Some(Ensure::Absent),
            ..Settings::default()
        }
    }

    pub fn with_ensure(mut self, ensure: Ensure) -> Self {
        self.ensure = Some(ensure);
        self
    }

    pub fn with_update_automatically(mut self, automatic: bool) -> Self {
        self.update_automatically = Some(automatic);
        self
    }

    pub fn with_update_frequency(mut self, days: i64) -> Self {
        self.update_frequency = Frequency(days);
        self
    }

    /// Ensure with the unset case resolved to [`Ensure::Present`].
    pub fn effective_ensure(&self) -> Ensure {
        self.ensure.unwrap_or_default()
    }

    /// Check the record can be enforced, returning its scope.
    ///
    /// Update fields are not checked when the file must be absent.
    pub fn validate(&self) -> Result<Scope, TstoyError> {
        let scope = self.scope.ok_or(TstoyError::UndefinedScope)?;
        if self.effective_ensure() == Ensure::Absent {
            return Ok(scope);
        }
        if !self.update_frequency.is_valid() {
            return Err(TstoyError::InvalidFrequency {
                value: self.update_frequency.days(),
            });
        }
        Ok(scope)
    }

    /// Build a fresh document holding only the explicitly set update keys.
    ///
    /// The `updates` object is omitted when neither key is set, so the result
    /// doubles as a sparse patch for [`deep_merge`](crate::merge::deep_merge).
    pub fn to_document(&self) -> Document {
        let mut updates = Map::new();
        if let Some(automatic) = self.update_automatically {
            updates.insert(AUTOMATIC_KEY.into(), Value::Bool(automatic));
        }
        if !self.update_frequency.is_unset() {
            updates.insert(
                CHECK_FREQUENCY_KEY.into(),
                Value::from(self.update_frequency.days()),
            );
        }

        let mut document = Document::new();
        if !updates.is_empty() {
            document.insert(UPDATES_KEY.into(), Value::Object(updates));
        }
        document
    }

    /// Derive the settings view of an existing document.
    ///
    /// Unmanaged keys, inside or outside `updates`, are skipped and returned
    /// as dotted paths so the caller can report them. A managed key of the
    /// wrong JSON type is an error.
    pub fn from_document(
        scope: Scope,
        document: &Document,
    ) -> Result<(Settings, Vec<String>), serde_json::Error> {
        let mut unmanaged = Vec::new();
        let managed: ManagedDocument =
            serde_ignored::deserialize(Value::Object(document.clone()), |path| {
                unmanaged.push(path.to_string());
            })?;

        let updates = managed.updates;
        let settings = Settings {
            scope: Some(scope),
            ensure: Some(Ensure::Present),
            update_automatically: updates.automatic,
            update_frequency: updates.check_frequency.map(Frequency).unwrap_or_default(),
        };
        Ok((settings, unmanaged))
    }

    /// Names of the properties where `actual` does not match this desired state.
    ///
    /// Fields left unset here are never reported.
    pub fn differences(&self, actual: &Settings) -> Vec<&'static str> {
        let mut differing = Vec::new();
        let desired_ensure = self.effective_ensure();
        if desired_ensure != actual.effective_ensure() {
            differing.push("ensure");
        }
        if desired_ensure == Ensure::Absent {
            return differing;
        }
        if let Some(automatic) = self.update_automatically
            && actual.update_automatically != Some(automatic)
        {
            differing.push("updateAutomatically");
        }
        if !self.update_frequency.is_unset() && self.update_frequency != actual.update_frequency {
            differing.push("updateFrequency");
        }
        differing
    }
}

/// The managed subset of a config document.
#[derive(Debug, Default, Deserialize)]
struct ManagedDocument {
    #[serde(default)]
    updates: ManagedUpdates,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManagedUpdates {
    automatic: Option<bool>,
    #[serde(default, deserialize_with = "whole_days")]
    check_frequency: Option<i64>,
}

fn nullable_frequency<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Frequency, D::Error> {
    Ok(Option::<i64>::deserialize(deserializer)?
        .map(Frequency)
        .unwrap_or_default())
}

/// Day counts on disk may be written as floats (`30.0`); only whole values pass.
fn whole_days<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let Some(number) = Option::<Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(days) = number.as_i64() {
        return Ok(Some(days));
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(Some(f as i64))
        }
        _ => Err(D::Error::custom(format!(
            "invalid checkFrequency {number}, expected a whole number of days"
        ))),
    }
}
