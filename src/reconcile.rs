//! Declarative reconciliation of one scope's configuration file.
//!
//! [`Reconciler::enforce`] compares a desired [`Settings`] with what is on
//! disk and applies the smallest change that makes them agree:
//!
//! | desired | file      | action                                         |
//! |---------|-----------|------------------------------------------------|
//! | absent  | missing   | none                                           |
//! | absent  | exists    | delete                                         |
//! | present | missing   | create with exactly the keys set on `desired`  |
//! | present | exists    | merge the set keys into the raw document       |
//!
//! The update path merges into the raw document rather than rebuilding it
//! from [`Settings`], so keys this tool does not manage survive. A file that
//! exists but cannot be read as a settings document is never overwritten.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::TstoyError;
use crate::merge::deep_merge;
use crate::settings::{Document, Settings};
use crate::store::{ConfigStore, ResolvePath};
use crate::types::{Ensure, Scope};

/// Outcome of [`Reconciler::test`]: the actual state plus how it compares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestResult {
    #[serde(flatten)]
    pub actual: Settings,
    #[serde(rename = "_inDesiredState")]
    pub in_desired_state: bool,
    #[serde(rename = "differingProperties")]
    pub differing_properties: Vec<&'static str>,
}

/// Applies desired settings to the config files behind a [`ConfigStore`].
#[derive(Debug, Clone)]
pub struct Reconciler<R> {
    store: ConfigStore<R>,
}

impl<R: ResolvePath> Reconciler<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            store: ConfigStore::new(resolver),
        }
    }

    pub fn store(&self) -> &ConfigStore<R> {
        &self.store
    }

    /// The current state of `scope`. A missing file reads as absent.
    pub fn read_actual(&self, scope: Scope) -> Result<Settings, TstoyError> {
        match self.store.read(scope)? {
            None => Ok(Settings::absent(scope)),
            Some(document) => self.settings_view(scope, &document),
        }
    }

    /// Make the scope's file match `desired`, returning the resulting state.
    pub fn enforce(&self, desired: &Settings) -> Result<Settings, TstoyError> {
        let scope = desired.validate()?;
        let current = self.store.read(scope)?;

        match (desired.effective_ensure(), current) {
            (Ensure::Absent, None) => {
                debug!(%scope, "config file already absent");
                Ok(Settings::absent(scope))
            }
            (Ensure::Absent, Some(document)) => {
                self.settings_view(scope, &document)?;
                self.store.delete(scope)?;
                info!(%scope, "removed config file");
                Ok(Settings::absent(scope))
            }
            (Ensure::Present, None) => {
                let path = self.store.write(scope, &desired.to_document())?;
                info!(%scope, path = %path.display(), "created config file");
                Ok(Settings {
                    scope: Some(scope),
                    ensure: Some(Ensure::Present),
                    ..desired.clone()
                })
            }
            (Ensure::Present, Some(document)) => {
                // Refuse to touch a file whose managed keys are unreadable.
                self.settings_view(scope, &document)?;

                let merged = deep_merge(document.clone(), desired.to_document());
                if merged == document {
                    debug!(%scope, "config file already in desired state");
                } else {
                    let path = self.store.write(scope, &merged)?;
                    info!(%scope, path = %path.display(), "updated config file");
                }
                self.settings_view(scope, &merged)
            }
        }
    }

    /// Compare `desired` with the actual state without writing anything.
    pub fn test(&self, desired: &Settings) -> Result<TestResult, TstoyError> {
        let scope = desired.validate()?;
        let actual = self.read_actual(scope)?;
        let differing_properties = desired.differences(&actual);
        Ok(TestResult {
            in_desired_state: differing_properties.is_empty(),
            differing_properties,
            actual,
        })
    }

    fn settings_view(&self, scope: Scope, document: &Document) -> Result<Settings, TstoyError> {
        match Settings::from_document(scope, document) {
            Ok((settings, unmanaged)) => {
                if !unmanaged.is_empty() {
                    debug!(%scope, keys = ?unmanaged, "ignoring unmanaged keys");
                }
                Ok(settings)
            }
            Err(e) => Err(TstoyError::MalformedDocument {
                path: self.store.resolve_path(scope)?,
                reason: e.to_string(),
            }),
        }
    }
}
