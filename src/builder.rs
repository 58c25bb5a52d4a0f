use std::path::PathBuf;

use serde_json::Value;
use tracing::debug;

use crate::error::TstoyError;
use crate::ops::{ConfigResult, LayerView};
use crate::options::AppConfig;
use crate::paths::{DEFAULT_APP_NAME, DEFAULT_VENDOR, ScopePaths};
use crate::reconcile::Reconciler;
use crate::resolve::{self, ResolveInput};
use crate::settings::Document;
use crate::store;
use crate::types::{ConfigAction, ConfigDir, Scope};

/// Entry point for building a tstoy configuration manager.
pub struct Tstoy;

impl Tstoy {
    pub fn builder() -> TstoyBuilder {
        TstoyBuilder::new()
    }
}

/// Builder for locating, reconciling and reading TSToy's configuration.
///
/// The defaults match the real application: vendor `TailSpinToys`, app
/// `tstoy`, file `tstoy.config.json` in the platform directory of each scope,
/// and environment variables prefixed with `TSTOY__`.
#[derive(Debug, Clone)]
pub struct TstoyBuilder {
    vendor: String,
    app_name: String,
    file_name: Option<String>,
    machine_dir: ConfigDir,
    user_dir: ConfigDir,
    config_file: Option<PathBuf>,
    env_prefix: Option<String>,
    env_enabled: bool,
    cli_overrides: Vec<(String, Value)>,
}

impl Default for TstoyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TstoyBuilder {
    fn new() -> Self {
        Self {
            vendor: DEFAULT_VENDOR.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            file_name: None,
            machine_dir: ConfigDir::Platform,
            user_dir: ConfigDir::Platform,
            config_file: None,
            env_prefix: None,
            env_enabled: true,
            cli_overrides: Vec::new(),
        }
    }

    /// Set the vendor directory placed above the app directory.
    pub fn vendor(mut self, vendor: &str) -> Self {
        self.vendor = vendor.to_string();
        self
    }

    /// Set the application name. This derives sensible defaults:
    /// - `file_name` → `"{app_name}.config.json"`
    /// - `env_prefix` → `"{APP_NAME}"` (uppercased)
    pub fn app_name(mut self, name: &str) -> Self {
        self.app_name = name.to_string();
        self
    }

    /// Override the config file name (default: `"{app_name}.config.json"`).
    pub fn file_name(mut self, name: &str) -> Self {
        self.file_name = Some(name.to_string());
        self
    }

    /// Use `dir` for the machine scope instead of the platform directory.
    pub fn machine_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.machine_dir = ConfigDir::Path(dir.into());
        self
    }

    /// Use `dir` for the user scope instead of the platform directory.
    pub fn user_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_dir = ConfigDir::Path(dir.into());
        self
    }

    /// Merge an extra config file above the user scope when reading the
    /// merged view. The file must exist.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Prefix for environment variables (default: `app_name` uppercased).
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Ignore the environment when building the merged view.
    pub fn no_env(mut self) -> Self {
        self.env_enabled = false;
        self
    }

    /// Override a dotted key in the merged view. `None` is skipped, so optional
    /// flags can be passed straight through.
    pub fn cli_override<V: Into<Value>>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.cli_overrides.push((key.to_string(), v.into()));
        }
        self
    }

    fn effective_file_name(&self) -> String {
        match &self.file_name {
            Some(name) => name.clone(),
            None => format!("{}.config.json", self.app_name),
        }
    }

    fn effective_env_prefix(&self) -> Option<String> {
        if !self.env_enabled {
            return None;
        }
        Some(
            self.env_prefix
                .clone()
                .unwrap_or_else(|| self.app_name.to_uppercase()),
        )
    }

    /// Where each scope's file lives.
    pub fn scope_paths(&self) -> ScopePaths {
        ScopePaths::new(&self.vendor, &self.app_name, &self.effective_file_name())
            .with_dir(Scope::Machine, self.machine_dir.clone())
            .with_dir(Scope::User, self.user_dir.clone())
    }

    pub fn reconciler(&self) -> Reconciler<ScopePaths> {
        Reconciler::new(self.scope_paths())
    }

    fn read_extra_file(&self) -> Result<Option<(PathBuf, Document)>, TstoyError> {
        let Some(path) = &self.config_file else {
            return Ok(None);
        };
        match store::read_document(path)? {
            Some(document) => Ok(Some((path.clone(), document))),
            None => Err(TstoyError::NotFound { path: path.clone() }),
        }
    }

    /// Read every layer of the merged view.
    pub fn layers(&self) -> Result<LayerView, TstoyError> {
        let reconciler = self.reconciler();
        let store = reconciler.store();
        let machine = store.read(Scope::Machine)?;
        let user = store.read(Scope::User)?;

        let mut documents = Vec::new();
        for (scope, document) in [(Scope::Machine, &machine), (Scope::User, &user)] {
            if let Some(document) = document {
                documents.push((store.resolve_path(scope)?, document.clone()));
            }
        }
        documents.extend(self.read_extra_file()?);

        let env_prefix = self.effective_env_prefix();
        let env_vars = match env_prefix {
            Some(_) => std::env::vars().collect(),
            None => Vec::new(),
        };

        let merged = resolve::resolve(ResolveInput {
            documents,
            env_vars,
            env_prefix,
            cli_overrides: self.cli_overrides.clone(),
        })?;

        Ok(LayerView {
            default: resolve::defaults()?,
            machine,
            user,
            merged,
        })
    }

    /// Load and resolve the merged configuration through all layers.
    pub fn load(&self) -> Result<AppConfig, TstoyError> {
        Ok(self.layers()?.merged)
    }

    /// Handle a `ConfigAction` and print each result to stdout as it completes.
    pub fn handle_and_print(&self, action: &ConfigAction, pretty: bool) -> Result<(), TstoyError> {
        self.run(action, |result| {
            if pretty {
                println!("{result:#}");
            } else {
                println!("{result}");
            }
        })
    }

    /// Handle a `ConfigAction`, collecting the results in order.
    pub fn handle(&self, action: &ConfigAction) -> Result<Vec<ConfigResult>, TstoyError> {
        let mut results = Vec::new();
        self.run(action, |result| results.push(result))?;
        Ok(results)
    }

    /// Process an action item by item. The first failure stops the run;
    /// results already emitted stand.
    fn run(
        &self,
        action: &ConfigAction,
        mut emit: impl FnMut(ConfigResult),
    ) -> Result<(), TstoyError> {
        let reconciler = self.reconciler();
        match action {
            ConfigAction::Get { scopes } => {
                for scope in scopes {
                    emit(ConfigResult::State(reconciler.read_actual(*scope)?));
                }
            }
            ConfigAction::Set { desired } => {
                for settings in desired {
                    emit(ConfigResult::State(reconciler.enforce(settings)?));
                }
            }
            ConfigAction::Test { desired } => {
                for settings in desired {
                    emit(ConfigResult::Test(reconciler.test(settings)?));
                }
            }
            ConfigAction::ShowPath { scopes } => {
                let scopes = if scopes.is_empty() {
                    Scope::ALL.to_vec()
                } else {
                    scopes.clone()
                };
                for scope in scopes {
                    let path = reconciler.store().resolve_path(scope)?;
                    emit(ConfigResult::Path { scope, path });
                }
            }
            ConfigAction::Show { only } => {
                let view = self.layers()?;
                debug!(layers = ?only, "showing merged configuration");
                emit(view.select(only)?);
            }
        }
        Ok(())
    }
}
