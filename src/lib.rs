//! Declarative management of TSToy's layered JSON configuration.
//!
//! TSToy reads its settings from two files: one for the whole machine and
//! one for the current user. Each holds the same small document:
//!
//! ```json
//! { "updates": { "automatic": true, "checkFrequency": 30 } }
//! ```
//!
//! This crate reads those files, enforces a desired state on them, and
//! computes the merged view the application itself would see.
//!
//! ```ignore
//! let actual = Tstoy::builder()
//!     .reconciler()
//!     .enforce(&Settings::new(Scope::User).with_update_frequency(45))?;
//! ```
//!
//! # Reconciliation
//!
//! A [`Settings`] record describes one scope's file: its [`Scope`], whether
//! it should exist ([`Ensure`]), and optionally `updateAutomatically` and
//! `updateFrequency`. Unset fields mean "no opinion", never `false` or `0`.
//!
//! [`Reconciler::enforce`] compares the desired record with the file and
//! applies the smallest change:
//!
//! - **absent** deletes the file if it exists, and is a no-op otherwise;
//! - **present** on a missing file creates it with exactly the set keys;
//! - **present** on an existing file merges the set keys into the raw JSON,
//!   so keys this tool does not manage survive untouched.
//!
//! A file that exists but is not a JSON object, or whose managed keys have
//! the wrong type, is reported as [`TstoyError::MalformedDocument`] and never
//! overwritten. [`Reconciler::test`] runs the same comparison without
//! writing and reports which properties differ.
//!
//! # Where the files live
//!
//! [`ScopePaths`] maps each scope to `{dir}/tstoy.config.json`. By default
//! `dir` is the platform's per-user config directory (user scope) or its
//! system-wide one (machine scope), joined with `TailSpinToys/tstoy`.
//! Either can be replaced with an explicit directory, and anything that
//! implements [`ResolvePath`] (including a plain closure) can stand in for
//! the whole lookup.
//!
//! # Merged view
//!
//! ```text
//! Compiled defaults     automatic = false, checkFrequency = 90
//!        ↑ overridden by
//! Machine file
//!        ↑ overridden by
//! User file
//!        ↑ overridden by
//! Extra file            .config_file()
//!        ↑ overridden by
//! Environment vars      TSTOY__UPDATES__CHECKFREQUENCY=30
//!        ↑ overridden by
//! Overrides             .cli_override()
//! ```
//!
//! Every layer is sparse. Keys are matched to [`AppConfig`] fields ignoring
//! case and underscores, so env vars need no camelCase. Disable env loading
//! with [`.no_env()`](TstoyBuilder::no_env), e.g. in tests.
//!
//! # Core library, optional CLI
//!
//! Everything above works through [`TstoyBuilder`] and [`ConfigAction`]
//! without any CLI framework. The `cli` module, behind the `clap` Cargo
//! feature (on by default), provides the `tstoy` command line:
//! `get`, `set`, `test`, `show` and `show path`.
//!
//! # Error handling
//!
//! All fallible operations return [`TstoyError`]. Validation errors
//! ([`TstoyError::is_validation`]) are raised before any file is touched;
//! I/O errors carry the operation and path.

pub mod error;
pub mod types;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod env;
mod input;
pub(crate) mod merge;
mod ops;
mod options;
mod overrides;
mod paths;
mod reconcile;
mod resolve;
mod settings;
mod store;

#[cfg(test)]
mod fixtures;

pub use builder::{Tstoy, TstoyBuilder};
#[cfg(feature = "clap")]
pub use cli::{Cli, Command, GetArgs, SettingsArgs, ShowArgs, ShowTarget};
pub use error::{ParseValueError, TstoyError};
pub use input::{SettingsFlags, assemble, parse_settings, read_batch, scopes_of};
pub use ops::{ConfigResult, LayerView};
pub use options::{AppConfig, UpdatesConfig};
pub use paths::ScopePaths;
pub use reconcile::{Reconciler, TestResult};
pub use settings::{Document, Settings};
pub use store::{ConfigStore, ResolvePath};
pub use types::{ConfigAction, ConfigDir, Ensure, Frequency, Layer, Scope};
