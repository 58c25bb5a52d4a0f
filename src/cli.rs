//! Clap adapter for tstoy.
//!
//! This module is the optional command-line layer over the framework-agnostic
//! core. It is compiled only when the `clap` Cargo feature is enabled (on by
//! default).
//!
//! The only bridge to the core is [`Cli::into_action()`], which converts
//! parsed arguments (plus whatever was piped on stdin) into a
//! [`ConfigAction`]. From there, all logic flows through the clap-free
//! [`TstoyBuilder::handle()`](crate::TstoyBuilder::handle) API.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::builder::{Tstoy, TstoyBuilder};
use crate::error::TstoyError;
use crate::input::{self, SettingsFlags};
use crate::types::{ConfigAction, Ensure, Frequency, Layer, Scope};

/// Manage the TSToy application's machine and user configuration files.
#[derive(Debug, Parser)]
#[command(name = "tstoy", version)]
pub struct Cli {
    /// Print indented JSON.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this directory for the machine scope instead of the platform default.
    #[arg(long, global = true, value_name = "DIR")]
    pub machine_dir: Option<PathBuf>,

    /// Use this directory for the user scope instead of the platform default.
    #[arg(long, global = true, value_name = "DIR")]
    pub user_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the actual settings of one or more scopes.
    Get(GetArgs),
    /// Enforce desired settings on a scope's config file.
    Set(SettingsArgs),
    /// Compare desired settings with a scope's config file without changing it.
    Test(SettingsArgs),
    /// Print the merged configuration, or where the config files live.
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Report every scope.
    #[arg(long, conflicts_with_all = ["scope", "input"])]
    pub all: bool,

    /// A JSON object naming the scope, e.g. '{"scope":"user"}'.
    #[arg(long, visible_alias = "inputJSON", value_name = "JSON")]
    pub input: Option<String>,

    /// The scope to report.
    #[arg(long)]
    pub scope: Option<Scope>,
}

#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Desired settings as one JSON object. Overrides every other flag.
    #[arg(long, visible_alias = "inputJSON", value_name = "JSON")]
    pub input: Option<String>,

    /// The scope to act on.
    #[arg(long)]
    pub scope: Option<Scope>,

    /// Whether the config file should exist.
    #[arg(long)]
    pub ensure: Option<Ensure>,

    /// Whether the application installs updates on its own.
    #[arg(
        long = "updateAutomatically",
        visible_alias = "update-automatically",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub update_automatically: Option<bool>,

    /// Days between update checks (1-90).
    #[arg(
        long = "updateFrequency",
        visible_alias = "update-frequency",
        value_name = "DAYS",
        allow_negative_numbers = true
    )]
    pub update_frequency: Option<Frequency>,
}

impl SettingsArgs {
    fn flags(&self) -> SettingsFlags {
        SettingsFlags {
            scope: self.scope,
            ensure: self.ensure,
            update_automatically: self.update_automatically,
            update_frequency: self.update_frequency,
        }
    }
}

#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct ShowArgs {
    /// Comma-separated layers to print: default, machine, user, final.
    #[arg(long, value_delimiter = ',', value_name = "LAYERS")]
    pub only: Vec<Layer>,

    /// Merge this config file above the user scope.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override `updates.automatic` in the merged view.
    #[arg(
        long = "updateAutomatically",
        visible_alias = "update-automatically",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub update_automatically: Option<bool>,

    /// Override `updates.checkFrequency` in the merged view.
    #[arg(
        long = "updateFrequency",
        visible_alias = "update-frequency",
        value_name = "DAYS",
        allow_negative_numbers = true
    )]
    pub update_frequency: Option<i64>,

    #[command(subcommand)]
    pub target: Option<ShowTarget>,
}

#[derive(Debug, Subcommand)]
pub enum ShowTarget {
    /// Print the config file path of each scope (all scopes by default).
    Path { scopes: Vec<Scope> },
}

impl Cli {
    /// A builder configured from the global flags and `show`'s overrides.
    pub fn builder(&self) -> TstoyBuilder {
        let mut builder = Tstoy::builder();
        if let Some(dir) = &self.machine_dir {
            builder = builder.machine_dir(dir);
        }
        if let Some(dir) = &self.user_dir {
            builder = builder.user_dir(dir);
        }
        if let Command::Show(show) = &self.command {
            if let Some(path) = &show.config {
                builder = builder.config_file(path);
            }
            builder = builder
                .cli_override("updates.automatic", show.update_automatically)
                .cli_override("updates.checkFrequency", show.update_frequency);
        }
        builder
    }

    /// Whether the command takes desired settings from stdin when it is piped.
    pub fn reads_stdin(&self) -> bool {
        match &self.command {
            Command::Get(args) => !args.all && args.input.is_none(),
            Command::Set(args) | Command::Test(args) => args.input.is_none(),
            Command::Show(_) => false,
        }
    }

    /// Convert parsed args into a framework-agnostic `ConfigAction`.
    ///
    /// `stdin` holds JSON lines read from a pipe, if any.
    pub fn into_action(self, stdin: Option<&str>) -> Result<ConfigAction, TstoyError> {
        match self.command {
            Command::Get(args) if args.all => Ok(ConfigAction::Get {
                scopes: Scope::ALL.to_vec(),
            }),
            Command::Get(args) => {
                let flags = SettingsFlags {
                    scope: args.scope,
                    ..SettingsFlags::default()
                };
                let desired = input::assemble(args.input.as_deref(), stdin, flags)?;
                Ok(ConfigAction::Get {
                    scopes: input::scopes_of(&desired)?,
                })
            }
            Command::Set(args) => Ok(ConfigAction::Set {
                desired: input::assemble(args.input.as_deref(), stdin, args.flags())?,
            }),
            Command::Test(args) => Ok(ConfigAction::Test {
                desired: input::assemble(args.input.as_deref(), stdin, args.flags())?,
            }),
            Command::Show(args) => Ok(match args.target {
                Some(ShowTarget::Path { scopes }) => ConfigAction::ShowPath { scopes },
                None => ConfigAction::Show { only: args.only },
            }),
        }
    }
}
