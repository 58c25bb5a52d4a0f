//! Where each scope's configuration file lives.
//!
//! Every scope resolves to `{dir}/{file_name}`, where `dir` is either an
//! explicit directory or the platform default:
//!
//! - **User**: the per-user config directory (`$XDG_CONFIG_HOME` on Linux,
//!   `~/Library/Application Support` on macOS, `%APPDATA%` on Windows) joined
//!   with `{vendor}/{app}`.
//! - **Machine**: the system-wide config directory (first entry of
//!   `$XDG_CONFIG_DIRS`, default `/etc/xdg`, on Linux and the BSDs;
//!   `/Library/Application Support` on macOS; `%ProgramData%` on Windows)
//!   joined with `{vendor}/{app}`.
//!
//! Resolution is lazy: a missing home directory only matters when the user
//! scope is actually touched.

use std::ffi::OsString;
use std::path::PathBuf;

use tracing::debug;

use crate::error::TstoyError;
use crate::store::ResolvePath;
use crate::types::{ConfigDir, Scope};

pub const DEFAULT_VENDOR: &str = "TailSpinToys";
pub const DEFAULT_APP_NAME: &str = "tstoy";

/// Resolve a scope's [`ConfigDir`] to a concrete directory.
///
/// Returns `None` if the platform directory cannot be determined.
pub fn resolve_config_dir(
    dir: &ConfigDir,
    scope: Scope,
    vendor: &str,
    app_name: &str,
) -> Option<PathBuf> {
    match dir {
        ConfigDir::Path(p) => Some(p.clone()),
        ConfigDir::Platform => {
            let root = match scope {
                Scope::User => user_config_root()?,
                Scope::Machine => machine_config_root()?,
            };
            Some(root.join(vendor).join(app_name))
        }
    }
}

fn user_config_root() -> Option<PathBuf> {
    let base = directories::BaseDirs::new()?;
    Some(base.config_dir().to_path_buf())
}

#[cfg(all(unix, not(target_os = "macos")))]
fn machine_config_root() -> Option<PathBuf> {
    Some(xdg_system_root(std::env::var_os("XDG_CONFIG_DIRS")))
}

#[cfg(target_os = "macos")]
fn machine_config_root() -> Option<PathBuf> {
    Some(PathBuf::from("/Library/Application Support"))
}

#[cfg(windows)]
fn machine_config_root() -> Option<PathBuf> {
    std::env::var_os("ProgramData")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(not(any(unix, windows)))]
fn machine_config_root() -> Option<PathBuf> {
    None
}

/// First absolute entry of an `XDG_CONFIG_DIRS` value, or `/etc/xdg`.
#[cfg_attr(not(all(unix, not(target_os = "macos"))), allow(dead_code))]
fn xdg_system_root(config_dirs: Option<OsString>) -> PathBuf {
    config_dirs
        .as_ref()
        .and_then(|dirs| std::env::split_paths(dirs).find(|p| p.is_absolute()))
        .unwrap_or_else(|| PathBuf::from("/etc/xdg"))
}

/// The default [`ResolvePath`]: a directory per scope plus a shared file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopePaths {
    vendor: String,
    app_name: String,
    file_name: String,
    machine: ConfigDir,
    user: ConfigDir,
}

impl ScopePaths {
    /// Both scopes in their platform directories.
    pub fn new(vendor: &str, app_name: &str, file_name: &str) -> Self {
        Self {
            vendor: vendor.to_string(),
            app_name: app_name.to_string(),
            file_name: file_name.to_string(),
            machine: ConfigDir::Platform,
            user: ConfigDir::Platform,
        }
    }

    /// Replace the directory used for `scope`.
    pub fn with_dir(mut self, scope: Scope, dir: ConfigDir) -> Self {
        match scope {
            Scope::Machine => self.machine = dir,
            Scope::User => self.user = dir,
        }
        self
    }

    pub fn dir(&self, scope: Scope) -> &ConfigDir {
        match scope {
            Scope::Machine => &self.machine,
            Scope::User => &self.user,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl ResolvePath for ScopePaths {
    fn resolve(&self, scope: Scope) -> Result<PathBuf, TstoyError> {
        let dir = resolve_config_dir(self.dir(scope), scope, &self.vendor, &self.app_name)
            .ok_or(TstoyError::NoConfigDir(scope))?;
        let path = dir.join(&self.file_name);
        debug!(%scope, path = %path.display(), "resolved config path");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_is_used_verbatim() {
        let p = PathBuf::from("/tmp/tstoy-machine");
        let resolved = resolve_config_dir(&ConfigDir::Path(p.clone()), Scope::Machine, "V", "a");
        assert_eq!(resolved, Some(p));
    }

    #[test]
    fn platform_dirs_end_with_vendor_and_app() {
        for scope in Scope::ALL {
            if let Some(dir) =
                resolve_config_dir(&ConfigDir::Platform, scope, "TailSpinToys", "tstoy")
            {
                assert!(dir.ends_with("TailSpinToys/tstoy"), "{}", dir.display());
            }
        }
    }

    #[test]
    fn machine_and_user_platform_dirs_differ() {
        let machine = resolve_config_dir(&ConfigDir::Platform, Scope::Machine, "V", "a");
        let user = resolve_config_dir(&ConfigDir::Platform, Scope::User, "V", "a");
        if let (Some(machine), Some(user)) = (machine, user) {
            assert_ne!(machine, user);
        }
    }

    #[test]
    fn xdg_root_defaults_to_etc_xdg() {
        assert_eq!(xdg_system_root(None), PathBuf::from("/etc/xdg"));
        assert_eq!(xdg_system_root(Some("".into())), PathBuf::from("/etc/xdg"));
    }

    #[cfg(unix)]
    #[test]
    fn xdg_root_takes_first_absolute_entry() {
        let dirs = OsString::from("relative/dir:/opt/xdg:/etc/xdg");
        assert_eq!(xdg_system_root(Some(dirs)), PathBuf::from("/opt/xdg"));
    }

    #[test]
    fn scope_paths_join_file_name() {
        let paths = ScopePaths::new("TailSpinToys", "tstoy", "tstoy.config.json")
            .with_dir(Scope::Machine, ConfigDir::Path("/srv/machine".into()))
            .with_dir(Scope::User, ConfigDir::Path("/srv/user".into()));

        assert_eq!(
            paths.resolve(Scope::Machine).unwrap(),
            PathBuf::from("/srv/machine/tstoy.config.json")
        );
        assert_eq!(
            paths.resolve(Scope::User).unwrap(),
            PathBuf::from("/srv/user/tstoy.config.json")
        );
    }

    #[test]
    fn scope_paths_default_to_platform() {
        let paths = ScopePaths::new("TailSpinToys", "tstoy", "tstoy.config.json");
        assert_eq!(paths.dir(Scope::Machine), &ConfigDir::Platform);
        assert_eq!(paths.dir(Scope::User), &ConfigDir::Platform);
        assert_eq!(paths.file_name(), "tstoy.config.json");
    }
}
