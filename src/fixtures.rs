#[cfg(test)]
pub mod test {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use crate::store::{ConfigStore, ResolvePath};
    use crate::types::{ConfigDir, Scope};
    use crate::paths::ScopePaths;

    pub const FILE_NAME: &str = "tstoy.config.json";

    /// Both scopes pointed at separate subdirectories of a fresh temp dir.
    ///
    /// The subdirectories are not created, so every scope starts absent.
    pub fn temp_paths() -> (TempDir, ScopePaths) {
        let dir = TempDir::new().unwrap();
        let paths = ScopePaths::new("TailSpinToys", "tstoy", FILE_NAME)
            .with_dir(Scope::Machine, ConfigDir::Path(dir.path().join("machine")))
            .with_dir(Scope::User, ConfigDir::Path(dir.path().join("user")));
        (dir, paths)
    }

    pub fn temp_store() -> (TempDir, ConfigStore<ScopePaths>) {
        let (dir, paths) = temp_paths();
        (dir, ConfigStore::new(paths))
    }

    /// Write raw `content` as the scope's file, creating its directory.
    pub fn write_raw(paths: &ScopePaths, scope: Scope, content: &str) -> PathBuf {
        let path = paths.resolve(scope).unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn temp_paths_start_absent_and_distinct() {
        let (_dir, paths) = temp_paths();
        let machine = paths.resolve(Scope::Machine).unwrap();
        let user = paths.resolve(Scope::User).unwrap();
        assert_ne!(machine, user);
        assert!(!machine.exists());
        assert!(!user.exists());
    }
}
