//! Config store: translate between a scope's JSON file and a [`Document`].
//!
//! Pure functions ([`parse_document`], [`render_document`]) do the format
//! work; thin I/O wrappers read, write and remove files. Writes create parent
//! directories as needed and replace the target in one rename.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::TstoyError;
use crate::settings::Document;
use crate::types::Scope;

/// Maps a scope to the path of its configuration file.
///
/// [`ScopePaths`](crate::paths::ScopePaths) is the platform implementation;
/// any `Fn(Scope) -> Result<PathBuf, TstoyError>` also works, which is how
/// tests and embedders point the store somewhere else.
pub trait ResolvePath {
    fn resolve(&self, scope: Scope) -> Result<PathBuf, TstoyError>;
}

impl<F> ResolvePath for F
where
    F: Fn(Scope) -> Result<PathBuf, TstoyError>,
{
    fn resolve(&self, scope: Scope) -> Result<PathBuf, TstoyError> {
        self(scope)
    }
}

/// Reads and writes the configuration document of each scope.
#[derive(Debug, Clone)]
pub struct ConfigStore<R> {
    resolver: R,
}

impl<R: ResolvePath> ConfigStore<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    pub fn resolve_path(&self, scope: Scope) -> Result<PathBuf, TstoyError> {
        self.resolver.resolve(scope)
    }

    /// Read the scope's document. `Ok(None)` means the file does not exist.
    pub fn read(&self, scope: Scope) -> Result<Option<Document>, TstoyError> {
        let path = self.resolve_path(scope)?;
        read_document(&path)
    }

    /// Replace the scope's file with `document`. Returns the path written.
    pub fn write(&self, scope: Scope, document: &Document) -> Result<PathBuf, TstoyError> {
        let path = self.resolve_path(scope)?;
        write_document(&path, document)?;
        Ok(path)
    }

    /// Remove the scope's file. Returns whether a file was removed.
    pub fn delete(&self, scope: Scope) -> Result<bool, TstoyError> {
        let path = self.resolve_path(scope)?;
        remove_document(&path)
    }
}

/// Pure function: parse file content into a document.
///
/// Anything other than a JSON object (including an empty file) is malformed.
pub fn parse_document(content: &str, path: &Path) -> Result<Document, TstoyError> {
    let malformed = |reason: String| TstoyError::MalformedDocument {
        path: path.to_path_buf(),
        reason,
    };
    match serde_json::from_str(content) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(malformed(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
        Err(e) => Err(malformed(e.to_string())),
    }
}

/// Pure function: render a document as two-space indented JSON with a
/// trailing newline.
pub fn render_document(document: &Document) -> Result<String, serde_json::Error> {
    let mut content = serde_json::to_string_pretty(document)?;
    content.push('\n');
    Ok(content)
}

/// I/O wrapper: read and parse a document. Missing files are `Ok(None)`.
pub fn read_document(path: &Path) -> Result<Option<Document>, TstoyError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file does not exist");
            return Ok(None);
        }
        Err(e) => {
            return Err(TstoyError::IoError {
                operation: "read",
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    debug!(path = %path.display(), "read config file");
    parse_document(&content, path).map(Some)
}

/// I/O wrapper: write a document, creating parent directories if needed.
///
/// Content goes to a sibling `.tmp` file first, which is then renamed over
/// the target. A symlinked path is followed, so the link survives and its
/// target receives the new content.
pub fn write_document(path: &Path, document: &Document) -> Result<(), TstoyError> {
    let content = render_document(document).map_err(|e| TstoyError::MalformedDocument {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| TstoyError::IoError {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let target = write_target(path)?;
    let tmp_path = tmp_sibling(&target);
    std::fs::write(&tmp_path, &content).map_err(|e| TstoyError::IoError {
        operation: "write",
        path: tmp_path.clone(),
        source: e,
    })?;
    std::fs::rename(&tmp_path, &target).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        TstoyError::IoError {
            operation: "replace",
            path: target.clone(),
            source: e,
        }
    })?;

    debug!(path = %target.display(), bytes = content.len(), "wrote config file");
    Ok(())
}

/// I/O wrapper: remove a document. Removing a missing file succeeds.
pub fn remove_document(path: &Path) -> Result<bool, TstoyError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(TstoyError::IoError {
            operation: "remove",
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// The file a write should replace: the resolved path when it exists.
fn write_target(path: &Path) -> Result<PathBuf, TstoyError> {
    match std::fs::canonicalize(path) {
        Ok(resolved) => Ok(resolved),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(e) => Err(TstoyError::IoError {
            operation: "resolve",
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
