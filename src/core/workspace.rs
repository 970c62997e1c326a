//! Workspace discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Represents a DPT workspace: the directory holding `.dpt/` with the
/// configuration file and the local record mirror
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Find the workspace root by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current = std::env::current_dir().map_err(|e| WorkspaceError::Io(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the workspace root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::Io(e.to_string()))?;

        loop {
            if current.join(".dpt").is_dir() {
                return Ok(Self { root: current });
            }
            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new workspace at the given path
    pub fn init(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let dpt_dir = root.join(".dpt");
        if dpt_dir.exists() {
            return Err(WorkspaceError::AlreadyExists(root.clone()));
        }

        std::fs::create_dir_all(&dpt_dir).map_err(|e| WorkspaceError::Io(e.to_string()))?;
        std::fs::write(dpt_dir.join("config.yaml"), Self::default_config())
            .map_err(|e| WorkspaceError::Io(e.to_string()))?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# DPT Workspace Configuration

# Base URL of the backend API (also settable via DPT_API_URL)
# api_url: "https://despensa.example.com/api"

# Bearer token for the backend (also settable via DPT_API_TOKEN)
# api_token: ""

# User recorded on queries (defaults to the OS user)
# user: ""

# Default output format (auto, tsv, json, csv, md)
# default_format: auto
"#
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.dpt` configuration directory
    pub fn dpt_dir(&self) -> PathBuf {
        self.root.join(".dpt")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dpt_dir().join("config.yaml")
    }

    /// The SQLite record mirror
    pub fn mirror_path(&self) -> PathBuf {
        self.dpt_dir().join("mirror.db")
    }
}

/// Errors that can occur during workspace operations
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("not a DPT workspace (searched from {searched_from:?}). Run 'dpt init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("DPT workspace already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let workspace = Workspace::init(tmp.path()).unwrap();

        assert!(workspace.dpt_dir().exists());
        assert!(workspace.config_path().exists());
    }

    #[test]
    fn test_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path()).unwrap();

        let err = Workspace::init(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::AlreadyExists(_)));
    }

    #[test]
    fn test_discover_finds_dpt_dir() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let workspace = Workspace::discover_from(&subdir).unwrap();
        assert_eq!(
            workspace.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_discover_fails_without_dpt_dir() {
        let tmp = tempdir().unwrap();
        let err = Workspace::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound { .. }));
    }
}
