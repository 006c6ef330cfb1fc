use std::fmt;
use std::path::{Path, PathBuf};

/// Opens a path with whatever the OS registers as its default handler.
pub trait Launcher {
    fn open(&self, path: &Path) -> Result<(), LaunchError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchError {
    pub path: PathBuf,
    pub message: String,
}

impl LaunchError {
    pub fn new(path: &Path, message: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LaunchError {}
