use std::fmt;
use std::fs::DirEntry;
use std::io;
use std::path::{Path, PathBuf};

/// Enumerates the immediate children of a folder in the order the OS returns them.
pub trait DirectoryLister {
    fn list_dirs(&self, path: &Path) -> Result<Vec<PathBuf>, ListError>;
    fn list_files(&self, path: &Path) -> Result<Vec<PathBuf>, ListError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListError {
    NotFound(PathBuf),
    AccessDenied(PathBuf),
    Io { path: PathBuf, message: String },
}

impl ListError {
    pub fn from_io(path: &Path, err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ListError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => ListError::AccessDenied(path.to_path_buf()),
            _ => ListError::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
        }
    }
}

impl fmt::Display for ListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListError::NotFound(path) => {
                write!(f, "Could not find a part of the path '{}'.", path.display())
            }
            ListError::AccessDenied(path) => {
                write!(f, "Access to the path '{}' is denied.", path.display())
            }
            ListError::Io { path, message } => write!(f, "{}: {message}", path.display()),
        }
    }
}

impl std::error::Error for ListError {}

/// Lists folders through `std::fs::read_dir`.
///
/// Symlinks and junctions are classified by their target but never followed
/// further; recursion only happens when the user opens a submenu.
#[derive(Debug, Clone, Copy)]
pub struct FsLister {
    show_hidden: bool,
}

impl Default for FsLister {
    fn default() -> Self {
        Self { show_hidden: true }
    }
}

impl FsLister {
    pub fn new(show_hidden: bool) -> Self {
        Self { show_hidden }
    }

    fn children(&self, dir: &Path, want_dirs: bool) -> Result<Vec<PathBuf>, ListError> {
        let read_dir = std::fs::read_dir(dir).map_err(|e| ListError::from_io(dir, &e))?;

        Ok(read_dir
            .flatten()
            .filter(|entry| self.show_hidden || is_visible_entry(entry))
            .map(|entry| entry.path())
            .filter(|path| path.is_dir() == want_dirs)
            .collect())
    }
}

impl DirectoryLister for FsLister {
    fn list_dirs(&self, path: &Path) -> Result<Vec<PathBuf>, ListError> {
        self.children(path, true)
    }

    fn list_files(&self, path: &Path) -> Result<Vec<PathBuf>, ListError> {
        self.children(path, false)
    }
}

#[cfg(windows)]
fn is_visible_entry(entry: &DirEntry) -> bool {
    use std::os::windows::fs::MetadataExt;
    use windows::Win32::Storage::FileSystem::{FILE_ATTRIBUTE_HIDDEN, FILE_ATTRIBUTE_SYSTEM};

    let Ok(meta) = entry.metadata() else {
        return true;
    };
    let attrs = meta.file_attributes();
    let hidden = (attrs & FILE_ATTRIBUTE_HIDDEN.0) != 0;
    let system = (attrs & FILE_ATTRIBUTE_SYSTEM.0) != 0;
    !hidden && !system
}

#[cfg(not(windows))]
fn is_visible_entry(entry: &DirEntry) -> bool {
    !entry.file_name().to_string_lossy().starts_with('.')
}
