//! In-memory collaborators shared by the unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::icon::IconProvider;
use crate::launcher::{LaunchError, Launcher};
use crate::lister::{DirectoryLister, ListError};
use crate::notify::Notifier;

fn to_paths(items: &[&str]) -> Vec<PathBuf> {
    items.iter().map(PathBuf::from).collect()
}

#[derive(Default)]
pub struct FakeLister {
    dirs: HashMap<PathBuf, Vec<PathBuf>>,
    files: HashMap<PathBuf, Vec<PathBuf>>,
    denied: HashSet<PathBuf>,
    denied_files: HashSet<PathBuf>,
    calls: RefCell<HashMap<PathBuf, usize>>,
}

impl FakeLister {
    pub fn dir(mut self, path: &str, dirs: &[&str], files: &[&str]) -> Self {
        self.dirs.insert(PathBuf::from(path), to_paths(dirs));
        self.files.insert(PathBuf::from(path), to_paths(files));
        self
    }

    pub fn deny(mut self, path: &str) -> Self {
        self.denied.insert(PathBuf::from(path));
        self
    }

    pub fn deny_files(mut self, path: &str) -> Self {
        self.denied_files.insert(PathBuf::from(path));
        self
    }

    pub fn calls_for(&self, path: &str) -> usize {
        self.calls
            .borrow()
            .get(Path::new(path))
            .copied()
            .unwrap_or(0)
    }

    fn lookup(
        &self,
        table: &HashMap<PathBuf, Vec<PathBuf>>,
        path: &Path,
        denied: bool,
    ) -> Result<Vec<PathBuf>, ListError> {
        *self.calls.borrow_mut().entry(path.to_path_buf()).or_insert(0) += 1;
        if denied || self.denied.contains(path) {
            return Err(ListError::AccessDenied(path.to_path_buf()));
        }
        table
            .get(path)
            .cloned()
            .ok_or_else(|| ListError::NotFound(path.to_path_buf()))
    }
}

impl DirectoryLister for FakeLister {
    fn list_dirs(&self, path: &Path) -> Result<Vec<PathBuf>, ListError> {
        self.lookup(&self.dirs, path, false)
    }

    fn list_files(&self, path: &Path) -> Result<Vec<PathBuf>, ListError> {
        self.lookup(&self.files, path, self.denied_files.contains(path))
    }
}

#[derive(Default)]
pub struct FakeIcons {
    failing: HashSet<PathBuf>,
    lookups: RefCell<usize>,
}

impl FakeIcons {
    pub fn failing(mut self, path: &str) -> Self {
        self.failing.insert(PathBuf::from(path));
        self
    }

    pub fn lookups(&self) -> usize {
        *self.lookups.borrow()
    }
}

impl IconProvider for FakeIcons {
    type Icon = String;

    fn small_icon(&self, path: &Path) -> Option<String> {
        *self.lookups.borrow_mut() += 1;
        if self.failing.contains(path) {
            return None;
        }
        Some(format!("icon:{}", path.display()))
    }
}

#[derive(Default)]
pub struct RecordingLauncher {
    failure: Option<String>,
    opened: RefCell<Vec<PathBuf>>,
}

impl RecordingLauncher {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            opened: RefCell::new(Vec::new()),
        }
    }

    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.borrow().clone()
    }
}

impl Launcher for RecordingLauncher {
    fn open(&self, path: &Path) -> Result<(), LaunchError> {
        self.opened.borrow_mut().push(path.to_path_buf());
        match &self.failure {
            Some(message) => Err(LaunchError::new(path, message.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info { title: String, message: String },
    Error { title: String, message: String },
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: RefCell<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, title: &str, message: &str) {
        self.notices.borrow_mut().push(Notice::Info {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn error(&self, title: &str, message: &str) {
        self.notices.borrow_mut().push(Notice::Error {
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}
