use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use foldermenu_core::config::Config;
use foldermenu_core::icon::IconProvider;
use foldermenu_core::launcher::{LaunchError, Launcher};
use foldermenu_core::lister::{DirectoryLister, FsLister};
use foldermenu_core::menu::{Entry, NodeId, ROOT_NOT_FOUND_LABEL};
use foldermenu_core::notify::Notifier;
use foldermenu_core::session::{Action, EXIT_DELAY, MenuEvent, Session, announce_startup};

#[derive(Default)]
struct Opened(RefCell<Vec<PathBuf>>);

impl Launcher for Opened {
    fn open(&self, path: &Path) -> Result<(), LaunchError> {
        self.0.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

#[derive(Default)]
struct Messages(RefCell<Vec<String>>);

impl Notifier for Messages {
    fn info(&self, _title: &str, message: &str) {
        self.0.borrow_mut().push(message.to_string());
    }

    fn error(&self, _title: &str, message: &str) {
        self.0.borrow_mut().push(message.to_string());
    }
}

/// Icons keyed by extension; anything without one has no icon.
struct ExtensionIcons;

impl IconProvider for ExtensionIcons {
    type Icon = String;

    fn small_icon(&self, path: &Path) -> Option<String> {
        path.extension().map(|e| e.to_string_lossy().to_string())
    }
}

fn labels<L, P, X, N>(session: &Session<L, P, X, N>, parent: Option<NodeId>) -> Vec<String>
where
    L: DirectoryLister,
    P: IconProvider,
    X: Launcher,
    N: Notifier,
{
    let tree = session.tree();
    tree.entries(parent)
        .into_iter()
        .map(|entry| match entry {
            Entry::Node(id) => tree.node(id).unwrap().name().to_string(),
            Entry::Inert(label) => label.to_string(),
        })
        .collect()
}

#[test]
fn browse_expand_and_launch() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir_all(root.join("A")).unwrap();
    fs::write(root.join("b.txt"), "").unwrap();
    fs::write(root.join("A").join("c.txt"), "").unwrap();

    let mut session = Session::start(
        &root,
        FsLister::default(),
        ExtensionIcons,
        Opened::default(),
        Messages::default(),
    );
    assert_eq!(labels(&session, None), vec!["A", "b.txt"]);

    let a = session.tree().find(&root.join("A")).unwrap();
    assert_eq!(labels(&session, Some(a)), vec!["Loading..."]);
    assert_eq!(session.handle(MenuEvent::Expand(a)), Action::Refresh(a));
    assert_eq!(labels(&session, Some(a)), vec!["c.txt"]);

    let c = session.tree().find(&root.join("A").join("c.txt")).unwrap();
    assert_eq!(session.tree().node(c).unwrap().icon(), Some(&"txt".to_string()));

    let b = session.tree().find(&root.join("b.txt")).unwrap();
    assert_eq!(session.handle(MenuEvent::Select(b)), Action::ExitAfter(EXIT_DELAY));
    assert_eq!(*session.launcher().0.borrow(), vec![root.join("b.txt")]);
    assert!(session.notifier().0.borrow().is_empty());
}

#[test]
fn missing_root_still_shows_a_menu() {
    let dir = tempfile::tempdir().unwrap();
    let session = Session::start(
        &dir.path().join("missing"),
        FsLister::default(),
        ExtensionIcons,
        Opened::default(),
        Messages::default(),
    );
    assert_eq!(labels(&session, None), vec![ROOT_NOT_FOUND_LABEL]);
}

#[test]
fn folder_removed_after_build_becomes_inert() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("temp")).unwrap();
    fs::create_dir(dir.path().join("keep")).unwrap();
    fs::write(dir.path().join("keep").join("x.log"), "").unwrap();

    let mut session = Session::start(
        dir.path(),
        FsLister::default(),
        ExtensionIcons,
        Opened::default(),
        Messages::default(),
    );
    let temp = session.tree().find(&dir.path().join("temp")).unwrap();
    let keep = session.tree().find(&dir.path().join("keep")).unwrap();
    fs::remove_dir(dir.path().join("temp")).unwrap();

    session.handle(MenuEvent::Expand(temp));
    let inert = labels(&session, Some(temp));
    assert_eq!(inert.len(), 1);
    assert!(inert[0].starts_with("Error: "));

    session.handle(MenuEvent::Expand(keep));
    assert_eq!(labels(&session, Some(keep)), vec!["x.log"]);
}

#[test]
fn first_run_writes_settings_rooted_at_home() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    let home = dir.path().join("home");
    fs::create_dir(&home).unwrap();
    fs::write(home.join("notes.md"), "").unwrap();

    let startup = Config::bootstrap(&config_path, Some(&home)).unwrap();
    let messages = Messages::default();
    announce_startup(&startup, &config_path, &messages);
    assert_eq!(messages.0.borrow().len(), 1);
    assert!(messages.0.borrow()[0].contains(&home.display().to_string()));

    let session = Session::start(
        &startup.root_path,
        FsLister::new(startup.show_hidden),
        ExtensionIcons,
        Opened::default(),
        Messages::default(),
    );
    assert_eq!(labels(&session, None), vec!["notes.md"]);
}
