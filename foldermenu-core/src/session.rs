//! Lifetime of one popup: from the first listing to process exit.

use std::path::Path;
use std::time::Duration;

use crate::config::{ConfigError, Startup};
use crate::icon::IconProvider;
use crate::launcher::Launcher;
use crate::lister::DirectoryLister;
use crate::menu::{MenuTree, NodeId};
use crate::notify::Notifier;

/// Delay before the popup is shown, so the owner window is up and can take focus.
pub const SHOW_DELAY: Duration = Duration::from_millis(100);
/// Delay between a launch and exit, so the started program can take the foreground.
pub const EXIT_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Escape,
    FocusLost,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    /// A submenu is about to open.
    Expand(NodeId),
    /// An item was clicked.
    Select(NodeId),
    /// The menu closed without a click.
    Dismissed(CloseReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    /// The submenu of this folder changed and must be rendered again.
    Refresh(NodeId),
    ExitAfter(Duration),
    ExitNow,
}

pub struct Session<L, P, X, N>
where
    P: IconProvider,
{
    tree: MenuTree<P::Icon>,
    lister: L,
    icons: P,
    launcher: X,
    notifier: N,
}

impl<L, P, X, N> Session<L, P, X, N>
where
    L: DirectoryLister,
    P: IconProvider,
    X: Launcher,
    N: Notifier,
{
    pub fn start(root: &Path, lister: L, icons: P, launcher: X, notifier: N) -> Self {
        log::info!("Building menu for {}", root.display());
        let tree = MenuTree::build(root, &lister, &icons);
        Self {
            tree,
            lister,
            icons,
            launcher,
            notifier,
        }
    }

    pub fn tree(&self) -> &MenuTree<P::Icon> {
        &self.tree
    }

    pub fn launcher(&self) -> &X {
        &self.launcher
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn handle(&mut self, event: MenuEvent) -> Action {
        match event {
            MenuEvent::Expand(id) => {
                if self.tree.expand(id, &self.lister, &self.icons) {
                    Action::Refresh(id)
                } else {
                    Action::Continue
                }
            }
            MenuEvent::Select(id) => self.select(id),
            MenuEvent::Dismissed(reason) => {
                log::info!("Menu dismissed ({reason:?})");
                Action::ExitNow
            }
        }
    }

    fn select(&self, id: NodeId) -> Action {
        let Some(result) = self.tree.select(id, &self.launcher) else {
            log::warn!("Ignoring selection of unknown item {}", id.index());
            return Action::Continue;
        };

        // A failed launch is reported, but the popup still goes away.
        if let Err(err) = result {
            log::warn!("Failed to open {}: {err}", err.path.display());
            let is_folder = self.tree.node(id).is_some_and(|n| n.is_folder());
            let what = if is_folder { "folder" } else { "file" };
            self.notifier
                .error("Error", &format!("Failed to open {what}:\n{err}"));
        }
        Action::ExitAfter(EXIT_DELAY)
    }
}

/// Tells the user a default settings file was written. Does nothing otherwise.
pub fn announce_startup<N: Notifier>(startup: &Startup, config_path: &Path, notifier: &N) {
    if !startup.created_default {
        return;
    }
    let file_name = config_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| config_path.display().to_string());
    notifier.info(
        "Info",
        &format!(
            "{file_name} was missing and has been created with default path:\n{}",
            startup.root_path.display()
        ),
    );
}

pub fn report_config_error<N: Notifier>(err: &ConfigError, notifier: &N) {
    log::error!("{err}");
    notifier.error("Error", &err.to_string());
}
