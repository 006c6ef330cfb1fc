//! Cascading folder menu with lazily populated submenus.
//!
//! The top level is listed once when the tree is built. Every folder below it
//! starts out [`FolderState::Unpopulated`] and is enumerated the first time its
//! submenu is about to open, so a deep or broken tree never slows the popup.

use std::path::{Path, PathBuf};

use crate::icon::IconProvider;
use crate::launcher::{LaunchError, Launcher};
use crate::lister::{DirectoryLister, ListError};

pub const LOADING_LABEL: &str = "Loading...";
pub const ROOT_NOT_FOUND_LABEL: &str = "Error: Root folder not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderState {
    Unpopulated,
    Populated(Vec<NodeId>),
    Error(String),
}

#[derive(Debug)]
enum NodeKind<I> {
    Folder(FolderState),
    File { icon: Option<I> },
}

#[derive(Debug)]
pub struct MenuNode<I> {
    name: String,
    path: PathBuf,
    kind: NodeKind<I>,
}

impl<I> MenuNode<I> {
    fn folder(path: PathBuf) -> Self {
        Self {
            name: display_name(&path),
            path,
            kind: NodeKind::Folder(FolderState::Unpopulated),
        }
    }

    fn file<P>(path: PathBuf, icons: &P) -> Self
    where
        P: IconProvider<Icon = I>,
    {
        let icon = icons.small_icon(&path);
        if icon.is_none() {
            log::debug!("No icon for {}", path.display());
        }
        Self {
            name: display_name(&path),
            path,
            kind: NodeKind::File { icon },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder(_))
    }

    pub fn icon(&self) -> Option<&I> {
        match &self.kind {
            NodeKind::File { icon } => icon.as_ref(),
            NodeKind::Folder(_) => None,
        }
    }

    pub fn folder_state(&self) -> Option<&FolderState> {
        match &self.kind {
            NodeKind::Folder(state) => Some(state),
            NodeKind::File { .. } => None,
        }
    }
}

/// One row of a rendered menu level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry<'a> {
    Node(NodeId),
    /// Disabled text: the loading placeholder or an error message.
    Inert(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TopLevel {
    Nodes(Vec<NodeId>),
    Error(String),
}

#[derive(Debug)]
pub struct MenuTree<I> {
    nodes: Vec<MenuNode<I>>,
    top: TopLevel,
}

impl<I> MenuTree<I> {
    /// Lists `root` eagerly: its subfolders first, then its files.
    pub fn build<L, P>(root: &Path, lister: &L, icons: &P) -> Self
    where
        L: DirectoryLister,
        P: IconProvider<Icon = I>,
    {
        let mut tree = Self {
            nodes: Vec::new(),
            top: TopLevel::Nodes(Vec::new()),
        };

        tree.top = match tree.populate(root, lister, icons) {
            Ok(ids) => {
                log::debug!("Listed {} entries under {}", ids.len(), root.display());
                TopLevel::Nodes(ids)
            }
            Err(ListError::NotFound(_)) => {
                log::warn!("Root folder {} does not exist", root.display());
                TopLevel::Error(ROOT_NOT_FOUND_LABEL.to_string())
            }
            Err(err) => {
                log::warn!("Failed to list root folder {}: {err}", root.display());
                TopLevel::Error(format!("Error: {err}"))
            }
        };
        tree
    }

    /// Populates an unpopulated folder. Returns `false` when there was nothing to do.
    pub fn expand<L, P>(&mut self, id: NodeId, lister: &L, icons: &P) -> bool
    where
        L: DirectoryLister,
        P: IconProvider<Icon = I>,
    {
        let Some(node) = self.nodes.get(id.0) else {
            return false;
        };
        if !matches!(node.kind, NodeKind::Folder(FolderState::Unpopulated)) {
            return false;
        }
        let path = node.path.clone();

        let state = match self.populate(&path, lister, icons) {
            Ok(children) => {
                log::debug!("Expanded {} ({} entries)", path.display(), children.len());
                FolderState::Populated(children)
            }
            Err(err) => {
                log::warn!("Failed to expand {}: {err}", path.display());
                FolderState::Error(format!("Error: {err}"))
            }
        };

        if let NodeKind::Folder(current) = &mut self.nodes[id.0].kind {
            *current = state;
        }
        true
    }

    /// Opens the node's path. `None` when `id` does not name a node of this tree.
    pub fn select<X>(&self, id: NodeId, launcher: &X) -> Option<Result<(), LaunchError>>
    where
        X: Launcher,
    {
        let node = self.nodes.get(id.0)?;
        log::info!("Opening {}", node.path.display());
        Some(launcher.open(&node.path))
    }

    pub fn node(&self, id: NodeId) -> Option<&MenuNode<I>> {
        self.nodes.get(id.0)
    }

    /// Looks up a node by its index, as round-tripped through a native menu item id.
    pub fn node_id(&self, index: usize) -> Option<NodeId> {
        (index < self.nodes.len()).then_some(NodeId(index))
    }

    pub fn find(&self, path: &Path) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.path == path).map(NodeId)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Rows of the top-level menu, or of the submenu of `parent`.
    pub fn entries(&self, parent: Option<NodeId>) -> Vec<Entry<'_>> {
        let Some(parent) = parent else {
            return match &self.top {
                TopLevel::Nodes(ids) => ids.iter().copied().map(Entry::Node).collect(),
                TopLevel::Error(message) => vec![Entry::Inert(message)],
            };
        };

        match self.node(parent).and_then(MenuNode::folder_state) {
            Some(FolderState::Unpopulated) => vec![Entry::Inert(LOADING_LABEL)],
            Some(FolderState::Populated(ids)) => ids.iter().copied().map(Entry::Node).collect(),
            Some(FolderState::Error(message)) => vec![Entry::Inert(message)],
            None => Vec::new(),
        }
    }

    // Both listings must succeed before any node is created, so a folder is
    // never left half populated.
    fn populate<L, P>(
        &mut self,
        dir: &Path,
        lister: &L,
        icons: &P,
    ) -> Result<Vec<NodeId>, ListError>
    where
        L: DirectoryLister,
        P: IconProvider<Icon = I>,
    {
        let dirs = lister.list_dirs(dir)?;
        let files = lister.list_files(dir)?;

        let mut ids = Vec::with_capacity(dirs.len() + files.len());
        for path in dirs {
            ids.push(self.push(MenuNode::folder(path)));
        }
        for path in files {
            ids.push(self.push(MenuNode::file(path, icons)));
        }
        Ok(ids)
    }

    fn push(&mut self, node: MenuNode<I>) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
