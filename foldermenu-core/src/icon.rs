use std::path::Path;

/// Supplies the small file-type icon shown next to a file entry.
///
/// Lookups are cosmetic: a provider answers `None` instead of failing.
pub trait IconProvider {
    type Icon;

    fn small_icon(&self, path: &Path) -> Option<Self::Icon>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoIcons;

impl IconProvider for NoIcons {
    type Icon = ();

    fn small_icon(&self, _path: &Path) -> Option<()> {
        None
    }
}
