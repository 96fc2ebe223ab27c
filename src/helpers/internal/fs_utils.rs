//! Filesystem helpers shared by extraction and placement

use crate::error::{Result, WordlistError};
use std::path::{Component, Path};

/// Create the missing ancestors of `path` so a file can be written there.
///
/// Tar archives often list a file without listing its directories first.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            WordlistError::io(format!("cannot create directory {}", parent.display()), e)
        })?;
    }
    Ok(())
}

/// Apply permission bits to `path`. Does nothing off Unix.
#[cfg(unix)]
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .map_err(|e| WordlistError::io(format!("chmod {:o} failed for {}", mode, path.display()), e))
}

#[cfg(not(unix))]
pub fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// True when an archive member path stays inside the extraction root.
pub fn is_safe_path(path: &Path) -> bool {
    !path.is_absolute()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
