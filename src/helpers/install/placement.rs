//! Placement & cleanup
//!
//! Creates destination directories, moves flat payloads into them and
//! deletes consumed intermediate layers. A failed deletion is a warning:
//! once the payload is in place the fetch has succeeded.

use crate::core::output;
use crate::error::{Result, WordlistError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::super::build::extract::ArchiveLayer;
use super::super::internal::fs_utils;
use crate::helpers::acquire::TEMP_PREFIX;

/// Mode for directories we create; the process umask still applies.
const OPEN_DIR_MODE: u32 = 0o777;

/// Mode for flat payloads; temporary files are created 0600.
const FLAT_FILE_MODE: u32 = 0o644;

/// Create `dir` and any missing parents.
pub fn ensure_destination(dir: &Path) -> Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(OPEN_DIR_MODE);
    }
    builder
        .create(dir)
        .map_err(|e| WordlistError::io(format!("cannot create directory {}", dir.display()), e))
}

/// Move a layer into `dest_dir` under its layer name.
///
/// Tries a rename first and falls back to copying when the temp directory
/// is on another filesystem; the copied-from layer is then deleted.
pub fn place_flat(layer: ArchiveLayer, dest_dir: &Path) -> Result<PathBuf> {
    let target = dest_dir.join(layer.name());
    let temp_path = layer.into_file().into_temp_path();

    match temp_path.persist(&target) {
        Ok(()) => {}
        Err(err) => {
            let temp_path = err.path;
            std::fs::copy(&temp_path, &target).map_err(|e| {
                WordlistError::io(
                    format!(
                        "cannot move {} to {}",
                        temp_path.display(),
                        target.display()
                    ),
                    e,
                )
            })?;
            if let Err(e) = temp_path.close() {
                output::warning(&format!("cannot remove intermediate file: {}", e));
            }
        }
    }

    fs_utils::set_mode(&target, FLAT_FILE_MODE)?;
    Ok(target)
}

/// Delete a consumed layer, downgrading failure to a warning.
pub fn discard(layer: ArchiveLayer) {
    let path = layer.path().to_path_buf();
    if let Err(e) = layer.into_file().close() {
        output::warning(&format!(
            "cannot remove intermediate file {}: {}",
            path.display(),
            e
        ));
    }
}

/// Verify that `base` can be written to without touching it.
///
/// Probes the nearest existing ancestor of `base` by creating (and
/// immediately deleting) a temporary file in it.
pub fn check_writable(base: &Path) -> Result<()> {
    let probe_dir = base
        .ancestors()
        .find(|p| p.exists())
        .unwrap_or_else(|| Path::new("."));

    if !probe_dir.is_dir() {
        return Err(WordlistError::PermissionDenied(base.to_path_buf()));
    }

    match tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".probe")
        .tempfile_in(probe_dir)
    {
        Ok(_probe) => Ok(()),
        Err(e) if matches!(e.kind(), ErrorKind::PermissionDenied | ErrorKind::ReadOnlyFilesystem) => {
            Err(WordlistError::PermissionDenied(base.to_path_buf()))
        }
        Err(e) => Err(WordlistError::io(
            format!("cannot write to {}", probe_dir.display()),
            e,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn layer_with(dir: &Path, content: &[u8], name: &str) -> ArchiveLayer {
        let mut file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(dir)
            .unwrap();
        file.write_all(content).unwrap();
        ArchiveLayer::new(file, name).unwrap()
    }

    #[test]
    fn test_ensure_destination_creates_parents() {
        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path().join("a/b/passwords");
        ensure_destination(&dest).unwrap();
        assert!(dest.is_dir());
        // Idempotent
        ensure_destination(&dest).unwrap();
    }

    #[test]
    fn test_place_flat_moves_and_renames() {
        let scratch = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let layer = layer_with(scratch.path(), b"root\nadmin\n", "users.txt");

        let placed = place_flat(layer, dest.path()).unwrap();

        assert_eq!(placed, dest.path().join("users.txt"));
        assert_eq!(std::fs::read(&placed).unwrap(), b"root\nadmin\n");
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_place_flat_sets_readable_mode() {
        use std::os::unix::fs::PermissionsExt;

        let scratch = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let placed = place_flat(layer_with(scratch.path(), b"x", "x.txt"), dest.path()).unwrap();

        let mode = std::fs::metadata(placed).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, FLAT_FILE_MODE);
    }

    #[test]
    fn test_discard_removes_file() {
        let scratch = tempfile::tempdir().unwrap();
        let layer = layer_with(scratch.path(), b"x", "x");
        let path = layer.path().to_path_buf();
        discard(layer);
        assert!(!path.exists());
    }

    #[test]
    fn test_check_writable_missing_base_uses_ancestor() {
        let temp = tempfile::tempdir().unwrap();
        check_writable(&temp.path().join("not/yet/created")).unwrap();
        // The probe leaves nothing behind.
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_check_writable_file_in_the_way() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("file");
        std::fs::write(&file, "x").unwrap();
        let err = check_writable(&file.join("sub")).unwrap_err();
        assert!(matches!(err, WordlistError::PermissionDenied(_)));
    }
}
