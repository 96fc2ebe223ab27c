//! Layered extraction
//!
//! A fetched file is peeled one layer at a time, driven by the content
//! sniffer: at most one gzip layer, then at most one tar layer. Each layer
//! lives in a [`NamedTempFile`], so an intermediate is deleted the moment it
//! is dropped, whichever path the pipeline leaves by.
//!
//! ```text
//! RAW --gzip--> DECOMPRESSED --tar--> UNPACKED
//!  |                 \--other--> placed as a flat file
//!  \--tar--> UNPACKED
//!  \--other--> placed as a flat file
//! ```

use crate::core::output;
use crate::error::{Result, WordlistError};
use filetime::FileTime;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::super::install::placement;
use super::super::internal::fs_utils;
use super::super::internal::progress::{self, ProgressGuard};
use super::super::internal::url_utils;
use super::sniff::{self, Format};
use crate::helpers::acquire::TEMP_PREFIX;

const COPY_BUF_SIZE: usize = 64 * 1024;

/// One on-disk encoding layer: a temporary file, the name its content should
/// carry if placed as-is, and its sniffed format.
#[derive(Debug)]
pub struct ArchiveLayer {
    file: NamedTempFile,
    name: String,
    format: Format,
}

impl ArchiveLayer {
    /// Wrap a temporary file and sniff its content.
    pub fn new(file: NamedTempFile, name: impl Into<String>) -> Result<Self> {
        let format = sniff::sniff_file(file.path())?;
        Ok(Self {
            file,
            name: name.into(),
            format,
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub(crate) fn into_file(self) -> NamedTempFile {
        self.file
    }
}

/// What a tar walk produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UnpackSummary {
    pub dirs: usize,
    pub files: usize,
    pub skipped: usize,
}

/// Decompress a gzip layer into a new layer in `temp_dir`.
///
/// Only the first gzip member is read. The new layer is named after the
/// file name stored in the gzip header, or else the current name with its
/// gzip suffix removed. The compressed layer is deleted on success.
pub fn gunzip(layer: ArchiveLayer, temp_dir: &Path) -> Result<ArchiveLayer> {
    let source = File::open(layer.path())
        .map_err(|e| WordlistError::io(format!("cannot open {}", layer.path().display()), e))?;
    let mut decoder = flate2::read::GzDecoder::new(BufReader::new(source));

    let mut out = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".layer")
        .tempfile_in(temp_dir)
        .map_err(|e| {
            WordlistError::io(
                format!("cannot create intermediate file in {}", temp_dir.display()),
                e,
            )
        })?;

    let pb = progress::create_spinner(&format!("decompressing {}", layer.name()));
    let _guard = ProgressGuard::new(&pb);

    let what = format!("gzip stream {}", layer.name());
    copy_stream(&mut decoder, out.as_file_mut(), &what, "intermediate file")?;

    let name = decoder
        .header()
        .and_then(|h| h.filename())
        .and_then(header_name)
        .unwrap_or_else(|| url_utils::strip_gzip_suffix(layer.name()));

    // Release the source handle before deleting it.
    drop(decoder);
    placement::discard(layer);

    ArchiveLayer::new(out, name)
}

/// Reduce a gzip header file name to a safe base name.
fn header_name(raw: &[u8]) -> Option<String> {
    let raw = String::from_utf8_lossy(raw);
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(&raw);
    Some(url_utils::sanitize_filename(base)).filter(|s| !s.is_empty())
}

struct DeferredDir {
    path: PathBuf,
    mode: u32,
    atime: FileTime,
    mtime: FileTime,
}

/// Walk a tar layer and materialize it under `dest`.
///
/// Directories and regular files are recreated with their recorded
/// permission bits and access/modification times; every other entry type is
/// skipped with a warning. Entries whose path is absolute or contains `..`
/// abort the walk. Directory attributes are applied after the walk so
/// writing children neither bumps their mtime nor trips a read-only mode.
/// A `./` entry for the archive root is ignored: `dest` keeps its own
/// attributes. The tar layer is deleted after a complete walk.
pub fn unpack_tar(layer: ArchiveLayer, dest: &Path) -> Result<UnpackSummary> {
    let file = File::open(layer.path())
        .map_err(|e| WordlistError::io(format!("cannot open {}", layer.path().display()), e))?;
    let mut archive = tar::Archive::new(BufReader::new(file));
    let what = format!("tar stream {}", layer.name());

    let pb = progress::create_spinner(&format!("unpacking {}", layer.name()));
    let _guard = ProgressGuard::new(&pb);

    let mut summary = UnpackSummary::default();
    let mut dirs = Vec::new();

    for entry in archive
        .entries()
        .map_err(|e| WordlistError::decode(&what, e))?
    {
        let mut entry = entry.map_err(|e| WordlistError::decode(&what, e))?;

        let path = entry
            .path()
            .map_err(|e| WordlistError::decode(&what, e))?
            .into_owned();

        // "." names `dest` itself, which may be shared by a whole group;
        // its recorded mode and times are not applied.
        if path.as_os_str().is_empty() || path == Path::new(".") {
            continue;
        }

        if !fs_utils::is_safe_path(&path) {
            return Err(WordlistError::decode(
                &what,
                format!("unsafe path: {}", path.display()),
            ));
        }

        let target = dest.join(&path);
        let header = entry.header();
        let mode = header.mode().map_err(|e| WordlistError::decode(&what, e))? & 0o7777;
        let mtime = header.mtime().map_err(|e| WordlistError::decode(&what, e))?;
        let atime = header
            .as_gnu()
            .and_then(|gnu| gnu.atime().ok())
            .filter(|&t| t != 0)
            .unwrap_or(mtime);
        let mtime = FileTime::from_unix_time(mtime as i64, 0);
        let atime = FileTime::from_unix_time(atime as i64, 0);
        let entry_type = header.entry_type();

        if entry_type.is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| {
                WordlistError::io(format!("cannot create directory {}", target.display()), e)
            })?;
            dirs.push(DeferredDir {
                path: target,
                mode,
                atime,
                mtime,
            });
            summary.dirs += 1;
        } else if entry_type.is_file() || entry_type == tar::EntryType::Continuous {
            fs_utils::ensure_parent_dir(&target)?;
            remove_existing_file(&target)?;
            {
                let mut out = File::create(&target).map_err(|e| {
                    WordlistError::io(format!("cannot create {}", target.display()), e)
                })?;
                copy_stream(&mut entry, &mut out, &what, &target.display().to_string())?;
            }
            pb.suspend(|| apply_attrs(&target, mode, atime, mtime));
            summary.files += 1;
        } else {
            pb.suspend(|| {
                output::warning(&format!(
                    "skipping unsupported {:?} entry: {}",
                    entry_type,
                    path.display()
                ))
            });
            summary.skipped += 1;
        }
    }

    // Children first, so a parent's mode never blocks a child's chmod.
    for dir in dirs.iter().rev() {
        pb.suspend(|| apply_attrs(&dir.path, dir.mode, dir.atime, dir.mtime));
    }

    drop(archive);
    placement::discard(layer);

    Ok(summary)
}

/// Permission bits and times; failures are reported, not fatal.
fn apply_attrs(path: &Path, mode: u32, atime: FileTime, mtime: FileTime) {
    if let Err(e) = fs_utils::set_mode(path, mode) {
        output::warning(&e.to_string());
    }
    if let Err(e) = filetime::set_file_times(path, atime, mtime) {
        output::warning(&format!("cannot set times on {}: {}", path.display(), e));
    }
}

/// A previous fetch may have left a read-only copy behind.
fn remove_existing_file(path: &Path) -> Result<()> {
    match std::fs::symlink_metadata(path) {
        Ok(md) if !md.is_dir() => std::fs::remove_file(path)
            .map_err(|e| WordlistError::io(format!("cannot replace {}", path.display()), e)),
        _ => Ok(()),
    }
}

/// Copy `reader` into `writer`, attributing read failures to the encoded
/// source (decode errors) and write failures to the local destination.
fn copy_stream<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    source: &str,
    dest: &str,
) -> Result<u64> {
    let mut buffer = vec![0u8; COPY_BUF_SIZE];
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(WordlistError::decode(source, e)),
        };
        writer
            .write_all(&buffer[..n])
            .map_err(|e| WordlistError::io(format!("cannot write {}", dest), e))?;
        total += n as u64;
    }

    writer
        .flush()
        .map_err(|e| WordlistError::io(format!("cannot write {}", dest), e))?;
    Ok(total)
}
