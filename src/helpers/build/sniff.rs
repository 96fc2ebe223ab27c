//! Content-based format detection
//!
//! Classifies a file by its leading bytes, never by its name:
//! - gzip: the `1f 8b` magic
//! - tar: `ustar` magic at offset 257 (POSIX and GNU), or a 512-byte
//!   pre-POSIX header whose checksum field matches
//! - anything else is opaque

use crate::error::{Result, WordlistError};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Size of one tar header block; also the most bytes the sniffer reads.
pub const SNIFF_LEN: usize = 512;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const USTAR_OFFSET: usize = 257;
const CHKSUM_RANGE: std::ops::Range<usize> = 148..156;

/// Encoding layer a file represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Gzip,
    Tar,
    Opaque,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Gzip => "gzip",
            Self::Tar => "tar",
            Self::Opaque => "opaque",
        })
    }
}

/// Classify content from its leading bytes.
pub fn classify(bytes: &[u8]) -> Format {
    if bytes.starts_with(&GZIP_MAGIC) {
        Format::Gzip
    } else if is_tar_header(bytes) {
        Format::Tar
    } else {
        Format::Opaque
    }
}

/// Read up to [`SNIFF_LEN`] bytes of `path` and classify them.
pub fn sniff_file(path: &Path) -> Result<Format> {
    let file = File::open(path)
        .map_err(|e| WordlistError::io(format!("cannot open {}", path.display()), e))?;

    let mut head = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64)
        .read_to_end(&mut head)
        .map_err(|e| WordlistError::io(format!("cannot read {}", path.display()), e))?;

    Ok(classify(&head))
}

fn is_tar_header(block: &[u8]) -> bool {
    if block.len() < SNIFF_LEN {
        return false;
    }
    // "ustar\0" (POSIX) or "ustar " (GNU)
    if &block[USTAR_OFFSET..USTAR_OFFSET + 5] == b"ustar" {
        return true;
    }
    has_valid_checksum(&block[..SNIFF_LEN])
}

/// Pre-POSIX tar has no magic; the only signature is the header checksum:
/// the unsigned byte sum of the block with the checksum field read as spaces.
fn has_valid_checksum(block: &[u8]) -> bool {
    // An all-zero block is an end-of-archive marker, not a header.
    if block.iter().all(|&b| b == 0) {
        return false;
    }

    let Some(recorded) = parse_octal(&block[CHKSUM_RANGE]) else {
        return false;
    };

    let actual: u64 = block
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            if CHKSUM_RANGE.contains(&i) {
                u64::from(b' ')
            } else {
                u64::from(b)
            }
        })
        .sum();

    recorded == actual
}

fn parse_octal(field: &[u8]) -> Option<u64> {
    let digits: Vec<u8> = field
        .iter()
        .copied()
        .skip_while(|&b| b == b' ')
        .take_while(|&b| (b'0'..=b'7').contains(&b))
        .collect();
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(std::str::from_utf8(&digits).ok()?, 8).ok()
}
