//! ACQUIRE phase - getting the raw bytes
//!
//! A single blocking HTTP(S) transfer per job, streamed to a temporary file.
//! No retry, resume or integrity checking.

pub mod download;

pub use download::{Fetcher, TEMP_PREFIX};
