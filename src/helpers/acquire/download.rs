//! Fetcher: one blocking HTTP transfer into a local temporary file
//!
//! The destination file is created before the request is sent and the
//! response body is streamed to it in fixed-size chunks, so a payload is
//! never held in memory. The returned [`NamedTempFile`] deletes itself when
//! dropped, which is how partial downloads are discarded on error.

use crate::core::output;
use crate::error::{Result, WordlistError};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

use super::super::internal::progress::{self, ProgressGuard, upgrade_to_bytes};

const USER_AGENT: &str = concat!("wordlistctl/", env!("CARGO_PKG_VERSION"));
const CHUNK_SIZE: usize = 64 * 1024;

/// Prefix shared by every temporary file the pipeline creates.
pub const TEMP_PREFIX: &str = ".wordlistctl-";

/// Blocking HTTP downloader.
#[derive(Clone)]
pub struct Fetcher {
    agent: ureq::Agent,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Fetcher {
    /// Create a fetcher. `None` imposes no timeout at all, so a stalled peer
    /// blocks the transfer indefinitely.
    pub fn new(timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            agent: builder.build(),
        }
    }

    /// Download `url` into a new temporary file inside `temp_dir`.
    ///
    /// Non-2xx responses are transfer errors; their bodies are never kept.
    /// No retry is attempted.
    pub fn fetch(&self, url: &str, temp_dir: &Path) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".download")
            .tempfile_in(temp_dir)
            .map_err(|e| {
                WordlistError::io(
                    format!("cannot create download file in {}", temp_dir.display()),
                    e,
                )
            })?;

        let total_bytes = self.download_with_progress(url, file.as_file_mut())?;
        output::detail(&format!("downloaded {} ({} bytes)", url, total_bytes));

        Ok(file)
    }

    fn download_with_progress(&self, url: &str, file: &mut std::fs::File) -> Result<u64> {
        let pb = progress::create_spinner(&format!("downloading {}", url));
        let _guard = ProgressGuard::new(&pb);

        let response = self.agent.get(url).call().map_err(|e| match e {
            ureq::Error::Status(code, response) => WordlistError::transfer(
                url,
                format!("server returned {} {}", code, response.status_text()),
            ),
            ureq::Error::Transport(t) => WordlistError::transfer(url, t),
        })?;

        if !(200..300).contains(&response.status()) {
            return Err(WordlistError::transfer(
                url,
                format!(
                    "server returned {} {}",
                    response.status(),
                    response.status_text()
                ),
            ));
        }

        if let Some(len) = response
            .header("content-length")
            .and_then(|s| s.parse().ok())
        {
            upgrade_to_bytes(&pb, len);
        }

        let mut reader = response.into_reader();
        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut total_bytes = 0u64;

        loop {
            let bytes_read = reader
                .read(&mut buffer)
                .map_err(|e| WordlistError::transfer(url, format!("read error: {}", e)))?;

            if bytes_read == 0 {
                break;
            }

            file.write_all(&buffer[..bytes_read])
                .map_err(|e| WordlistError::io("cannot write download file", e))?;

            total_bytes += bytes_read as u64;
            pb.set_position(total_bytes);
        }

        file.flush()
            .map_err(|e| WordlistError::io("cannot write download file", e))?;

        Ok(total_bytes)
    }
}
