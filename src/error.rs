//! Error types for catalog lookups and the acquisition pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving, fetching or unpacking a wordlist.
#[derive(Error, Debug)]
pub enum WordlistError {
    #[error("no wordlist named '{0}' in catalog")]
    NotFound(String),

    #[error("no wordlists in group '{0}'")]
    EmptyGroup(String),

    #[error("permission denied: {} is not writable", .0.display())]
    PermissionDenied(PathBuf),

    #[error("transfer failed for {url}: {reason}")]
    Transfer { url: String, reason: String },

    #[error("cannot decode {what}: {reason}")]
    Decode { what: String, reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Usage(String),

    #[error("catalog {}: {reason}", .path.display())]
    Catalog { path: PathBuf, reason: String },

    #[error("config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, WordlistError>;

impl WordlistError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn decode(what: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decode {
            what: what.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn transfer(url: &str, reason: impl ToString) -> Self {
        Self::Transfer {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Process exit code for this error.
    ///
    /// Usage and environment problems (bad flags, unreadable catalog or
    /// config) exit with 2; everything that went wrong while serving a valid
    /// request exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) | Self::Catalog { .. } | Self::Config(_) => 2,
            _ => 1,
        }
    }
}
