//! Fetch, unpack and search wordlist archives
//!
//! A JSON catalog names wordlists and where to download them. Fetching one
//! runs the acquisition pipeline:
//!
//! 1. **download** the URL into a temporary file
//! 2. **sniff** the content (gzip, tar or opaque) from its leading bytes
//! 3. **gunzip** one gzip layer, if present
//! 4. **unpack** one tar layer into the destination, or **place** the
//!    remaining payload there as a single file
//! 5. **clean up** every intermediate file
//!
//! # Example
//!
//! ```no_run
//! use wordlistctl::{CatalogIndex, Config, Pipeline};
//! use std::path::Path;
//!
//! let config = Config::load()?;
//! let catalog = CatalogIndex::load(&config.archive, config.duplicates)?;
//! let outcome = Pipeline::new(&catalog, &config).fetch_one("rockyou", Path::new("/data/wl"))?;
//! println!("{:?}", outcome.placed);
//! # Ok::<(), wordlistctl::WordlistError>(())
//! ```
//!
//! # Destination layout
//!
//! `<base>/<group>/...` by default, `<base>/<name>/...` with
//! [`Layout::Name`]. A tar payload keeps its internal layout; anything else
//! becomes one file in that directory.

pub mod catalog;
pub mod config;
pub mod core;
pub mod error;
pub mod helpers;
pub mod pipeline;

pub use catalog::{CatalogEntry, CatalogIndex, DuplicatePolicy};
pub use config::{Config, Layout};
pub use crate::core::output;
pub use error::{Result, WordlistError};
pub use helpers::acquire::Fetcher;
pub use pipeline::{FetchJob, FetchOutcome, GroupReport, Pipeline, Placed};
