//! Acquisition pipeline
//!
//! Resolves catalog requests into [`FetchJob`]s and drives each one through
//! download → sniff → extract → place → cleanup. Jobs run one at a time in
//! catalog order; a group fetch keeps going when a single entry fails.

use crate::catalog::{CatalogEntry, CatalogIndex};
use crate::config::{Config, Layout};
use crate::core::output;
use crate::error::{Result, WordlistError};
use crate::helpers::acquire::Fetcher;
use crate::helpers::build::extract::{self, ArchiveLayer, UnpackSummary};
use crate::helpers::build::sniff::Format;
use crate::helpers::install::placement;
use crate::helpers::internal::url_utils;
use std::path::{Path, PathBuf};

/// One acquisition: where the bytes come from and where they end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchJob {
    pub name: String,
    pub url: String,
    pub destination: PathBuf,
}

impl FetchJob {
    pub fn for_entry(entry: &CatalogEntry, base: &Path, layout: Layout) -> Self {
        let subdir = match layout {
            Layout::Group if !entry.group.is_empty() => &entry.group,
            _ => &entry.name,
        };
        Self {
            name: entry.name.clone(),
            url: entry.url.clone(),
            destination: base.join(subdir),
        }
    }

    /// Name of the raw download if it ends up placed as-is.
    fn download_name(&self) -> String {
        url_utils::extract_filename(&self.url).unwrap_or_else(|| self.name.clone())
    }
}

/// What a job left on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placed {
    /// A tar layer was unpacked into this directory.
    Tree { dir: PathBuf, summary: UnpackSummary },
    /// A single file was moved into place.
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub name: String,
    pub placed: Placed,
}

/// Per-entry results of a group fetch.
#[derive(Debug, Default)]
pub struct GroupReport {
    pub fetched: Vec<FetchOutcome>,
    pub failed: Vec<(String, WordlistError)>,
}

impl GroupReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Pipeline<'a> {
    catalog: &'a CatalogIndex,
    fetcher: Fetcher,
    temp_dir: PathBuf,
    layout: Layout,
}

impl<'a> Pipeline<'a> {
    pub fn new(catalog: &'a CatalogIndex, config: &Config) -> Self {
        Self {
            catalog,
            fetcher: Fetcher::new(config.http_timeout),
            temp_dir: config.temp_dir.clone(),
            layout: config.layout,
        }
    }

    /// Fetch a single wordlist by exact name into `base`.
    ///
    /// The name is resolved and `base` checked for write access before any
    /// network activity.
    pub fn fetch_one(&self, name: &str, base: &Path) -> Result<FetchOutcome> {
        let entry = self.catalog.find_by_name(name)?;
        placement::check_writable(base)?;

        output::action(&format!("Fetching {}", entry.name));
        self.run(&FetchJob::for_entry(entry, base, self.layout))
    }

    /// Fetch every wordlist in `group` into `base`, sequentially.
    ///
    /// Returns `Err` only for request-level problems (empty selector, unknown
    /// group, unwritable base); per-entry failures are collected in the
    /// report and do not stop the remaining entries.
    pub fn fetch_group(&self, group: &str, base: &Path) -> Result<GroupReport> {
        if group.is_empty() {
            return Err(WordlistError::Usage("group must not be empty".to_string()));
        }

        let entries = self.catalog.filter_by_group(group);
        if entries.is_empty() {
            return Err(WordlistError::EmptyGroup(group.to_string()));
        }
        placement::check_writable(base)?;

        let total = entries.len();
        let mut report = GroupReport::default();

        for (i, entry) in entries.into_iter().enumerate() {
            output::action_numbered(i + 1, total, &format!("Fetching {}", entry.name));

            match self.run(&FetchJob::for_entry(entry, base, self.layout)) {
                Ok(outcome) => report.fetched.push(outcome),
                Err(e) => {
                    output::error(&format!("{}: {}", entry.name, e));
                    report.failed.push((entry.name.clone(), e));
                }
            }
        }

        Ok(report)
    }

    /// Run one job end to end.
    ///
    /// Every intermediate layer is owned by exactly one [`ArchiveLayer`] at a
    /// time and deleted when consumed, or when dropped on an error path.
    pub fn run(&self, job: &FetchJob) -> Result<FetchOutcome> {
        let raw = self.fetcher.fetch(&job.url, &self.temp_dir)?;
        let mut layer = ArchiveLayer::new(raw, job.download_name())?;
        output::detail(&format!("{} is {}", layer.name(), layer.format()));

        if layer.format() == Format::Gzip {
            layer = extract::gunzip(layer, &self.temp_dir)?;
            output::detail(&format!("decompressed {} ({})", layer.name(), layer.format()));
        }

        placement::ensure_destination(&job.destination)?;

        let placed = match layer.format() {
            Format::Tar => {
                let summary = extract::unpack_tar(layer, &job.destination)?;
                output::detail(&format!(
                    "unpacked {} files, {} directories into {}",
                    summary.files,
                    summary.dirs,
                    job.destination.display()
                ));
                Placed::Tree {
                    dir: job.destination.clone(),
                    summary,
                }
            }
            // A second gzip layer is not peeled; it is placed as-is.
            Format::Gzip | Format::Opaque => {
                let path = placement::place_flat(layer, &job.destination)?;
                output::detail(&format!("placed {}", path.display()));
                Placed::File(path)
            }
        };

        output::success(&format!("{} fetched", job.name));
        Ok(FetchOutcome {
            name: job.name.clone(),
            placed,
        })
    }
}
