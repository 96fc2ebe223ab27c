//! Wordlist catalog loading and lookup
//!
//! The catalog is a JSON array of descriptors:
//!
//! ```json
//! [
//!   {"name": "rockyou", "info": {"url": "https://.../rockyou.txt.tar.gz",
//!                                "group": "passwords", "size": "53 MB",
//!                                "updated": "2019-01-01"}}
//! ]
//! ```
//!
//! It is loaded once per invocation into a [`CatalogIndex`], which is
//! read-only from then on. The name index is built eagerly at construction
//! time with an explicit [`DuplicatePolicy`].

use crate::error::{Result, WordlistError};
use crate::helpers::acquire::Fetcher;
use crate::helpers::internal::fs_utils;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One named wordlist descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub url: String,
    pub group: String,
    /// Display only.
    pub size: String,
    /// Display only.
    pub updated: String,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    name: String,
    #[serde(default)]
    info: RawInfo,
}

#[derive(Debug, Default, Deserialize)]
struct RawInfo {
    #[serde(default)]
    url: String,
    #[serde(default)]
    group: String,
    #[serde(default)]
    size: String,
    #[serde(default)]
    updated: String,
}

impl From<RawEntry> for CatalogEntry {
    fn from(raw: RawEntry) -> Self {
        Self {
            name: raw.name,
            url: raw.info.url,
            group: raw.info.group,
            size: raw.info.size,
            updated: raw.info.updated,
        }
    }
}

/// What to do when two catalog entries share a name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// The first entry in catalog order wins.
    KeepFirst,
    /// The last entry in catalog order wins.
    #[default]
    KeepLast,
    /// Duplicate names make the catalog invalid.
    Reject,
}

/// Parse catalog JSON text into entries, preserving order.
pub fn parse_entries(json: &str) -> serde_json::Result<Vec<CatalogEntry>> {
    let raw: Vec<RawEntry> = serde_json::from_str(json)?;
    Ok(raw.into_iter().map(CatalogEntry::from).collect())
}

/// Immutable in-memory view over the catalog.
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    entries: Vec<CatalogEntry>,
    by_name: HashMap<String, usize>,
}

impl CatalogIndex {
    /// Build an index with the default (keep-last) collision policy.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        // Collecting in order overwrites earlier indices: last wins.
        let by_name = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();
        Self { entries, by_name }
    }

    /// Build an index, resolving name collisions with `policy`.
    ///
    /// Every entry stays in the backing sequence (so `list` and `search`
    /// still see duplicates); the policy only decides which one
    /// [`find_by_name`](Self::find_by_name) returns.
    pub fn with_policy(entries: Vec<CatalogEntry>, policy: DuplicatePolicy) -> Result<Self> {
        if policy == DuplicatePolicy::KeepLast {
            return Ok(Self::new(entries));
        }

        let mut by_name = HashMap::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            match by_name.get(&entry.name) {
                None => {
                    by_name.insert(entry.name.clone(), i);
                }
                Some(_) => match policy {
                    DuplicatePolicy::KeepFirst => {}
                    DuplicatePolicy::KeepLast => {
                        by_name.insert(entry.name.clone(), i);
                    }
                    DuplicatePolicy::Reject => {
                        return Err(WordlistError::Config(format!(
                            "duplicate catalog entry '{}'",
                            entry.name
                        )));
                    }
                },
            }
        }

        Ok(Self { entries, by_name })
    }

    /// Load and index a catalog file.
    pub fn load(path: &Path, policy: DuplicatePolicy) -> Result<Self> {
        if !path.is_file() {
            return Err(WordlistError::Catalog {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }

        let text = std::fs::read_to_string(path).map_err(|e| WordlistError::Catalog {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let entries = parse_entries(&text).map_err(|e| WordlistError::Catalog {
            path: path.to_path_buf(),
            reason: format!("invalid JSON: {}", e),
        })?;

        Self::with_policy(entries, policy).map_err(|e| WordlistError::Catalog {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// All entries in catalog order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact, case-sensitive lookup by name.
    pub fn find_by_name(&self, name: &str) -> Result<&CatalogEntry> {
        self.by_name
            .get(name)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| WordlistError::NotFound(name.to_string()))
    }

    /// Entries whose group equals `group`, in catalog order.
    ///
    /// An empty group is a wildcard and returns the whole catalog.
    pub fn filter_by_group(&self, group: &str) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| group.is_empty() || e.group == group)
            .collect()
    }

    /// Entries whose name matches the regular expression `pattern`.
    pub fn search(&self, pattern: &str) -> Result<Vec<&CatalogEntry>> {
        let re = Regex::new(pattern)
            .map_err(|e| WordlistError::Usage(format!("invalid search pattern: {}", e)))?;

        Ok(self.entries.iter().filter(|e| re.is_match(&e.name)).collect())
    }
}

/// Download a fresh catalog from `url` and atomically replace `path`.
///
/// The download lands next to `path` and is only renamed over it once it
/// parses as a catalog, so a bad download never clobbers a good catalog.
/// Returns the number of entries in the new catalog.
pub fn refresh(fetcher: &Fetcher, url: &str, path: &Path) -> Result<usize> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .map_err(|e| WordlistError::io(format!("cannot create directory {}", dir.display()), e))?;

    let download = fetcher.fetch(url, dir)?;
    let text = std::fs::read_to_string(download.path())
        .map_err(|e| WordlistError::io("cannot read downloaded catalog", e))?;
    let entries = parse_entries(&text).map_err(|e| WordlistError::Catalog {
        path: PathBuf::from(url),
        reason: format!("invalid JSON: {}", e),
    })?;

    download
        .persist(path)
        .map_err(|e| WordlistError::io(format!("cannot replace {}", path.display()), e.error))?;
    // Temporary files are created 0600; the catalog is world-readable.
    fs_utils::set_mode(path, 0o644)?;

    Ok(entries.len())
}
