//! Layered configuration
//!
//! Built-in defaults, then `wordlistctl/config.toml` from every
//! `$XDG_CONFIG_DIRS` entry, then `$XDG_CONFIG_HOME`. Environment variables
//! and command-line flags are applied on top by the binary.
//!
//! ```toml
//! archive = "/usr/share/wordlistctl/archive.json"
//! base_dir = "/srv/wordlists"
//! layout = "name"
//! http_timeout_secs = 600
//! duplicates = "keep-first"
//! ```

use crate::catalog::DuplicatePolicy;
use crate::error::{Result, WordlistError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ARCHIVE: &str = "/usr/share/wordlistctl/archive.json";
pub const DEFAULT_CATALOG_URL: &str = "https://wl.casalino.xyz/archive.json";
pub const DEFAULT_BASE_DIR: &str = "/usr/share/wordlists";

/// How the destination directory of a fetch is derived from the base dir.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// `<base>/<group>/...`
    #[default]
    Group,
    /// `<base>/<name>/...`
    Name,
}

impl std::str::FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "group" => Ok(Self::Group),
            "name" => Ok(Self::Name),
            other => Err(format!("unknown layout '{other}' (expected 'group' or 'name')")),
        }
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub archive: PathBuf,
    pub catalog_url: String,
    pub base_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub layout: Layout,
    /// `None` blocks indefinitely on a stalled peer.
    pub http_timeout: Option<Duration>,
    pub duplicates: DuplicatePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive: PathBuf::from(DEFAULT_ARCHIVE),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            temp_dir: std::env::temp_dir(),
            layout: Layout::default(),
            http_timeout: None,
            duplicates: DuplicatePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    archive: Option<PathBuf>,
    catalog_url: Option<String>,
    base_dir: Option<PathBuf>,
    temp_dir: Option<PathBuf>,
    layout: Option<Layout>,
    http_timeout_secs: Option<u64>,
    duplicates: Option<DuplicatePolicy>,
}

impl ConfigToml {
    fn merge(&mut self, other: ConfigToml) {
        if other.archive.is_some() {
            self.archive = other.archive;
        }
        if other.catalog_url.is_some() {
            self.catalog_url = other.catalog_url;
        }
        if other.base_dir.is_some() {
            self.base_dir = other.base_dir;
        }
        if other.temp_dir.is_some() {
            self.temp_dir = other.temp_dir;
        }
        if other.layout.is_some() {
            self.layout = other.layout;
        }
        if other.http_timeout_secs.is_some() {
            self.http_timeout_secs = other.http_timeout_secs;
        }
        if other.duplicates.is_some() {
            self.duplicates = other.duplicates;
        }
    }

    fn apply_to(self, cfg: &mut Config) {
        if let Some(archive) = self.archive {
            cfg.archive = archive;
        }
        if let Some(url) = self.catalog_url {
            cfg.catalog_url = url;
        }
        if let Some(base) = self.base_dir {
            cfg.base_dir = base;
        }
        if let Some(temp) = self.temp_dir {
            cfg.temp_dir = temp;
        }
        if let Some(layout) = self.layout {
            cfg.layout = layout;
        }
        if let Some(secs) = self.http_timeout_secs {
            cfg.http_timeout = timeout_from_secs(secs);
        }
        if let Some(policy) = self.duplicates {
            cfg.duplicates = policy;
        }
    }
}

/// Zero means no timeout.
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn split_xdg_config_dirs() -> Vec<PathBuf> {
    let raw = std::env::var("XDG_CONFIG_DIRS").unwrap_or_else(|_| "/etc/xdg".to_owned());
    raw.split(':')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn xdg_config_home() -> PathBuf {
    if let Ok(raw) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".").join(".config"))
}

/// Candidate config files, lowest precedence first.
pub fn config_files() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = split_xdg_config_dirs()
        .into_iter()
        .map(|dir| dir.join("wordlistctl").join("config.toml"))
        .collect();
    paths.push(xdg_config_home().join("wordlistctl").join("config.toml"));
    paths
}

fn read_toml(path: &Path) -> Result<ConfigToml> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| WordlistError::Config(format!("failed to read {}: {e}", path.display())))?;
    toml::from_str::<ConfigToml>(&text)
        .map_err(|e| WordlistError::Config(format!("invalid TOML in {}: {e}", path.display())))
}

impl Config {
    /// Defaults overlaid with every existing file in `paths`, in order.
    pub fn from_files(paths: &[PathBuf]) -> Result<Self> {
        let mut merged = ConfigToml::default();
        for path in paths.iter().filter(|p| p.exists()) {
            merged.merge(read_toml(path)?);
        }

        let mut cfg = Config::default();
        merged.apply_to(&mut cfg);
        Ok(cfg)
    }

    /// Defaults overlaid with the XDG config files.
    pub fn load() -> Result<Self> {
        Self::from_files(&config_files())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_files() {
        let cfg = Config::from_files(&[PathBuf::from("/nonexistent/config.toml")]).unwrap();
        assert_eq!(cfg.archive, PathBuf::from(DEFAULT_ARCHIVE));
        assert_eq!(cfg.layout, Layout::Group);
        assert!(cfg.http_timeout.is_none());
        assert_eq!(cfg.duplicates, DuplicatePolicy::KeepLast);
    }

    #[test]
    fn test_later_files_win() {
        let temp = tempdir().unwrap();
        let system = temp.path().join("system.toml");
        let user = temp.path().join("user.toml");
        std::fs::write(&system, "base_dir = \"/srv/a\"\nlayout = \"name\"\n").unwrap();
        std::fs::write(&user, "base_dir = \"/srv/b\"\nhttp_timeout_secs = 30\n").unwrap();

        let cfg = Config::from_files(&[system, user]).unwrap();
        assert_eq!(cfg.base_dir, PathBuf::from("/srv/b"));
        assert_eq!(cfg.layout, Layout::Name);
        assert_eq!(cfg.http_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_zero_timeout_means_none() {
        assert!(timeout_from_secs(0).is_none());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "layout = \"sideways\"\n").unwrap();
        let err = Config::from_files(&[path]).unwrap_err();
        assert!(matches!(err, WordlistError::Config(_)));
    }

    #[test]
    fn test_layout_from_str() {
        assert_eq!("group".parse::<Layout>().unwrap(), Layout::Group);
        assert_eq!("name".parse::<Layout>().unwrap(), Layout::Name);
        assert!("flat".parse::<Layout>().is_err());
    }
}
