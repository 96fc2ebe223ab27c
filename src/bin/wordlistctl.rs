//! wordlistctl - fetch, install and search wordlist archives
//!
//! Usage:
//!   wordlistctl fetch -n <name> [-b <base>]     Fetch one wordlist
//!   wordlistctl fetch -g <group> [-b <base>]    Fetch every wordlist in a group
//!   wordlistctl list [-g <group>]               List the catalog
//!   wordlistctl search <pattern>                Search names by regex
//!   wordlistctl update                          Refresh the catalog

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use wordlistctl::catalog;
use wordlistctl::config::timeout_from_secs;
use wordlistctl::{CatalogIndex, Config, Fetcher, Layout, Pipeline, WordlistError, output};

#[derive(Parser)]
#[command(name = "wordlistctl")]
#[command(about = "Fetch, install and search wordlist archives")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the catalog file (archive.json)
    #[arg(short = 'a', long, global = true, env = "WORDLISTCTL_ARCHIVE")]
    archive: Option<PathBuf>,

    /// URL the catalog is refreshed from
    #[arg(long, global = true, env = "WORDLISTCTL_CATALOG_URL")]
    catalog_url: Option<String>,

    /// HTTP timeout in seconds (0 waits forever)
    #[arg(long, global = true, env = "WORDLISTCTL_HTTP_TIMEOUT")]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download and unpack wordlists
    Fetch {
        /// Name of the wordlist to fetch
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Group to fetch: usernames, passwords, discovery, fuzzing, misc
        #[arg(short = 'g', long)]
        group: Option<String>,

        /// Base directory to store wordlists
        #[arg(short = 'b', long = "base", env = "WORDLISTCTL_BASE_DIR")]
        base: Option<PathBuf>,

        /// Destination subdirectory: "group" or "name"
        #[arg(long)]
        layout: Option<Layout>,

        /// Directory for intermediate files
        #[arg(long)]
        temp_dir: Option<PathBuf>,
    },

    /// List catalog entries
    List {
        /// Only list this group
        #[arg(short = 'g', long)]
        group: Option<String>,
    },

    /// Search wordlist names with a regular expression
    Search {
        /// Regular expression matched against names
        pattern: String,
    },

    /// Download a fresh catalog
    Update,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            output::error(&format!("{:#}", e));
            if let Some(WordlistError::Catalog { .. }) = e.downcast_ref::<WordlistError>() {
                output::hint("run `wordlistctl update` to download the catalog");
            }
            ExitCode::from(failure_code(&e))
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(archive) = cli.archive {
        config.archive = archive;
    }
    if let Some(url) = cli.catalog_url {
        config.catalog_url = url;
    }
    if let Some(secs) = cli.timeout {
        config.http_timeout = timeout_from_secs(secs);
    }

    match cli.command {
        Commands::Fetch {
            name,
            group,
            base,
            layout,
            temp_dir,
        } => {
            let selector = Selector::from_args(name, group)?;
            if let Some(base) = base {
                config.base_dir = base;
            }
            if let Some(layout) = layout {
                config.layout = layout;
            }
            if let Some(temp_dir) = temp_dir {
                config.temp_dir = temp_dir;
            }

            let catalog = load_catalog(&config)?;
            let pipeline = Pipeline::new(&catalog, &config);

            match selector {
                Selector::Name(name) => {
                    pipeline.fetch_one(&name, &config.base_dir)?;
                }
                Selector::Group(group) => {
                    let report = pipeline.fetch_group(&group, &config.base_dir)?;
                    let total = report.fetched.len() + report.failed.len();
                    if report.is_success() {
                        output::success(&format!("fetched {} wordlist(s) in {}", total, group));
                    } else {
                        output::warning(&format!(
                            "{} of {} wordlist(s) in {} failed: {}",
                            report.failed.len(),
                            total,
                            group,
                            report
                                .failed
                                .iter()
                                .map(|(name, _)| name.as_str())
                                .collect::<Vec<_>>()
                                .join(", ")
                        ));
                        return Ok(ExitCode::FAILURE);
                    }
                }
            }
        }

        Commands::List { group } => {
            let catalog = load_catalog(&config)?;
            let group = group.unwrap_or_default();
            let entries = catalog.filter_by_group(&group);

            if group.is_empty() {
                output::info(&format!("{} wordlist(s)", entries.len()));
            } else {
                output::info(&format!("{} wordlist(s) in {}", entries.len(), group));
            }
            for entry in entries {
                output::entry_line(entry);
            }
        }

        Commands::Search { pattern } => {
            let catalog = load_catalog(&config)?;
            let matches = catalog.search(&pattern)?;

            if matches.is_empty() {
                output::info(&format!("no wordlists match '{}'", pattern));
            }
            for entry in matches {
                output::entry_line(entry);
            }
        }

        Commands::Update => {
            output::action(&format!("Updating catalog from {}", config.catalog_url));
            let fetcher = Fetcher::new(config.http_timeout);
            let count = catalog::refresh(&fetcher, &config.catalog_url, &config.archive)?;
            output::success(&format!(
                "catalog updated: {} wordlist(s) in {}",
                count,
                config.archive.display()
            ));
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Library errors carry their own code; anything else is a plain failure.
fn failure_code(e: &anyhow::Error) -> u8 {
    e.downcast_ref::<WordlistError>()
        .map_or(1, |err| err.exit_code() as u8)
}

/// Exactly one of `--name` / `--group`.
enum Selector {
    Name(String),
    Group(String),
}

impl Selector {
    fn from_args(name: Option<String>, group: Option<String>) -> Result<Self, WordlistError> {
        match (name, group) {
            (Some(name), None) if !name.is_empty() => Ok(Self::Name(name)),
            (None, Some(group)) if !group.is_empty() => Ok(Self::Group(group)),
            (Some(_), Some(_)) => Err(WordlistError::Usage(
                "choose either a group or a name, not both".to_string(),
            )),
            _ => Err(WordlistError::Usage(
                "choose either a group (-g) or a name (-n)".to_string(),
            )),
        }
    }
}

fn load_catalog(config: &Config) -> Result<CatalogIndex, WordlistError> {
    CatalogIndex::load(&config.archive, config.duplicates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_requires_exactly_one() {
        assert!(matches!(
            Selector::from_args(Some("rockyou".into()), None),
            Ok(Selector::Name(_))
        ));
        assert!(matches!(
            Selector::from_args(None, Some("passwords".into())),
            Ok(Selector::Group(_))
        ));
        assert!(matches!(
            Selector::from_args(Some("a".into()), Some("b".into())),
            Err(WordlistError::Usage(_))
        ));
        assert!(matches!(
            Selector::from_args(None, None),
            Err(WordlistError::Usage(_))
        ));
        assert!(matches!(
            Selector::from_args(Some(String::new()), None),
            Err(WordlistError::Usage(_))
        ));
    }

    #[test]
    fn test_cli_parses_fetch() {
        let cli = Cli::try_parse_from(["wordlistctl", "fetch", "-n", "rockyou", "-b", "/data/wl"])
            .unwrap();
        match cli.command {
            Commands::Fetch { name, base, .. } => {
                assert_eq!(name.as_deref(), Some("rockyou"));
                assert_eq!(base, Some(PathBuf::from("/data/wl")));
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_cli_parses_layout() {
        let cli =
            Cli::try_parse_from(["wordlistctl", "fetch", "-g", "misc", "--layout", "name"]).unwrap();
        match cli.command {
            Commands::Fetch { layout, .. } => assert_eq!(layout, Some(Layout::Name)),
            _ => panic!("expected fetch"),
        }
        assert!(
            Cli::try_parse_from(["wordlistctl", "fetch", "-g", "misc", "--layout", "flat"])
                .is_err()
        );
    }

    #[test]
    fn test_failure_code_follows_error_kind() {
        let catalog: anyhow::Error = WordlistError::Catalog {
            path: PathBuf::from("/usr/share/wordlistctl/archive.json"),
            reason: "file not found".into(),
        }
        .into();
        assert_eq!(failure_code(&catalog), 2);

        let config = anyhow::Error::from(WordlistError::Config("bad".into()))
            .context("failed to load configuration");
        assert_eq!(failure_code(&config), 2);

        let transfer: anyhow::Error = WordlistError::Transfer {
            url: "http://x/a.gz".into(),
            reason: "server returned 404".into(),
        }
        .into();
        assert_eq!(failure_code(&transfer), 1);

        assert_eq!(failure_code(&anyhow::anyhow!("other")), 1);
    }
}
