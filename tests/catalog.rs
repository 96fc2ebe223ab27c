//! Catalog loading, lookup and refresh tests

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wordlistctl::catalog;
use wordlistctl::{CatalogIndex, DuplicatePolicy, Fetcher, WordlistError};

const SAMPLE: &str = r#"[
  {"name": "rockyou", "info": {"url": "https://example.invalid/rockyou.txt.tar.gz", "group": "passwords", "size": "53 MB", "updated": "2019-01-01"}},
  {"name": "names", "info": {"url": "https://example.invalid/names.txt.gz", "group": "usernames", "size": "1 MB", "updated": "2020-02-02"}},
  {"name": "dirb-common", "info": {"url": "https://example.invalid/common.txt", "group": "discovery", "size": "40 KB", "updated": "2018-03-03"}},
  {"name": "top-usernames", "info": {"url": "https://example.invalid/top.txt", "group": "usernames", "size": "2 KB", "updated": "2021-04-04"}},
  {"name": "fuzz-chars", "info": {"url": "https://example.invalid/chars.txt", "group": "fuzzing", "size": "1 KB", "updated": "2017-05-05"}}
]"#;

fn write_catalog(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("archive.json");
    std::fs::write(&path, json).unwrap();
    path
}

fn load_sample() -> (TempDir, CatalogIndex) {
    let dir = TempDir::new().unwrap();
    let path = write_catalog(dir.path(), SAMPLE);
    let index = CatalogIndex::load(&path, DuplicatePolicy::KeepLast).unwrap();
    (dir, index)
}

fn names<'a>(entries: &[&'a wordlistctl::CatalogEntry]) -> Vec<&'a str> {
    entries.iter().map(|e| e.name.as_str()).collect()
}

#[test]
fn test_find_by_name_returns_every_unique_entry() {
    let (_dir, index) = load_sample();
    assert_eq!(index.len(), 5);

    for entry in index.entries() {
        let found = index.find_by_name(&entry.name).unwrap();
        assert_eq!(found, entry);
    }

    let rockyou = index.find_by_name("rockyou").unwrap();
    assert_eq!(rockyou.group, "passwords");
    assert_eq!(rockyou.url, "https://example.invalid/rockyou.txt.tar.gz");
}

#[test]
fn test_find_by_name_unknown() {
    let (_dir, index) = load_sample();
    let err = index.find_by_name("doesnotexist").unwrap_err();
    assert!(matches!(err, WordlistError::NotFound(ref n) if n == "doesnotexist"));
}

#[test]
fn test_duplicate_names_last_wins_by_default() {
    let dir = TempDir::new().unwrap();
    let path = write_catalog(
        dir.path(),
        r#"[
          {"name": "dup", "info": {"url": "http://a/first", "group": "misc"}},
          {"name": "other", "info": {"url": "http://a/other", "group": "misc"}},
          {"name": "dup", "info": {"url": "http://a/second", "group": "misc"}}
        ]"#,
    );

    let index = CatalogIndex::load(&path, DuplicatePolicy::default()).unwrap();
    assert_eq!(index.find_by_name("dup").unwrap().url, "http://a/second");
    // Both copies remain visible to listing.
    assert_eq!(names(&index.filter_by_group("misc")), vec!["dup", "other", "dup"]);

    let first = CatalogIndex::load(&path, DuplicatePolicy::KeepFirst).unwrap();
    assert_eq!(first.find_by_name("dup").unwrap().url, "http://a/first");

    let err = CatalogIndex::load(&path, DuplicatePolicy::Reject).unwrap_err();
    assert!(matches!(err, WordlistError::Catalog { .. }));
}

#[test]
fn test_empty_group_lists_whole_catalog_in_order() {
    let (_dir, index) = load_sample();
    let all = index.filter_by_group("");
    assert_eq!(all.len(), index.len());
    assert_eq!(
        names(&all),
        vec!["rockyou", "names", "dirb-common", "top-usernames", "fuzz-chars"]
    );
}

#[test]
fn test_group_filter_preserves_order() {
    let (_dir, index) = load_sample();
    let users = index.filter_by_group("usernames");
    assert_eq!(names(&users), vec!["names", "top-usernames"]);
    assert!(users.iter().all(|e| e.group == "usernames"));
    assert!(index.filter_by_group("nope").is_empty());
}

#[test]
fn test_search_matches_names() {
    let (_dir, index) = load_sample();
    assert_eq!(names(&index.search("user").unwrap()), vec!["top-usernames"]);
    assert_eq!(
        names(&index.search("^(rock|fuzz)").unwrap()),
        vec!["rockyou", "fuzz-chars"]
    );
    assert!(index.search("zzz").unwrap().is_empty());
    assert!(matches!(
        index.search("a(b"),
        Err(WordlistError::Usage(_))
    ));
}

#[test]
fn test_missing_fields_default_to_empty() {
    let dir = TempDir::new().unwrap();
    let path = write_catalog(dir.path(), r#"[{"name": "bare", "info": {}}]"#);
    let index = CatalogIndex::load(&path, DuplicatePolicy::KeepLast).unwrap();
    let entry = index.find_by_name("bare").unwrap();
    assert_eq!(entry.url, "");
    assert_eq!(entry.group, "");
    assert_eq!(index.filter_by_group("").len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_refresh_replaces_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/archive.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let target = write_catalog(dir.path(), "[]");

    let count = catalog::refresh(
        &Fetcher::default(),
        &format!("{}/archive.json", server.uri()),
        &target,
    )
    .unwrap();

    assert_eq!(count, 5);
    assert_eq!(std::fs::read_to_string(&target).unwrap(), SAMPLE);
    // Only the catalog remains; the download was renamed over it.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&target).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_refresh_keeps_old_catalog_on_bad_download() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/archive.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let target = write_catalog(dir.path(), SAMPLE);

    let err = catalog::refresh(
        &Fetcher::default(),
        &format!("{}/archive.json", server.uri()),
        &target,
    )
    .unwrap_err();

    assert!(matches!(err, WordlistError::Catalog { .. }));
    assert_eq!(std::fs::read_to_string(&target).unwrap(), SAMPLE);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_refresh_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let target = dir.path().join("archive.json");

    let err = catalog::refresh(
        &Fetcher::default(),
        &format!("{}/archive.json", server.uri()),
        &target,
    )
    .unwrap_err();

    assert!(matches!(err, WordlistError::Transfer { .. }));
    assert!(!target.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
