//! URL parsing utilities
//!
//! Derives local file names from catalog URLs.

/// Extract the file name from a URL.
///
/// Handles query strings, fragments and percent-encoding. Returns `None`
/// when the URL has no usable last path segment.
///
/// # Example
/// ```ignore
/// assert_eq!(extract_filename("https://example.com/rockyou.txt.tar.gz").as_deref(), Some("rockyou.txt.tar.gz"));
/// assert_eq!(extract_filename("https://example.com/"), None);
/// ```
pub fn extract_filename(url: &str) -> Option<String> {
    // Strip query string and fragment
    let clean_url = url.split('?').next().unwrap_or(url);
    let clean_url = clean_url.split('#').next().unwrap_or(clean_url);

    // A bare host ("https://example.com") has no path segment.
    let path = match clean_url.find("://") {
        Some(i) => {
            let after_scheme = &clean_url[i + 3..];
            after_scheme.find('/').map(|j| &after_scheme[j..])?
        }
        None => clean_url,
    };

    path.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(percent_decode)
        .map(|s| sanitize_filename(&s))
        .filter(|s| !s.is_empty())
}

/// Strip the gzip layer's suffix from a file name.
///
/// `foo.txt.gz` becomes `foo.txt`, `foo.tgz` becomes `foo.tar`. Names
/// without a gzip suffix are returned unchanged.
pub fn strip_gzip_suffix(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".tgz") {
        format!("{}.tar", &name[..name.len() - 4])
    } else if lower.ends_with(".gz") && name.len() > 3 {
        name[..name.len() - 3].to_string()
    } else {
        name.to_string()
    }
}

/// Simple percent-decoding for URL path segments.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            let hex = [bytes[i + 1], bytes[i + 2]];
            // Both bytes are ASCII hex digits, so this cannot fail.
            if let Ok(byte) = u8::from_str_radix(&String::from_utf8_lossy(&hex), 16) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Sanitize a file name for safe filesystem use.
///
/// Replaces separators and control characters and trims leading or trailing
/// dots and whitespace. Returns an empty string if nothing usable remains.
pub fn sanitize_filename(name: &str) -> String {
    if name == "." || name == ".." {
        return String::new();
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    sanitized.trim().trim_matches('.').to_string()
}
