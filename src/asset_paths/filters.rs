use regex::Regex;

fn url_like_patterns() -> &'static [Regex] {
    use std::sync::OnceLock;

    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            vec![
                Regex::new(r"(?i)^[a-z][a-z0-9+.\-]*://").expect("invalid scheme regex"),
                Regex::new(r"(?i)^data:").expect("invalid data URI regex"),
                // Also covers protocol-relative `//host/...` URLs.
                Regex::new(r"^/").expect("invalid absolute path regex"),
            ]
        })
        .as_slice()
}

/// Determine whether an emitted path already carries its own location.
///
/// Absolute paths, protocol-relative URLs and URLs with a scheme are reported verbatim and
/// never receive the public path prefix.
pub fn is_url_like(value: &str) -> bool {
    url_like_patterns()
        .iter()
        .any(|pattern| pattern.is_match(value))
}
