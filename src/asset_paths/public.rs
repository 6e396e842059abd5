use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::filters::is_url_like;

fn hash_token() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[hash(?::(\d+))?\]").expect("invalid hash token regex"))
}

/// Substitute `[hash]` and `[hash:N]` tokens in a public path with the compilation hash.
///
/// Without a hash the public path is returned untouched.
pub fn interpolate_public_path<'a>(public_path: &'a str, hash: Option<&str>) -> Cow<'a, str> {
    match hash {
        Some(hash) => interpolate_hash(public_path, hash),
        None => Cow::Borrowed(public_path),
    }
}

/// Replace every `[hash]` token with `hash` and every `[hash:N]` with its first `N` characters.
pub(crate) fn interpolate_hash<'a>(template: &'a str, hash: &str) -> Cow<'a, str> {
    hash_token().replace_all(template, |caps: &Captures<'_>| {
        let length = caps
            .get(1)
            .and_then(|digits| digits.as_str().parse::<usize>().ok())
            .unwrap_or(hash.len());
        hash.chars().take(length).collect::<String>()
    })
}

/// Produce the path recorded in the manifest for an emitted file.
///
/// The public path is prepended verbatim when it is non-empty and the emitted path is not
/// already absolute or URL-like. The emitted name itself, query string included, is kept
/// exactly as the bundler assigned it.
pub fn resolve_public_path(public_path: &str, emitted: &str) -> String {
    if public_path.is_empty() || is_url_like(emitted) {
        emitted.to_string()
    } else {
        format!("{public_path}{emitted}")
    }
}
