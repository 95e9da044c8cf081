//! Suggestions for the name argument of `generate`, derived from the names
//! already in the store.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::rules::basename;

fn domain_pattern() -> &'static Regex {
    static DOMAIN: OnceLock<Regex> = OnceLock::new();
    DOMAIN.get_or_init(|| {
        Regex::new(r"^(?i)([a-z0-9]+(-[a-z0-9]+)*\.)+[a-z]{2,}$").expect("domain pattern compiles")
    })
}

/// Basenames that look like account names (`bob@example.org`, `bob_work`)
pub fn extract_emails<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names
        .iter()
        .map(|name| basename(name.as_ref()))
        .filter(|base| base.contains('@') || base.contains('_'))
        .map(str::to_string)
        .collect()
}

/// Basenames that look like hostnames, each followed by its parent domains
/// (`a.example.com` also yields `example.com`).
pub fn extract_domains<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut results = Vec::with_capacity(names.len());
    for name in names {
        let mut candidate = basename(name.as_ref());
        while domain_pattern().is_match(candidate) {
            results.push(candidate.to_string());
            match candidate.split_once('.') {
                Some((_, parent)) => candidate = parent,
                None => break,
            }
        }
    }
    results
}

/// Sorted and deduplicated
fn uniq(values: Vec<String>) -> Vec<String> {
    values.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

fn filter_prefix(values: Vec<String>, prefix: &str) -> Vec<String> {
    values
        .into_iter()
        .filter(|v| v.starts_with(prefix))
        .collect()
}

/// Completion candidates for `needle`.
///
/// A needle with a `/` completes account names below that directory,
/// anything else completes hostnames.
pub fn suggest<S: AsRef<str>>(names: &[S], needle: &str) -> Vec<String> {
    if needle.is_empty() {
        return Vec::new();
    }

    if needle.contains('/') {
        filter_prefix(uniq(extract_emails(names)), basename(needle))
    } else {
        filter_prefix(uniq(extract_domains(names)), needle)
    }
}

/// Quote `s` for safe use as a single shell word
pub fn bash_escape(s: &str) -> String {
    let safe = |c: char| c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c);
    if !s.is_empty() && s.chars().all(safe) {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: &[&str] = &[
        "work/a.example.com",
        "home/bob@example.org",
        "home/alice_work",
        "web/shop.example.com",
        "web/shop.example.com",
        "misc/notes",
        "web/localhost",
    ];

    #[test]
    fn test_domain_completion() {
        assert_eq!(
            suggest(&["work/a.example.com", "home/bob@example.org"], "exam"),
            vec!["example.com"]
        );
        assert_eq!(suggest(NAMES, "a."), vec!["a.example.com"]);
        assert_eq!(suggest(NAMES, "s"), vec!["shop.example.com"]);
        assert!(suggest(NAMES, "local").is_empty());
    }

    #[test]
    fn test_email_completion_uses_basename_prefix() {
        assert_eq!(suggest(NAMES, "home/b"), vec!["bob@example.org"]);
        assert_eq!(
            suggest(NAMES, "any/"),
            vec!["alice_work", "bob@example.org"]
        );
    }

    #[test]
    fn test_suggest_is_stable() {
        let first = suggest(NAMES, "shop");
        assert_eq!(first, suggest(NAMES, "shop"));
        assert_eq!(first, vec!["shop.example.com"]);
    }

    #[test]
    fn test_empty_needle() {
        assert!(suggest(NAMES, "").is_empty());
    }

    #[test]
    fn test_extractors() {
        assert_eq!(
            extract_domains(NAMES),
            vec![
                "a.example.com",
                "example.com",
                "shop.example.com",
                "example.com",
                "shop.example.com",
                "example.com",
            ]
        );
        assert_eq!(extract_emails(NAMES), vec!["bob@example.org", "alice_work"]);
    }

    #[test]
    fn test_bash_escape() {
        assert_eq!(bash_escape("example.com"), "example.com");
        assert_eq!(bash_escape("bob@example.org"), "bob@example.org");
        assert_eq!(bash_escape("a b"), "'a b'");
        assert_eq!(bash_escape("it's"), r"'it'\''s'");
        assert_eq!(bash_escape(""), "''");
    }
}
