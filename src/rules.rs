//! Per-site password rules, keyed by a path segment of the secret name.

use std::collections::HashMap;

use crate::config::RuleConfig;

/// Minimum/maximum acceptable password length for one domain
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainRule {
    pub domain: String,
    pub min_length: usize,
    pub max_length: usize,
    /// Whether the site accepts symbol characters
    pub symbols: bool,
    pub change_url: Option<String>,
}

impl DomainRule {
    pub fn clamp(&self, length: usize) -> usize {
        length.clamp(self.min_length, self.max_length)
    }
}

/// Lookup of rules and password-change pages by path segment
pub trait RuleBook {
    fn lookup_rule(&self, segment: &str) -> Option<DomainRule>;
    fn lookup_change_url(&self, segment: &str) -> Option<String>;
}

/// Rules held in memory, usually built from the `[rules]` config table
#[derive(Default)]
pub struct StaticRuleBook {
    rules: HashMap<String, DomainRule>,
}

impl StaticRuleBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config<'a>(rules: impl IntoIterator<Item = (&'a String, &'a RuleConfig)>) -> Self {
        let mut book = Self::new();
        for (domain, rule) in rules {
            book.insert(DomainRule {
                domain: domain.clone(),
                min_length: rule.min_length,
                max_length: rule.max_length,
                symbols: rule.symbols,
                change_url: rule.change_url.clone(),
            });
        }
        book
    }

    pub fn insert(&mut self, rule: DomainRule) {
        self.rules.insert(rule.domain.to_ascii_lowercase(), rule);
    }
}

impl RuleBook for StaticRuleBook {
    fn lookup_rule(&self, segment: &str) -> Option<DomainRule> {
        self.rules.get(&segment.to_ascii_lowercase()).cloned()
    }

    fn lookup_change_url(&self, segment: &str) -> Option<String> {
        self.rules
            .get(&segment.to_ascii_lowercase())
            .and_then(|rule| rule.change_url.clone())
            .filter(|url| !url.is_empty())
    }
}

/// Final path segment of `name`
pub fn basename(name: &str) -> &str {
    let trimmed = name.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((_, base)) => base,
        None => trimmed,
    }
}

/// Everything before the final path segment, `.` for top-level names
pub fn dirname(name: &str) -> &str {
    let trimmed = name.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some(("", _)) => "/",
        Some((dir, _)) => dir,
        None => ".",
    }
}

/// Walk the segments of `name` from leaf to root and return the first
/// segment with a registered rule.
pub fn rule_for_secret(rules: &dyn RuleBook, name: &str) -> Option<DomainRule> {
    let mut current = name;
    while !current.is_empty() && current != "." && current != "/" {
        if let Some(rule) = rules.lookup_rule(basename(current)) {
            return Some(rule);
        }
        current = dirname(current);
    }
    None
}

/// Change URL for the first segment with one, leaf first, skipping the
/// top-level segment.
pub fn change_url_for_secret(rules: &dyn RuleBook, name: &str) -> Option<String> {
    let segments: Vec<&str> = name.split('/').collect();
    segments
        .iter()
        .skip(1)
        .rev()
        .find_map(|segment| rules.lookup_change_url(segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> StaticRuleBook {
        let mut book = StaticRuleBook::new();
        book.insert(DomainRule {
            domain: "example.com".to_string(),
            min_length: 8,
            max_length: 20,
            symbols: true,
            change_url: Some("https://example.com/pw".to_string()),
        });
        book.insert(DomainRule {
            domain: "work".to_string(),
            min_length: 12,
            max_length: 64,
            symbols: false,
            change_url: Some("https://intranet/pw".to_string()),
        });
        book
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(basename("web/example.com"), "example.com");
        assert_eq!(basename("example.com"), "example.com");
        assert_eq!(dirname("web/example.com"), "web");
        assert_eq!(dirname("a/b/c"), "a/b");
        assert_eq!(dirname("example.com"), ".");
    }

    #[test]
    fn test_rule_leaf_wins() {
        let rule = rule_for_secret(&book(), "work/example.com").unwrap();
        assert_eq!(rule.domain, "example.com");
    }

    #[test]
    fn test_rule_found_on_parent_segment() {
        let rule = rule_for_secret(&book(), "work/vpn/alice").unwrap();
        assert_eq!(rule.domain, "work");
    }

    #[test]
    fn test_rule_lookup_is_case_insensitive() {
        assert!(rule_for_secret(&book(), "web/Example.COM").is_some());
    }

    #[test]
    fn test_no_rule() {
        assert!(rule_for_secret(&book(), "personal/bank").is_none());
        assert!(rule_for_secret(&book(), "").is_none());
    }

    #[test]
    fn test_change_url_skips_root_segment() {
        // "work" is the top-level segment here and is not consulted
        assert_eq!(change_url_for_secret(&book(), "work/vpn"), None);
        assert_eq!(
            change_url_for_secret(&book(), "work/example.com"),
            Some("https://example.com/pw".to_string())
        );
        assert_eq!(
            change_url_for_secret(&book(), "home/work/vpn"),
            Some("https://intranet/pw".to_string())
        );
        assert_eq!(change_url_for_secret(&book(), "example.com"), None);
    }

    #[test]
    fn test_clamp() {
        let rule = book().lookup_rule("example.com").unwrap();
        assert_eq!(rule.clamp(4), 8);
        assert_eq!(rule.clamp(15), 15);
        assert_eq!(rule.clamp(99), 20);
    }
}
