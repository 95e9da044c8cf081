use crate::context::Context;
use crate::crypto::Generators;
use crate::error::{Error, Result};
use crate::generate::request::GeneratorKind;
use crate::generate::resolver::ResolvedPlan;

/// Produce a password for `name` according to `plan`.
///
/// A domain rule takes precedence over the requested generator kind.
pub fn dispatch(
    ctx: &Context,
    plan: &ResolvedPlan,
    generators: &dyn Generators,
    name: &str,
) -> Result<String> {
    ctx.check_cancelled()?;

    let password = match (&plan.domain_rule, plan.generator_kind) {
        (Some(rule), _) => generators.for_domain(plan.length, rule)?,
        (None, GeneratorKind::Xkcd) => {
            generators.xkcd(plan.length, &plan.separator, &plan.language)?
        }
        (None, GeneratorKind::Memorable) => {
            generators.memorable(plan.length, plan.symbols, plan.strict)?
        }
        (None, GeneratorKind::External) => generators.external(ctx, plan.length)?,
        (None, GeneratorKind::Default) | (None, GeneratorKind::Strict) => {
            if plan.strict {
                generators.random_strict(plan.length, plan.symbols)?
            } else {
                generators.random(plan.length, plan.symbols)?
            }
        }
    };

    if password.is_empty() {
        let target = plan
            .domain_rule
            .as_ref()
            .map(|rule| rule.domain.as_str())
            .unwrap_or(name);
        return Err(Error::Generation(format!(
            "failed to generate password for {}",
            target
        )));
    }

    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::RandomGenerators;
    use crate::rules::DomainRule;
    use std::cell::RefCell;

    /// Records which strategy was invoked and returns a fixed value
    #[derive(Default)]
    struct RecordingGenerators {
        calls: RefCell<Vec<String>>,
        value: String,
    }

    impl RecordingGenerators {
        fn returning(value: &str) -> Self {
            Self {
                calls: RefCell::default(),
                value: value.to_string(),
            }
        }

        fn record(&self, call: String) -> Result<String> {
            self.calls.borrow_mut().push(call);
            Ok(self.value.clone())
        }
    }

    impl Generators for RecordingGenerators {
        fn random(&self, length: usize, symbols: bool) -> Result<String> {
            self.record(format!("random {} {}", length, symbols))
        }
        fn random_strict(&self, length: usize, symbols: bool) -> Result<String> {
            self.record(format!("strict {} {}", length, symbols))
        }
        fn memorable(&self, length: usize, symbols: bool, strict: bool) -> Result<String> {
            self.record(format!("memorable {} {} {}", length, symbols, strict))
        }
        fn xkcd(&self, words: usize, separator: &str, language: &str) -> Result<String> {
            self.record(format!("xkcd {} {:?} {}", words, separator, language))
        }
        fn external(&self, _ctx: &Context, length: usize) -> Result<String> {
            self.record(format!("external {}", length))
        }
        fn for_domain(&self, length: usize, rule: &DomainRule) -> Result<String> {
            self.record(format!("domain {} {}", length, rule.domain))
        }
    }

    fn plan(kind: GeneratorKind) -> ResolvedPlan {
        ResolvedPlan {
            length: 12,
            symbols: true,
            strict: false,
            generator_kind: kind,
            domain_rule: None,
            separator: " ".to_string(),
            language: "en".to_string(),
        }
    }

    fn rule() -> DomainRule {
        DomainRule {
            domain: "example.com".to_string(),
            min_length: 8,
            max_length: 20,
            symbols: false,
            change_url: None,
        }
    }

    #[test]
    fn test_kind_selects_strategy() {
        let ctx = Context::default();
        let cases = [
            (GeneratorKind::Default, false, "random 12 true"),
            (GeneratorKind::Default, true, "strict 12 true"),
            (GeneratorKind::Memorable, true, "memorable 12 true true"),
            (GeneratorKind::Xkcd, false, "xkcd 12 \" \" en"),
            (GeneratorKind::External, false, "external 12"),
        ];

        for (kind, strict, expected) in cases {
            let generators = RecordingGenerators::returning("pw");
            let mut plan = plan(kind);
            plan.strict = strict;

            assert_eq!(dispatch(&ctx, &plan, &generators, "a").unwrap(), "pw");
            assert_eq!(generators.calls.borrow().as_slice(), [expected.to_string()]);
        }
    }

    #[test]
    fn test_domain_rule_ignores_kind() {
        let ctx = Context::default();
        let generators = RecordingGenerators::returning("pw");
        let mut plan = plan(GeneratorKind::Xkcd);
        plan.domain_rule = Some(rule());

        dispatch(&ctx, &plan, &generators, "web/example.com").unwrap();
        assert_eq!(
            generators.calls.borrow().as_slice(),
            ["domain 12 example.com".to_string()]
        );
    }

    #[test]
    fn test_empty_password_is_generation_error() {
        let ctx = Context::default();
        let generators = RecordingGenerators::returning("");

        match dispatch(&ctx, &plan(GeneratorKind::Default), &generators, "mail/bob") {
            Err(Error::Generation(msg)) => {
                assert_eq!(msg, "failed to generate password for mail/bob")
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let mut with_rule = plan(GeneratorKind::Default);
        with_rule.domain_rule = Some(rule());
        match dispatch(&ctx, &with_rule, &generators, "web/example.com") {
            Err(Error::Generation(msg)) => {
                assert_eq!(msg, "failed to generate password for example.com")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_xkcd_with_separator() {
        let ctx = Context::default();
        let mut plan = plan(GeneratorKind::Xkcd);
        plan.length = 4;
        plan.separator = "-".to_string();

        let password = dispatch(&ctx, &plan, &RandomGenerators::new(), "a").unwrap();

        assert_eq!(password.matches('-').count(), 3);
        let words: Vec<&str> = password.split('-').collect();
        assert_eq!(words.len(), 4);
        assert!(words.iter().all(|w| !w.is_empty()));
    }

    #[test]
    fn test_rule_generation_within_policy() {
        let ctx = Context::default();
        let mut plan = plan(GeneratorKind::Default);
        plan.domain_rule = Some(rule());

        let password = dispatch(&ctx, &plan, &RandomGenerators::new(), "a").unwrap();

        assert_eq!(password.len(), 12);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_short_configured_rule_generates() {
        use crate::config::Config;
        use crate::rules::{rule_for_secret, StaticRuleBook};

        let ctx = Context::default();
        let config =
            Config::from_toml("[rules.\"pin.example\"]\nmin_length = 2\nmax_length = 3\n")
                .unwrap();
        let rules = StaticRuleBook::from_config(&config.rules);

        let mut plan = plan(GeneratorKind::Default);
        plan.length = 3;
        plan.domain_rule = rule_for_secret(&rules, "bank/pin.example");
        assert!(plan.domain_rule.is_some());

        let password = dispatch(&ctx, &plan, &RandomGenerators::new(), "bank/pin.example").unwrap();
        assert_eq!(password.len(), 3);
    }
}
