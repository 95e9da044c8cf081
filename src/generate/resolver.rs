use crate::config::GenerateConfig;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::generate::request::{GenerationRequest, GeneratorKind};
use crate::output::Output;
use crate::prompt::Prompter;
use crate::rules::{rule_for_secret, DomainRule, RuleBook};

pub const DEFAULT_LENGTH: usize = 24;
pub const DEFAULT_XKCD_LENGTH: usize = 4;
/// Suggested length for rule-based generation without an explicit length
pub const DEFAULT_RULE_LENGTH: usize = 16;
/// Environment variable holding the default password length
pub const LENGTH_ENV: &str = "GENSECRET_PW_DEFAULT_LENGTH";

const DEFAULT_SEPARATOR: &str = " ";

/// Fully decided generation parameters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPlan {
    /// Characters, or words for the xkcd generator
    pub length: usize,
    pub symbols: bool,
    pub strict: bool,
    pub generator_kind: GeneratorKind,
    pub domain_rule: Option<DomainRule>,
    pub separator: String,
    pub language: String,
}

/// Default length and whether it came from a valid environment value.
///
/// The fallback is `generate.length` from the config when positive, else 24.
pub fn default_length_from_env(env_value: Option<&str>, config_length: usize) -> (usize, bool) {
    let fallback = if config_length > 0 {
        config_length
    } else {
        DEFAULT_LENGTH
    };

    match env_value.map(|v| v.trim().parse::<i64>()) {
        Some(Ok(length)) if length >= 1 => match usize::try_from(length) {
            Ok(length) => (length, true),
            Err(_) => (fallback, false),
        },
        _ => (fallback, false),
    }
}

fn parse_length(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| Error::usage(format!("password length must be a number: {}", e)))
}

fn positive_length(length: i64) -> Result<usize> {
    if length < 1 {
        return Err(Error::usage("password length must not be zero"));
    }
    usize::try_from(length).map_err(|_| Error::usage("password length is too large"))
}

fn clamp_to_rule(rule: &DomainRule, length: i64) -> usize {
    if length < 1 {
        return rule.min_length;
    }
    usize::try_from(length)
        .map(|l| rule.clamp(l))
        .unwrap_or(rule.max_length)
}

/// Turns a request into a plan using rules, environment, config and prompts
pub struct Resolver<'a> {
    rules: &'a dyn RuleBook,
    config: &'a GenerateConfig,
    env_length: Option<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        rules: &'a dyn RuleBook,
        config: &'a GenerateConfig,
        env_length: Option<String>,
    ) -> Self {
        Self {
            rules,
            config,
            env_length,
        }
    }

    pub fn resolve(
        &self,
        ctx: &Context,
        request: &GenerationRequest,
        prompter: &mut dyn Prompter,
        out: &mut Output,
    ) -> Result<ResolvedPlan> {
        let symbols = request
            .symbols_requested
            .or(self.config.symbols)
            .unwrap_or(false);
        let strict = request.strict || request.generator_kind == GeneratorKind::Strict;
        let separator = request
            .separator
            .clone()
            .unwrap_or_else(|| DEFAULT_SEPARATOR.to_string());

        let mut plan = ResolvedPlan {
            length: 0,
            symbols,
            strict,
            generator_kind: request.generator_kind,
            domain_rule: None,
            separator,
            language: request.language.clone(),
        };

        // a field key or force mode never engages the rule path
        let rule = if request.force_overwrite || request.field_key.is_some() {
            None
        } else {
            rule_for_secret(self.rules, &request.target_name)
        };

        if let Some(rule) = rule {
            plan.length = self.rule_length(ctx, request, &rule, prompter, out)?;
            plan.domain_rule = Some(rule);
            return Ok(plan);
        }

        plan.length = match request.generator_kind {
            GeneratorKind::Xkcd => self.word_count(ctx, request, prompter)?,
            _ => self.char_length(ctx, request, prompter)?,
        };

        tracing::debug!(
            length = plan.length,
            symbols = plan.symbols,
            strict = plan.strict,
            kind = ?plan.generator_kind,
            "resolved generation plan"
        );
        Ok(plan)
    }

    fn rule_length(
        &self,
        ctx: &Context,
        request: &GenerationRequest,
        rule: &DomainRule,
        prompter: &mut dyn Prompter,
        out: &mut Output,
    ) -> Result<usize> {
        out.notice(&format!("Using password rules for {} ...", rule.domain))?;

        let suggestion = match request.raw_length.as_deref() {
            Some(raw) => clamp_to_rule(rule, parse_length(raw)?),
            None => rule.clamp(DEFAULT_RULE_LENGTH),
        };

        let question = format!(
            "How long should the password be? (min: {}, max: {})",
            rule.min_length, rule.max_length
        );
        let answer = prompter
            .ask_int(ctx, &question, suggestion as i64)
            .map_err(|e| match e {
                Error::Aborted(_) => e,
                other => Error::usage(format!("password length must be a number: {}", other)),
            })?;

        Ok(clamp_to_rule(rule, answer))
    }

    fn char_length(
        &self,
        ctx: &Context,
        request: &GenerationRequest,
        prompter: &mut dyn Prompter,
    ) -> Result<usize> {
        if let Some(raw) = request.raw_length.as_deref() {
            return positive_length(parse_length(raw)?);
        }

        let (candidate, from_env) =
            default_length_from_env(self.env_length.as_deref(), self.config.length);
        if from_env {
            return Ok(candidate);
        }

        let answer = self.ask_length(
            ctx,
            prompter,
            "How long should the password be?",
            candidate,
        )?;
        positive_length(answer)
    }

    fn word_count(
        &self,
        ctx: &Context,
        request: &GenerationRequest,
        prompter: &mut dyn Prompter,
    ) -> Result<usize> {
        if let Some(raw) = request.raw_length.as_deref() {
            return positive_length(parse_length(raw)?);
        }

        let answer = self.ask_length(
            ctx,
            prompter,
            "How many words should be combined to a password?",
            DEFAULT_XKCD_LENGTH,
        )?;
        positive_length(answer)
    }

    fn ask_length(
        &self,
        ctx: &Context,
        prompter: &mut dyn Prompter,
        question: &str,
        default: usize,
    ) -> Result<i64> {
        prompter
            .ask_int(ctx, question, default as i64)
            .map_err(|e| match e {
                Error::Aborted(_) => e,
                other => Error::usage(format!("password length must be a number: {}", other)),
            })
    }
}
