use std::process::{Command, Stdio};
use std::sync::OnceLock;

use rand::seq::{index, SliceRandom};
use rand::Rng;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::rules::DomainRule;

pub const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";
pub const NUMBERS: &[u8] = b"0123456789";
pub const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const CONSONANTS: &[u8] = b"bcdfghjkmnprstvwz";
const VOWELS: &[u8] = b"aeiou";

/// Environment variable naming an external generator command
pub const EXTERNAL_GENERATOR_ENV: &str = "GENSECRET_EXTERNAL_PWGEN";

/// Password-producing strategies used by the dispatcher.
pub trait Generators {
    /// Letters and digits, plus symbols when requested
    fn random(&self, length: usize, symbols: bool) -> Result<String>;
    /// Like `random`, but every enabled character class appears at least once
    fn random_strict(&self, length: usize, symbols: bool) -> Result<String>;
    /// Pronounceable syllables
    fn memorable(&self, length: usize, symbols: bool, strict: bool) -> Result<String>;
    /// `words` dictionary words joined by `separator`
    fn xkcd(&self, words: usize, separator: &str, language: &str) -> Result<String>;
    /// Delegate to an external program, `length` is a hint
    fn external(&self, ctx: &Context, length: usize) -> Result<String>;
    /// Generation constrained by a site's password rule
    fn for_domain(&self, length: usize, rule: &DomainRule) -> Result<String>;
}

/// Thread-rng backed implementation of all strategies
#[derive(Default)]
pub struct RandomGenerators {
    external_command: Option<String>,
    words: Option<Vec<String>>,
}

impl RandomGenerators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Command line used by `external`, e.g. `pwgen -s`
    pub fn with_external_command(mut self, command: Option<String>) -> Self {
        self.external_command = command.filter(|c| !c.trim().is_empty());
        self
    }

    /// Replace the embedded word list
    pub fn with_words(mut self, words: Vec<String>) -> Self {
        self.words = Some(words);
        self
    }

    fn word_list(&self, language: &str) -> Result<Vec<&str>> {
        if let Some(words) = &self.words {
            return Ok(words.iter().map(String::as_str).collect());
        }

        match language {
            "" | "en" => Ok(english_words().to_vec()),
            other => Err(Error::usage(format!(
                "unsupported language for word passwords: {}",
                other
            ))),
        }
    }
}

fn english_words() -> &'static [&'static str] {
    static WORDS: OnceLock<Vec<&'static str>> = OnceLock::new();
    WORDS
        .get_or_init(|| {
            include_str!("../../assets/wordlist_en.txt")
                .lines()
                .map(str::trim)
                .filter(|word| !word.is_empty())
                .collect()
        })
        .as_slice()
}

fn pick(rng: &mut impl Rng, charset: &[u8]) -> u8 {
    charset[rng.gen_range(0..charset.len())]
}

fn into_string(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| Error::Generation("generated invalid UTF-8".to_string()))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Generators for RandomGenerators {
    fn random(&self, length: usize, symbols: bool) -> Result<String> {
        let mut charset = Vec::new();
        charset.extend_from_slice(LOWERCASE);
        charset.extend_from_slice(UPPERCASE);
        charset.extend_from_slice(NUMBERS);
        if symbols {
            charset.extend_from_slice(SYMBOLS);
        }

        let mut rng = rand::thread_rng();
        into_string((0..length).map(|_| pick(&mut rng, &charset)).collect())
    }

    fn random_strict(&self, length: usize, symbols: bool) -> Result<String> {
        let mut classes: Vec<&[u8]> = vec![LOWERCASE, UPPERCASE, NUMBERS];
        if symbols {
            classes.push(SYMBOLS);
        }

        if length < classes.len() {
            return Err(Error::Generation(format!(
                "a strict password needs at least {} characters",
                classes.len()
            )));
        }

        let charset: Vec<u8> = classes.concat();
        let mut rng = rand::thread_rng();

        let mut password: Vec<u8> = classes.iter().map(|class| pick(&mut rng, class)).collect();
        password.extend((classes.len()..length).map(|_| pick(&mut rng, &charset)));
        password.shuffle(&mut rng);

        into_string(password)
    }

    fn memorable(&self, length: usize, symbols: bool, strict: bool) -> Result<String> {
        let mut rng = rand::thread_rng();

        let mut password = Vec::with_capacity(length);
        while password.len() < length {
            password.push(pick(&mut rng, CONSONANTS));
            if password.len() < length {
                password.push(pick(&mut rng, VOWELS));
            }
        }

        // one character per class, injected at distinct positions
        let mut injections: Vec<&[u8]> = Vec::new();
        if strict {
            injections.push(UPPERCASE);
            injections.push(NUMBERS);
        }
        if symbols {
            injections.push(SYMBOLS);
        }

        if injections.len() > length {
            return Err(Error::Generation(format!(
                "a memorable password with these options needs at least {} characters",
                injections.len()
            )));
        }

        if !strict && length > 0 {
            password[0] = password[0].to_ascii_uppercase();
        }

        let positions = index::sample(&mut rng, length, injections.len());
        for (pos, charset) in positions.iter().zip(injections) {
            password[pos] = if charset == UPPERCASE {
                password[pos].to_ascii_uppercase()
            } else {
                pick(&mut rng, charset)
            };
        }

        into_string(password)
    }

    fn xkcd(&self, words: usize, separator: &str, language: &str) -> Result<String> {
        let list = self.word_list(language)?;
        if list.is_empty() {
            return Err(Error::Generation("word list is empty".to_string()));
        }

        let mut rng = rand::thread_rng();
        let chosen: Vec<String> = (0..words)
            .map(|_| capitalize(list[rng.gen_range(0..list.len())]))
            .collect();

        Ok(chosen.join(separator))
    }

    fn external(&self, ctx: &Context, length: usize) -> Result<String> {
        ctx.check_cancelled()?;

        let command = self
            .external_command
            .clone()
            .or_else(|| std::env::var(EXTERNAL_GENERATOR_ENV).ok())
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                Error::Generation(format!(
                    "no external generator configured (set generate.external or {})",
                    EXTERNAL_GENERATOR_ENV
                ))
            })?;

        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| Error::Generation("external generator command is empty".to_string()))?;

        tracing::debug!(program, length, "running external generator");

        let output = Command::new(program)
            .args(parts)
            .arg(length.to_string())
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| Error::Generation(format!("failed to run {}: {}", program, e)))?;

        if !output.status.success() {
            return Err(Error::Generation(format!(
                "external generator {} exited with {}",
                program, output.status
            )));
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| {
            Error::Generation("external generator produced invalid UTF-8".to_string())
        })?;
        Ok(stdout.trim().to_string())
    }

    fn for_domain(&self, length: usize, rule: &DomainRule) -> Result<String> {
        // rules may allow passwords shorter than the class count
        let class_count = if rule.symbols { 4 } else { 3 };
        if length < class_count {
            return self.random(length, rule.symbols);
        }
        self.random_strict(length, rule.symbols)
    }
}
