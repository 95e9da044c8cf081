use std::collections::BTreeMap;
use std::sync::OnceLock;

use clap::ValueEnum;
use regex::Regex;

/// Field name to value pairs given as `key=value` tokens
pub type Metadata = BTreeMap<String, String>;

/// Password generation strategy requested by the user
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum GeneratorKind {
    /// Random characters
    #[default]
    Default,
    /// Random characters, every character class present
    Strict,
    /// Pronounceable syllables
    Memorable,
    /// Dictionary words joined by a separator
    Xkcd,
    /// Delegate to an external program
    External,
}

/// One invocation's worth of user intent
#[derive(Clone, Debug, Default)]
pub struct GenerationRequest {
    pub target_name: String,
    pub field_key: Option<String>,
    pub raw_length: Option<String>,
    pub generator_kind: GeneratorKind,
    pub symbols_requested: Option<bool>,
    pub force_overwrite: bool,
    pub strict: bool,
    pub separator: Option<String>,
    pub language: String,
}

/// Positional tokens split from `key=value` metadata tokens
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub positionals: Vec<String>,
    pub metadata: Metadata,
}

pub(crate) fn is_number(s: &str) -> bool {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER
        .get_or_init(|| Regex::new(r"^\d+$").expect("number pattern compiles"))
        .is_match(s)
}

/// Split raw arguments. Tokens containing `=` are metadata; a later
/// duplicate key overwrites an earlier one.
pub fn parse_args<S: AsRef<str>>(args: &[S]) -> ParsedArgs {
    let mut parsed = ParsedArgs::default();
    for arg in args {
        let arg = arg.as_ref();
        match arg.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                parsed.metadata.insert(key.to_string(), value.to_string());
            }
            _ => parsed.positionals.push(arg.to_string()),
        }
    }
    parsed
}

/// Field key and raw length from `name [key] [length]`.
///
/// With a single token after the name, a purely numeric token is the length
/// and anything else is the key.
pub fn key_and_length(positionals: &[String]) -> (Option<String>, Option<String>) {
    let mut key = positionals.get(1).filter(|s| !s.is_empty()).cloned();
    let mut length = positionals.get(2).filter(|s| !s.is_empty()).cloned();

    if length.is_none() {
        if let Some(k) = key.as_deref() {
            if is_number(k) {
                length = key.take();
            }
        }
    }

    (key, length)
}
