pub mod commands;

use clap::{ArgAction, Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;
use crate::generate::GeneratorKind;

#[derive(Parser)]
#[command(name = "gensecret")]
#[command(about = "Generate and store passwords in an encrypted vault", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the vault directory
    #[arg(long, global = true, env = "GENSECRET_VAULT", default_value = "~/.gensecret")]
    pub vault: String,

    /// Path to the config file
    #[arg(long, global = true, env = "GENSECRET_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// More diagnostics on stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Answer yes to every question
    #[arg(long, global = true)]
    pub yes: bool,

    /// Never prompt, use defaults instead
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new vault
    Init,

    /// Generate a new password
    Generate {
        /// `name [key] [length]` followed by optional `key=value` fields
        #[arg(value_name = "ARGS")]
        args: Vec<String>,

        /// Copy the password to the clipboard
        #[arg(short, long)]
        clip: bool,

        /// Print the password to the terminal
        #[arg(short, long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
        print: Option<bool>,

        /// Overwrite without asking and ignore password rules
        #[arg(short, long)]
        force: bool,

        /// Open an editor after generating
        #[arg(short, long)]
        edit: bool,

        /// Generator to use
        #[arg(short, long, value_enum, default_value_t = GeneratorKind::Default)]
        generator: GeneratorKind,

        /// Include symbols
        #[arg(short, long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
        symbols: Option<bool>,

        /// Require every character class
        #[arg(long)]
        strict: bool,

        /// Word separator for the xkcd generator
        #[arg(long)]
        sep: Option<String>,

        /// Word list language for the xkcd generator
        #[arg(long, default_value = "en")]
        lang: String,
    },

    /// Show a secret
    Show {
        /// Name of the secret
        name: String,

        /// Show only this field
        key: Option<String>,

        /// Copy the password to the clipboard instead of printing
        #[arg(short, long)]
        clip: bool,
    },

    /// List all secrets
    List {
        /// Maximum directory depth
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Shell completion for the name argument of `generate`
    #[command(hide = true)]
    CompleteGenerate {
        /// Partial name
        #[arg(default_value = "")]
        needle: String,
    },
}
