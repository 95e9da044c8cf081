use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::context::{CancellationToken, Context};
use crate::crypto::RandomGenerators;
use crate::error::{Error, Result};
use crate::generate::resolver::LENGTH_ENV;
use crate::generate::{ExternalEditor, GenerateAction, GenerateArgs};
use crate::models::PASSWORD_KEY;
use crate::output::Output;
use crate::prompt::TerminalPrompter;
use crate::rules::StaticRuleBook;
use crate::storage::{Store, VaultStore};
use crate::templates::TemplateSet;
use crate::utils::clipboard::{ClipboardSink, SecureClipboard};
use crate::utils::SecureString;

/// Environment variable consulted before prompting for the master password
pub const MASTER_PASSWORD_ENV: &str = "GENSECRET_MASTER_PASSWORD";

/// Execute a CLI command
pub fn execute_command(cli: Cli) -> Result<()> {
    // Expand tilde in vault and config paths
    let vault_path = PathBuf::from(shellexpand::tilde(&cli.vault).to_string());
    let config_path = PathBuf::from(shellexpand::tilde(&cli.config).to_string());

    let config = Config::load(&config_path)?;
    let ctx = Context::new(CancellationToken::new())
        .with_always_yes(cli.yes)
        .with_interactive(!cli.no_interactive)
        .with_terminal(std::io::stdout().is_terminal());

    match cli.command {
        Commands::Init => init_vault(&vault_path),
        Commands::Generate {
            args,
            clip,
            print,
            force,
            edit,
            generator,
            symbols,
            strict,
            sep,
            lang,
        } => {
            let ctx = ctx.with_force(force).with_clip(clip).with_print(print);
            let args = GenerateArgs {
                args,
                generator,
                symbols,
                strict,
                separator: sep,
                language: lang,
                edit,
            };
            generate(&ctx, &vault_path, &config, &args)
        }
        Commands::Show { name, key, clip } => {
            show_secret(&ctx, &vault_path, &config, &name, key.as_deref(), clip)
        }
        Commands::List { depth } => list_secrets(&ctx, &vault_path, depth),
        Commands::CompleteGenerate { needle } => {
            complete_generate(&ctx, &vault_path, &config, &needle)
        }
    }
}

/// Prompt for master password securely
fn prompt_master_password(prompt: &str) -> Result<SecureString> {
    if let Ok(password) = std::env::var(MASTER_PASSWORD_ENV) {
        return Ok(SecureString::from_string(password));
    }

    let password = rpassword::prompt_password(prompt)
        .map_err(|e| Error::Unknown(format!("Failed to read password: {}", e)))?;
    Ok(SecureString::from_string(password))
}

/// Initialize a new vault
fn init_vault(vault_path: &Path) -> Result<()> {
    if VaultStore::new(vault_path, SecureString::from(""))?.is_initialized() {
        return Err(Error::VaultAlreadyExists(vault_path.display().to_string()));
    }

    println!("Initializing new vault at {}", vault_path.display());
    let password = prompt_master_password("Enter master password: ")?;
    if std::env::var(MASTER_PASSWORD_ENV).is_err() {
        let confirm = prompt_master_password("Confirm master password: ")?;
        if password.as_bytes() != confirm.as_bytes() {
            return Err(Error::usage("Passwords do not match"));
        }
    }

    VaultStore::new(vault_path, password)?.init()?;
    println!("Vault initialized successfully!");

    Ok(())
}

/// Open an existing vault and verify the master password
fn open_vault(vault_path: &Path) -> Result<VaultStore> {
    let password = prompt_master_password("Enter master password: ")?;
    let store = VaultStore::new(vault_path, password)?;
    store.unlock()?;
    Ok(store)
}

fn generate(
    ctx: &Context,
    vault_path: &Path,
    config: &Config,
    args: &GenerateArgs,
) -> Result<()> {
    let mut store = open_vault(vault_path)?;

    let rules = StaticRuleBook::from_config(&config.rules);
    let templates = TemplateSet::new(config.templates.clone());
    let generators =
        RandomGenerators::new().with_external_command(config.generate.external.clone());
    let mut prompter = TerminalPrompter::stdio();
    let mut clipboard = SecureClipboard::new();
    let mut editor = ExternalEditor::from_env();
    let mut out = Output::stdout();

    let mut action = GenerateAction {
        store: &mut store,
        rules: &rules,
        templates: &templates,
        generators: &generators,
        prompter: &mut prompter,
        clipboard: &mut clipboard,
        editor: &mut editor,
        config,
        env_length: std::env::var(LENGTH_ENV).ok(),
        out: &mut out,
    };

    action.generate(ctx, args).map(|_| ())
}

/// Show a secret, or a single field of it
fn show_secret(
    ctx: &Context,
    vault_path: &Path,
    config: &Config,
    name: &str,
    key: Option<&str>,
    clip: bool,
) -> Result<()> {
    let store = open_vault(vault_path)?;
    let record = store.get(ctx, name)?;

    let value = match key {
        None | Some(PASSWORD_KEY) => record
            .password()
            .as_str()
            .map_err(|_| Error::Unknown("Password contains invalid UTF-8".to_string()))?
            .to_string(),
        Some(key) => record
            .get(key)
            .map(str::to_string)
            .ok_or_else(|| Error::SecretNotFound(format!("{} {}", name, key)))?,
    };

    if clip {
        SecureClipboard::new().copy_with_timeout(name, &value, config.core.cliptimeout)?;
        println!(
            "Copied to clipboard (will clear in {} seconds)",
            config.core.cliptimeout
        );
        return Ok(());
    }

    if key.is_some() {
        println!("{}", value);
        return Ok(());
    }

    let text = record
        .to_text()
        .map_err(|_| Error::Unknown("Secret contains invalid UTF-8".to_string()))?;
    print!("{}", text);

    Ok(())
}

/// List all secret names
fn list_secrets(ctx: &Context, vault_path: &Path, depth: Option<usize>) -> Result<()> {
    // names are stored in the clear, no master password needed
    let store = VaultStore::new(vault_path, SecureString::from(""))?;
    let names = store.list(ctx, depth)?;

    if names.is_empty() {
        println!("No secrets found.");
        return Ok(());
    }

    for name in names {
        println!("{}", name);
    }

    Ok(())
}

fn complete_generate(
    ctx: &Context,
    vault_path: &Path,
    config: &Config,
    needle: &str,
) -> Result<()> {
    let mut store = VaultStore::new(vault_path, SecureString::from(""))?;

    let rules = StaticRuleBook::new();
    let templates = TemplateSet::default();
    let generators = RandomGenerators::new();
    let mut prompter = TerminalPrompter::stdio();
    let mut clipboard = SecureClipboard::new();
    let mut editor = ExternalEditor::from_env();
    let mut out = Output::stdout();

    GenerateAction {
        store: &mut store,
        rules: &rules,
        templates: &templates,
        generators: &generators,
        prompter: &mut prompter,
        clipboard: &mut clipboard,
        editor: &mut editor,
        config,
        env_length: None,
        out: &mut out,
    }
    .complete(ctx, needle)
}
