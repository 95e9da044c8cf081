//! The `generate` workflow: name and overwrite checks, length resolution,
//! password generation, reporting, storage and the optional edit step.

pub mod complete;
pub mod dispatch;
pub mod edit;
pub mod mutation;
pub mod request;
pub mod resolver;

pub use dispatch::dispatch;
pub use edit::{edit_secret, Editor, ExternalEditor};
pub use mutation::{MutationOutcome, SecretMutation};
pub use request::{key_and_length, parse_args, GenerationRequest, GeneratorKind, Metadata};
pub use resolver::{ResolvedPlan, Resolver};

use crate::config::Config;
use crate::context::Context;
use crate::crypto::Generators;
use crate::error::{Error, Result};
use crate::output::Output;
use crate::prompt::Prompter;
use crate::rules::RuleBook;
use crate::storage::Store;
use crate::templates::TemplateRenderer;
use crate::utils::clipboard::ClipboardSink;

/// Raw `generate` invocation as received from the command line
#[derive(Clone, Debug, Default)]
pub struct GenerateArgs {
    /// `name [key] [length]` plus any `key=value` tokens
    pub args: Vec<String>,
    pub generator: GeneratorKind,
    pub symbols: Option<bool>,
    pub strict: bool,
    pub separator: Option<String>,
    pub language: String,
    pub edit: bool,
}

/// Collaborators of one `generate` or `complete-generate` run
pub struct GenerateAction<'a> {
    pub store: &'a mut dyn Store,
    pub rules: &'a dyn RuleBook,
    pub templates: &'a dyn TemplateRenderer,
    pub generators: &'a dyn Generators,
    pub prompter: &'a mut dyn Prompter,
    pub clipboard: &'a mut dyn ClipboardSink,
    pub editor: &'a mut dyn Editor,
    pub config: &'a Config,
    /// Value of `GENSECRET_PW_DEFAULT_LENGTH`
    pub env_length: Option<String>,
    pub out: &'a mut Output,
}

impl<'a> GenerateAction<'a> {
    /// Generate a password and store it
    pub fn generate(&mut self, ctx: &Context, args: &GenerateArgs) -> Result<MutationOutcome> {
        let parsed = parse_args(&args.args);
        let (key, length) = key_and_length(&parsed.positionals);

        let name = match parsed.positionals.first().filter(|n| !n.is_empty()) {
            Some(name) => name.clone(),
            None => self.ask_name(ctx)?,
        };

        if !ctx.force && key.is_none() && self.store.exists(ctx, &name) {
            let question = format!(
                "An entry already exists for {}. Overwrite the current password?",
                name
            );
            if !self.confirm(ctx, &question) {
                return Err(Error::Aborted(
                    "user aborted. not overwriting your current password".to_string(),
                ));
            }
        }

        let request = GenerationRequest {
            target_name: name.clone(),
            field_key: key.clone(),
            raw_length: length,
            generator_kind: args.generator,
            symbols_requested: args.symbols,
            force_overwrite: ctx.force,
            strict: args.strict,
            separator: args.separator.clone(),
            language: args.language.clone(),
        };

        let plan = Resolver::new(self.rules, &self.config.generate, self.env_length.clone())
            .resolve(ctx, &request, &mut *self.prompter, &mut *self.out)?;
        let password = dispatch(ctx, &plan, self.generators, &name)?;

        self.copy_or_print(ctx, &name, key.as_deref(), &password)?;

        let outcome = SecretMutation {
            name: &name,
            field_key: key.as_deref(),
            password: &password,
            metadata: &parsed.metadata,
        }
        .apply(ctx, &mut *self.store, self.rules, self.templates)?;

        if let MutationOutcome::Created {
            recovered: Some(_),
        } = &outcome
        {
            self.out
                .notice("Failed to read existing secret. Creating anew.")?;
        }
        tracing::info!(secret = name.as_str(), outcome = ?outcome, "stored generated password");

        if args.edit {
            let question = format!("Do you want to add more data for {}?", name);
            if self.confirm(ctx, &question) {
                edit_secret(ctx, &mut *self.store, &mut *self.editor, &name)?;
            }
        }

        Ok(outcome)
    }

    /// Print completion candidates for `needle`, one shell-escaped word per line
    pub fn complete(&mut self, ctx: &Context, needle: &str) -> Result<()> {
        let names = match self.store.list(ctx, None) {
            Ok(names) => names,
            Err(e) => {
                tracing::debug!(error = %e, "failed to list secrets for completion");
                return Ok(());
            }
        };

        for suggestion in complete::suggest(&names, needle) {
            self.out.print(&complete::bash_escape(&suggestion))?;
        }
        Ok(())
    }

    fn ask_name(&mut self, ctx: &Context) -> Result<String> {
        match self
            .prompter
            .ask_string(ctx, "Which name do you want to use?", "")
        {
            Ok(name) if !name.trim().is_empty() => Ok(name.trim().to_string()),
            Ok(_) => Err(Error::NoName("please provide a password name".to_string())),
            Err(e) => {
                tracing::debug!(error = %e, "no name given");
                Err(Error::NoName("please provide a password name".to_string()))
            }
        }
    }

    /// A failed prompt counts as a "no"
    fn confirm(&mut self, ctx: &Context, question: &str) -> bool {
        self.prompter
            .ask_confirmation(ctx, question)
            .unwrap_or_else(|e| {
                tracing::debug!(error = %e, "confirmation failed");
                false
            })
    }

    fn copy_or_print(
        &mut self,
        ctx: &Context,
        name: &str,
        key: Option<&str>,
        password: &str,
    ) -> Result<()> {
        let entry = match key {
            Some(key) => format!("{} {}", name, key),
            None => name.to_string(),
        };
        self.out
            .ok(&format!("Password for entry {:?} generated", entry))?;

        let core = &self.config.core;
        let print = ctx.print.unwrap_or(false);

        if ctx.clip || (core.autoclip && ctx.terminal) {
            self.clipboard
                .copy_with_timeout(name, password, core.cliptimeout)
                .map_err(|e| match e {
                    Error::ClipboardError(_) => e,
                    other => Error::ClipboardError(other.to_string()),
                })?;

            if core.autoclip && !print {
                self.out.print("Copied to clipboard")?;
                return Ok(());
            }
        }

        if ctx.print == Some(false) && core.showsafecontent {
            tracing::debug!("safecontent suppressing printing");
            return Ok(());
        }

        if !print {
            self.out.print(&format!(
                "Not printing secrets by default. Use 'gensecret show {}' to display the password.",
                entry
            ))?;
            return Ok(());
        }

        self.out.secret("⚠ The generated password is:", password)
    }
}
