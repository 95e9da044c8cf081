use crate::context::Context;
use crate::error::{Error, Result};
use crate::generate::request::Metadata;
use crate::models::{parse_structured, SecretRecord};
use crate::rules::{change_url_for_secret, RuleBook};
use crate::storage::Store;
use crate::templates::TemplateRenderer;
use crate::utils::SecureString;

pub const ANNOTATION_FIELD: &str = "Generated password for key";
pub const ANNOTATION_REPLACED: &str = "Generated password for YAML key";
pub const ANNOTATION_CREATED: &str = "Generated Password";

/// Field holding the page where the site's password can be changed
pub const CHANGE_URL_FIELD: &str = "password-change-url";

/// Which branch of the write path was taken
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationOutcome {
    /// A single field of an existing record was set
    FieldSet,
    /// The password of an existing record was replaced
    Replaced,
    /// A new record was written. `recovered` holds the error that made the
    /// replacement of an existing record fall back to this branch.
    Created { recovered: Option<String> },
}

/// Store a freshly generated password for one secret
pub struct SecretMutation<'a> {
    pub name: &'a str,
    pub field_key: Option<&'a str>,
    pub password: &'a str,
    pub metadata: &'a Metadata,
}

impl<'a> SecretMutation<'a> {
    pub fn apply(
        &self,
        ctx: &Context,
        store: &mut dyn Store,
        rules: &dyn RuleBook,
        templates: &dyn TemplateRenderer,
    ) -> Result<MutationOutcome> {
        if let Some(key) = self.field_key.filter(|k| !k.is_empty()) {
            self.set_field(ctx, store, key)?;
            return Ok(MutationOutcome::FieldSet);
        }

        let mut recovered = None;
        if store.exists(ctx, self.name) {
            match self.replace_password(ctx, store) {
                Ok(()) => return Ok(MutationOutcome::Replaced),
                Err(e) => {
                    ctx.check_cancelled()?;
                    tracing::warn!(
                        secret = self.name,
                        error = %e,
                        "failed to update existing secret, creating a new one"
                    );
                    recovered = Some(e.to_string());
                }
            }
        }

        self.create(ctx, store, rules, templates)?;
        Ok(MutationOutcome::Created { recovered })
    }

    fn set_field(&self, ctx: &Context, store: &mut dyn Store, key: &str) -> Result<()> {
        let fail = |e: Error| {
            Error::storage(
                self.name,
                format!("failed to set key {:?} of {:?}: {}", key, self.name, e),
            )
        };

        let mut record = store.get(ctx, self.name).map_err(fail)?;
        self.apply_metadata(&mut record);
        record.set(key, self.password).map_err(fail)?;
        store
            .set(ctx, self.name, record, ANNOTATION_FIELD)
            .map_err(fail)
    }

    fn replace_password(&self, ctx: &Context, store: &mut dyn Store) -> Result<()> {
        let mut record = store.get(ctx, self.name)?;
        self.apply_metadata(&mut record);
        record.set_password(SecureString::from(self.password));
        store.set(ctx, self.name, record, ANNOTATION_REPLACED)
    }

    fn create(
        &self,
        ctx: &Context,
        store: &mut dyn Store,
        rules: &dyn RuleBook,
        templates: &dyn TemplateRenderer,
    ) -> Result<()> {
        let mut record = self.base_record(rules, templates);
        self.apply_metadata(&mut record);
        record.set_password(SecureString::from(self.password));

        store
            .set(ctx, self.name, record, ANNOTATION_CREATED)
            .map_err(|e| {
                Error::storage(
                    self.name,
                    format!("failed to create {:?}: {}", self.name, e),
                )
            })
    }

    /// Flat record with the change URL, or the rendered template when one applies
    fn base_record(&self, rules: &dyn RuleBook, templates: &dyn TemplateRenderer) -> SecretRecord {
        let mut record = SecretRecord::new();
        record.set_password(SecureString::from(self.password));

        if let Some(url) = change_url_for_secret(rules, self.name) {
            if let Err(e) = record.set(CHANGE_URL_FIELD, &url) {
                tracing::debug!(secret = self.name, error = %e, "failed to set change url");
            }
        }

        let rendered = templates
            .render(self.name, self.password.as_bytes())
            .and_then(|content| content.map(|c| parse_structured(&c)).transpose());

        match rendered {
            Ok(Some(structured)) => {
                tracing::debug!(secret = self.name, "applied template");
                structured
            }
            Ok(None) => record,
            Err(e) => {
                tracing::debug!(secret = self.name, error = %e, "failed to apply template");
                record
            }
        }
    }

    fn apply_metadata(&self, record: &mut SecretRecord) {
        for (key, value) in self.metadata {
            if let Err(e) = record.set(key, value) {
                tracing::debug!(secret = self.name, field = key.as_str(), error = %e, "skipping metadata");
            }
        }
    }
}
