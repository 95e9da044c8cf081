use std::fs;
use std::io::Write;
use std::process::Command;

use tempfile::NamedTempFile;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::models::parse_like;
use crate::storage::Store;

pub const ANNOTATION_EDITED: &str = "Edited with editor";

const DEFAULT_EDITOR: &str = "vi";

/// Lets the user change the text of a secret
pub trait Editor {
    /// Returns the edited text, or `None` if the edit was abandoned
    fn edit(&mut self, ctx: &Context, name: &str, content: &str) -> Result<Option<String>>;
}

/// Opens `$EDITOR` on a private temporary file
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("EDITOR").unwrap_or_else(|_| DEFAULT_EDITOR.to_string()))
    }
}

impl Editor for ExternalEditor {
    fn edit(&mut self, ctx: &Context, name: &str, content: &str) -> Result<Option<String>> {
        ctx.check_cancelled()?;

        let mut file = NamedTempFile::new()?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| Error::Unknown("no editor configured".to_string()))?;

        tracing::debug!(program, secret = name, "launching editor");
        let status = Command::new(program)
            .args(parts)
            .arg(file.path())
            .status()
            .map_err(|e| Error::Unknown(format!("failed to launch editor: {}", e)))?;

        if !status.success() {
            return Ok(None);
        }

        Ok(Some(fs::read_to_string(file.path())?))
    }
}

/// Open the stored secret in `editor` and write back the changed text.
///
/// Returns whether a new revision was stored.
pub fn edit_secret(
    ctx: &Context,
    store: &mut dyn Store,
    editor: &mut dyn Editor,
    name: &str,
) -> Result<bool> {
    let fail = |e: Error| Error::Unknown(format!("failed to edit {:?}: {}", name, e));

    let record = store.get(ctx, name).map_err(fail)?;
    let original = record
        .to_text()
        .map_err(|e| fail(Error::Unknown(e.to_string())))?;

    let edited = match editor.edit(ctx, name, &original).map_err(fail)? {
        Some(text) if text != original => text,
        _ => {
            tracing::debug!(secret = name, "secret unchanged");
            return Ok(false);
        }
    };

    let updated = parse_like(&record, &edited).map_err(fail)?;
    store
        .set(ctx, name, updated, ANNOTATION_EDITED)
        .map_err(fail)?;
    Ok(true)
}
