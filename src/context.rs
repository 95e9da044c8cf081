use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Per-invocation flags threaded through every prompt, store call and
/// generator invocation.
#[derive(Clone, Debug)]
pub struct Context {
    /// Skip overwrite confirmations and bypass domain rules
    pub force: bool,
    /// Answer every confirmation with yes and every question with its default
    pub always_yes: bool,
    /// Whether prompts may block on the terminal
    pub interactive: bool,
    /// Whether stdout is attached to a terminal
    pub terminal: bool,
    /// Copy the generated password to the clipboard
    pub clip: bool,
    /// Explicit `--print` value, `None` when the flag was not given
    pub print: Option<bool>,
    cancel: CancellationToken,
}

impl Context {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            force: false,
            always_yes: false,
            interactive: true,
            terminal: false,
            clip: false,
            print: None,
            cancel,
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_always_yes(mut self, always_yes: bool) -> Self {
        self.always_yes = always_yes;
        self
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn with_terminal(mut self, terminal: bool) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn with_clip(mut self, clip: bool) -> Self {
        self.clip = clip;
        self
    }

    pub fn with_print(mut self, print: Option<bool>) -> Self {
        self.print = print;
        self
    }

    /// Fails with an aborted error once the invocation has been cancelled.
    pub fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Aborted("operation cancelled".to_string()));
        }
        Ok(())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(CancellationToken::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_is_shared() {
        let token = CancellationToken::new();
        let ctx = Context::new(token.clone());
        assert!(ctx.check_cancelled().is_ok());

        token.cancel();
        assert!(matches!(ctx.check_cancelled(), Err(Error::Aborted(_))));
    }

    #[test]
    fn test_builder_flags() {
        let ctx = Context::default()
            .with_force(true)
            .with_interactive(false)
            .with_print(Some(false));

        assert!(ctx.force);
        assert!(!ctx.interactive);
        assert_eq!(ctx.print, Some(false));
        assert!(!ctx.clip);
    }
}
