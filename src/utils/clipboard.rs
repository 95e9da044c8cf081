use arboard::Clipboard;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Destination for generated passwords that should not be printed
pub trait ClipboardSink {
    /// Copy `text` for secret `name` and clear it after `timeout_seconds`
    fn copy_with_timeout(&mut self, name: &str, text: &str, timeout_seconds: u64) -> Result<()>;
}

/// System clipboard with auto-clear timeout
pub struct SecureClipboard {
    clipboard: Option<Clipboard>,
}

impl SecureClipboard {
    /// The system clipboard is opened lazily on first copy so that commands
    /// which never copy work in headless environments.
    pub fn new() -> Self {
        Self { clipboard: None }
    }

    fn clipboard(&mut self) -> Result<&mut Clipboard> {
        if self.clipboard.is_none() {
            let clipboard = Clipboard::new().map_err(|e| {
                Error::ClipboardError(format!("Failed to initialize clipboard: {}", e))
            })?;
            self.clipboard = Some(clipboard);
        }
        self.clipboard
            .as_mut()
            .ok_or_else(|| Error::ClipboardError("clipboard unavailable".to_string()))
    }

    /// Spawn a detached process that clears the clipboard after a delay.
    ///
    /// Background threads die with the main process, hence the separate process.
    fn spawn_clear_process(timeout_seconds: u64) {
        #[cfg(target_os = "macos")]
        {
            let _ = Command::new("sh")
                .arg("-c")
                .arg(format!("sleep {} && printf '' | pbcopy", timeout_seconds))
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn();
        }

        #[cfg(target_os = "linux")]
        {
            let _ = Command::new("sh")
                .arg("-c")
                .arg(format!(
                    "sleep {} && printf '' | xclip -selection clipboard 2>/dev/null || printf '' | xsel --clipboard 2>/dev/null",
                    timeout_seconds
                ))
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn();
        }
    }
}

impl Default for SecureClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardSink for SecureClipboard {
    fn copy_with_timeout(&mut self, name: &str, text: &str, timeout_seconds: u64) -> Result<()> {
        self.clipboard()?
            .set_text(text)
            .map_err(|e| Error::ClipboardError(format!("Failed to copy to clipboard: {}", e)))?;

        tracing::debug!(secret = name, timeout_seconds, "copied to clipboard");

        if timeout_seconds > 0 {
            Self::spawn_clear_process(timeout_seconds);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clipboard_creation_is_lazy() {
        let clipboard = SecureClipboard::new();
        assert!(clipboard.clipboard.is_none());
    }

    #[test]
    fn test_copy_to_clipboard() {
        let mut clipboard = SecureClipboard::new();
        let result = clipboard.copy_with_timeout("test", "test", 0);

        // May fail in headless environments, but should not panic
        if result.is_ok() {
            if let Ok(mut cb) = Clipboard::new() {
                if let Ok(text) = cb.get_text() {
                    assert_eq!(text, "test");
                }
            }
        }
    }
}
