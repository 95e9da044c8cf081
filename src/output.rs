use std::io::{self, Write};

use crate::error::Result;

/// User-facing messages. Diagnostics go through `tracing` instead.
pub struct Output {
    writer: Box<dyn Write>,
}

impl Output {
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn ok(&mut self, message: &str) -> Result<()> {
        writeln!(self.writer, "✔ {}", message)?;
        Ok(())
    }

    pub fn notice(&mut self, message: &str) -> Result<()> {
        writeln!(self.writer, "⚠ {}", message)?;
        Ok(())
    }

    pub fn print(&mut self, message: &str) -> Result<()> {
        writeln!(self.writer, "{}", message)?;
        Ok(())
    }

    /// Print a secret value, surrounded by the given text
    pub fn secret(&mut self, intro: &str, secret: &str) -> Result<()> {
        writeln!(self.writer, "{}\n\n{}\n", intro, secret)?;
        self.writer.flush()?;
        Ok(())
    }
}
