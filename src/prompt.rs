use std::io::{self, BufRead, Write};

use crate::context::Context;
use crate::error::{Error, Result};

/// Interactive questions asked during generation
pub trait Prompter {
    fn ask_string(&mut self, ctx: &Context, prompt: &str, default: &str) -> Result<String>;
    fn ask_int(&mut self, ctx: &Context, prompt: &str, default: i64) -> Result<i64>;
    fn ask_confirmation(&mut self, ctx: &Context, prompt: &str) -> Result<bool>;
}

/// Line-based prompter. Questions go to `output`, answers are read from `input`.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    fn read_answer(&mut self, ctx: &Context, question: &str) -> Result<String> {
        ctx.check_cancelled()?;

        write!(self.output, "{} ", question)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if read == 0 {
            return Err(Error::Aborted("no answer given".to_string()));
        }

        ctx.check_cancelled()?;
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn ask_string(&mut self, ctx: &Context, prompt: &str, default: &str) -> Result<String> {
        if ctx.always_yes || !ctx.interactive {
            return Ok(default.to_string());
        }

        let answer = self.read_answer(ctx, &format!("{} [{}]:", prompt, default))?;
        if answer.is_empty() {
            return Ok(default.to_string());
        }
        Ok(answer)
    }

    fn ask_int(&mut self, ctx: &Context, prompt: &str, default: i64) -> Result<i64> {
        if ctx.always_yes || !ctx.interactive {
            return Ok(default);
        }

        let answer = self.read_answer(ctx, &format!("{} [{}]:", prompt, default))?;
        if answer.is_empty() {
            return Ok(default);
        }
        answer
            .parse::<i64>()
            .map_err(|e| Error::usage(format!("not a number: {}", e)))
    }

    fn ask_confirmation(&mut self, ctx: &Context, prompt: &str) -> Result<bool> {
        if ctx.always_yes {
            return Ok(true);
        }
        if !ctx.interactive {
            return Ok(false);
        }

        let answer = self.read_answer(ctx, &format!("{} [y/N/q]:", prompt))?;
        match answer.to_ascii_lowercase().as_str() {
            "y" | "yes" => Ok(true),
            "q" | "quit" => Err(Error::Aborted("user aborted".to_string())),
            _ => Ok(false),
        }
    }
}
