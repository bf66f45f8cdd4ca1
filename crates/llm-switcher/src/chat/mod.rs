//! Interactive chat loop.
//!
//! The loop has two states. While `Reading` it prompts for a line and either
//! forwards it to the provider selected at startup or moves to `Done` on the
//! exit command or end of input. Requests run one at a time; provider errors
//! go to the error stream and the loop keeps reading.

mod input;

pub use input::{Line, LineSource, PlainSource, ReedlineSource, stdin_source};

use std::io::{self, Write};

use tracing::debug;

use crate::config::ChatConfig;
use crate::llm::ChatTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Reading,
    Done,
}

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Exit,
    Skip,
    Send(&'a str),
}

fn parse_command<'a>(line: &'a str, exit_command: &str) -> Command<'a> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Skip;
    }
    if trimmed.to_lowercase() == exit_command.trim().to_lowercase() {
        return Command::Exit;
    }
    Command::Send(line)
}

/// Read-eval-print loop over one selected provider.
pub struct ChatLoop {
    target: ChatTarget,
    config: ChatConfig,
}

impl ChatLoop {
    pub fn new(target: ChatTarget, config: ChatConfig) -> Self {
        Self { target, config }
    }

    pub fn target(&self) -> &ChatTarget {
        &self.target
    }

    /// Run until the exit command or end of input. Replies go to `out`,
    /// failed requests to `err`.
    pub async fn run<I, W, E>(&self, input: &mut I, out: &mut W, err: &mut E) -> io::Result<()>
    where
        I: LineSource + ?Sized,
        W: Write,
        E: Write,
    {
        writeln!(out, "Using LLM: {}", self.target.display_name())?;

        let mut state = LoopState::Reading;
        while state == LoopState::Reading {
            state = self.step(input, out, err).await?;
        }

        writeln!(out, "Exiting...")?;
        out.flush()
    }

    /// Read and handle a single line.
    pub async fn step<I, W, E>(
        &self,
        input: &mut I,
        out: &mut W,
        err: &mut E,
    ) -> io::Result<LoopState>
    where
        I: LineSource + ?Sized,
        W: Write,
        E: Write,
    {
        let line = match input.read_line(&self.config.prompt)? {
            Line::Input(line) => line,
            Line::Interrupted => return Ok(LoopState::Reading),
            Line::Eof => return Ok(LoopState::Done),
        };

        match parse_command(&line, &self.config.exit_command) {
            Command::Exit => return Ok(LoopState::Done),
            Command::Skip => {}
            Command::Send(text) => {
                if self.config.echo_input {
                    writeln!(out, "You entered: {text}")?;
                }
                debug!(provider = %self.target.provider(), "forwarding message");
                match self.target.send_message(text).await {
                    Ok(reply) => writeln!(out, "{}: {}", self.target.display_name(), reply)?,
                    Err(e) => {
                        writeln!(err, "Error: {e}")?;
                        err.flush()?;
                    }
                }
            }
        }

        out.flush()?;
        Ok(LoopState::Reading)
    }
}
