//! Line input sources for the chat loop.

use std::borrow::Cow;
use std::io::{self, BufRead, IsTerminal, Write};

use reedline::{Prompt, PromptEditMode, PromptHistorySearch, Reedline, Signal};

/// Outcome of reading one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// A line of user input, without the trailing newline.
    Input(String),
    /// The user abandoned the current line (Ctrl-C).
    Interrupted,
    /// No more input (Ctrl-D or closed stdin).
    Eof,
}

/// Source of prompted input lines.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<Line>;
}

/// Pick the input source for stdin: a line editor on a terminal, buffered
/// reads otherwise.
pub fn stdin_source() -> Box<dyn LineSource> {
    if io::stdin().is_terminal() {
        Box::new(ReedlineSource::new())
    } else {
        Box::new(PlainSource::new(io::stdin().lock(), io::stdout()))
    }
}

// ============================================================================
// PlainSource
// ============================================================================

/// Blocking buffered reader that writes the prompt itself.
pub struct PlainSource<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> PlainSource<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R: BufRead, W: Write> LineSource for PlainSource<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Line> {
        self.writer.write_all(prompt.as_bytes())?;
        self.writer.flush()?;

        // Invalid UTF-8 becomes U+FFFD
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(Line::Eof);
        }
        let line = String::from_utf8_lossy(&buf);
        Ok(Line::Input(line.trim_end_matches(['\n', '\r']).to_string()))
    }
}

// ============================================================================
// ReedlineSource
// ============================================================================

/// Interactive line editor for terminals.
pub struct ReedlineSource {
    editor: Reedline,
}

impl ReedlineSource {
    pub fn new() -> Self {
        Self {
            editor: Reedline::create(),
        }
    }
}

impl Default for ReedlineSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSource for ReedlineSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<Line> {
        match self.editor.read_line(&ChatPrompt(prompt))? {
            Signal::Success(line) => Ok(Line::Input(line)),
            Signal::CtrlD => Ok(Line::Eof),
            _ => Ok(Line::Interrupted),
        }
    }
}

/// Renders the configured prompt verbatim, with no mode indicator.
struct ChatPrompt<'a>(&'a str);

impl Prompt for ChatPrompt<'_> {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.0)
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        Cow::Owned(format!("(search: {}) ", history_search.term))
    }
}
