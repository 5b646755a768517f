use std::borrow::Cow;
use std::io::BufRead;
use std::path::PathBuf;

use log::{debug, warn};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::Result;

/// A line consisting of only this terminates the statement being accumulated.
pub const TERMINATOR: &str = ";";

/// A line read from a line source.
#[derive(Clone, Debug, PartialEq)]
pub enum Line {
    /// An input line without its line ending.
    Text(String),
    /// The user interrupted input (Ctrl-C), discarding the statement being accumulated.
    Interrupt,
    /// The input is exhausted.
    End,
}

/// A source of input lines.
pub trait LineSource {
    /// Reads the next line. `pending` is set while a statement is being accumulated.
    fn read_line(&mut self, pending: bool) -> Result<Line>;
}

/// Lines from a buffered reader, e.g. piped stdin or a script file. Invalid UTF-8 is replaced
/// rather than ending the input.
pub struct Lines<R: BufRead> {
    reader: R,
}

impl<R: BufRead> Lines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for Lines<R> {
    fn read_line(&mut self, _pending: bool) -> Result<Line> {
        let mut bytes = Vec::new();
        if self.reader.read_until(b'\n', &mut bytes)? == 0 {
            return Ok(Line::End);
        }
        if bytes.ends_with(b"\n") {
            bytes.pop();
            if bytes.ends_with(b"\r") {
                bytes.pop();
            }
        }
        let line = String::from_utf8_lossy(&bytes);
        if matches!(line, Cow::Owned(_)) {
            warn!("Replaced invalid UTF-8 in input line: {}", line);
        }
        Ok(Line::Text(line.into_owned()))
    }
}

/// Lines typed at a terminal, with line editing and history.
pub struct Terminal {
    editor: DefaultEditor,
    prompt: String,
    continuation_prompt: String,
    history_file: Option<PathBuf>,
}

impl Terminal {
    /// Creates a terminal source. History is loaded from and saved to `history_file`, if given.
    pub fn new(prompt: &str, continuation_prompt: &str, history_file: Option<PathBuf>) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;
        if let Some(path) = &history_file {
            match editor.load_history(path) {
                Ok(()) => debug!("Loaded history from {}", path.display()),
                Err(err) => debug!("No history loaded from {}: {}", path.display(), err),
            }
        }
        Ok(Self {
            editor,
            prompt: prompt.to_string(),
            continuation_prompt: continuation_prompt.to_string(),
            history_file,
        })
    }
}

impl LineSource for Terminal {
    fn read_line(&mut self, pending: bool) -> Result<Line> {
        let prompt = if pending { &self.continuation_prompt } else { &self.prompt };
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Line::Text(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Line::Interrupt),
            Err(ReadlineError::Eof) => Ok(Line::End),
            Err(err) => Err(err.into()),
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if let Some(path) = &self.history_file {
            if let Err(err) = self.editor.save_history(path) {
                warn!("Failed to save history to {}: {}", path.display(), err);
            }
        }
    }
}

/// The outcome of pushing a line into a statement buffer.
#[derive(Clone, Debug, PartialEq)]
pub enum Input {
    /// The line was consumed and the statement is not complete yet.
    Pending,
    /// A statement was completed.
    Statement(String),
    /// An empty statement was entered, ending the session.
    Terminate,
}

/// Accumulates input lines into a statement, joined by single spaces.
#[derive(Debug, Default)]
pub struct StatementBuffer {
    text: String,
}

impl StatementBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing has been accumulated since the last completed statement.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Discards whatever has been accumulated.
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Pushes an input line. A terminator line completes the buffered statement, or ends the
    /// session if there is none. Blank lines are skipped.
    pub fn push(&mut self, line: &str) -> Input {
        if line == TERMINATOR {
            return match self.is_empty() {
                true => Input::Terminate,
                false => Input::Statement(std::mem::take(&mut self.text)),
            };
        }
        if line.trim().is_empty() {
            return Input::Pending;
        }
        if !self.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(line);
        Input::Pending
    }
}
