// The interactive loop. Lines are accumulated into statements, which are run against a single
// connection; query results are rendered as HTML tables.
pub mod reader;
pub mod render;
pub mod statement;

use std::io::Write;

use log::{debug, info};

use crate::engine::Connection;
use crate::error::{Error, Result};
use self::reader::{Input, Line, LineSource, StatementBuffer, TERMINATOR};
use self::render::render_html;
use self::statement::StatementKind;

/// The state of a shell session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum State {
    /// Waiting for the first line of a statement.
    AwaitingInput,
    /// Part of a statement has been read.
    Accumulating,
    /// A completed statement is being run.
    Executing,
    /// An empty statement was entered. No further input is read.
    Terminated,
}

/// Statement counts for a session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Summary {
    /// Statements that ran to completion.
    pub executed: u64,
    /// Statements the engine rejected or failed.
    pub failed: u64,
}

/// An interactive SQL shell over a single database connection. Query results are written to
/// `output`, and failures to `errors`, one line each.
pub struct Shell<C: Connection, O: Write, E: Write> {
    connection: C,
    output: O,
    errors: E,
    buffer: StatementBuffer,
    state: State,
    summary: Summary,
}

impl<C: Connection, O: Write, E: Write> Shell<C, O, E> {
    /// Creates a new shell session.
    pub fn new(connection: C, output: O, errors: E) -> Self {
        Self {
            connection,
            output,
            errors,
            buffer: StatementBuffer::new(),
            state: State::AwaitingInput,
            summary: Summary::default(),
        }
    }

    /// The current session state.
    pub fn state(&self) -> State {
        self.state
    }

    /// The statement counts so far.
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// The output stream.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// The error stream.
    pub fn errors(&self) -> &E {
        &self.errors
    }

    /// Reads lines from the source until the session terminates. The end of input counts as a
    /// terminator line, and an interrupt discards the statement being accumulated. Only
    /// failures writing the output end the session early.
    pub fn run(&mut self, source: &mut dyn LineSource) -> Result<Summary> {
        while self.state != State::Terminated {
            match source.read_line(self.state == State::Accumulating)? {
                Line::Text(line) => self.feed(Some(&line))?,
                Line::Interrupt => self.interrupt(),
                Line::End => self.feed(None)?,
            };
        }
        info!("Session ended, {} statements executed, {} failed", self.summary.executed, self.summary.failed);
        Ok(self.summary.clone())
    }

    /// Feeds a single input line, or None for the end of input, and returns the new state.
    pub fn feed(&mut self, line: Option<&str>) -> Result<State> {
        if self.state == State::Terminated {
            return Err(Error::Internal("Session has terminated".into()));
        }
        match self.buffer.push(line.unwrap_or(TERMINATOR)) {
            Input::Pending if !self.buffer.is_empty() => self.state = State::Accumulating,
            Input::Pending => {}
            Input::Terminate => self.state = State::Terminated,
            Input::Statement(statement) => {
                self.state = State::Executing;
                self.dispatch(&statement)?;
                self.state = State::AwaitingInput;
            }
        }
        Ok(self.state)
    }

    /// Discards the statement being accumulated, if any, without running it.
    pub fn interrupt(&mut self) -> State {
        if self.state == State::Accumulating {
            debug!("Discarding interrupted statement");
            self.buffer.clear();
            self.state = State::AwaitingInput;
        }
        self.state
    }

    /// Runs a statement and reports its failures on the error stream.
    fn dispatch(&mut self, statement: &str) -> Result<()> {
        match self.execute(statement) {
            Ok(errors) => {
                self.summary.executed += 1;
                for err in errors {
                    self.report(&err)?;
                }
            }
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                self.summary.failed += 1;
                self.report(&err)?;
            }
        }
        self.output.flush()?;
        Ok(())
    }

    /// Runs a statement, returning the recoverable errors hit while rendering its result.
    fn execute(&mut self, statement: &str) -> Result<Vec<Error>> {
        let kind = StatementKind::classify(statement);
        debug!("Executing {:?} statement: {}", kind, statement);
        match kind {
            StatementKind::Query => {
                let output = &mut self.output;
                let mut rendered = None;
                self.connection.query(statement, &mut |cursor| {
                    rendered = Some(render_html(&mut *output, statement, cursor)?);
                    Ok(())
                })?;
                let rendered = rendered.ok_or_else(|| Error::Internal("Query produced no cursor".into()))?;
                debug!("Rendered {} rows", rendered.rows);
                Ok(rendered.errors)
            }
            StatementKind::Execute => {
                self.connection.execute(statement)?;
                Ok(Vec::new())
            }
        }
    }

    fn report(&mut self, err: &Error) -> Result<()> {
        debug!("Statement failed: {:?}", err);
        writeln!(self.errors, "{}", err)?;
        Ok(())
    }
}
