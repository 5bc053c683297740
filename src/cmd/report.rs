use std::{
    fmt::{self, Display},
    io::{self, Stderr, Write},
};

use itertools::Itertools;

use crate::process::status::Outcome;

/// Writes the diagnostic stream protocol. Every line is flushed as soon as it
/// is written.
pub struct Reporter<W: Write = Stderr> {
    out: W,
}

impl Reporter<Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn error(&mut self, err: &dyn Display) {
        self.emit(format_args!("Error: {err}"));
    }

    /// Completion line for a single command or a background job. Nothing is
    /// printed for a suppressed outcome.
    pub fn completed(&mut self, line: &str, outcome: Outcome) {
        if outcome.is_suppressed() {
            trace!(line, "completion suppressed");
            return;
        }
        self.emit(format_args!("+ completed '{line}' {outcome}"));
    }

    /// Completion line for a pipeline: one bracket per stage, always printed.
    pub fn pipeline(&mut self, line: &str, outcomes: &[Outcome]) {
        let codes = outcomes.iter().join("");
        self.emit(format_args!("+ completed '{line}' {codes}"));
    }

    pub fn bye(&mut self) {
        self.emit(format_args!("Bye..."));
        self.completed("exit", Outcome::Exited(0));
    }

    fn emit(&mut self, args: fmt::Arguments<'_>) {
        let res = writeln!(self.out, "{args}").and_then(|_| self.out.flush());
        if let Err(err) = res {
            warn!(%err, "failed to write diagnostic line");
        }
    }
}
