use std::path::PathBuf;

use crate::parse::{parse_command, CommandParseError, Limits};

/// One program and its arguments within a line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stage {
    /// Program name followed by its arguments. Never empty once parsed.
    pub argv: Vec<String>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl Stage {
    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }

    pub fn is_redirected(&self) -> bool {
        self.input.is_some() || self.output.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionPlan {
    Execute(Stage),
    Background(Stage),
    Pipe(Vec<Stage>),
    NoOp,
}

impl ExecutionPlan {
    pub fn parse(line: &str, limits: &Limits) -> Result<Self, CommandParseError> {
        parse_command(line, limits)
    }
}
