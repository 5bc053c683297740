use thiserror::Error;

use crate::{cmd::execution_plan::ExecutionPlan, process::status::Outcome};

use self::{
    redirect::parse_stage,
    token::{tokenize, Token},
};

pub mod redirect;
pub mod token;

/// Most entries a single argument vector may hold, program name included.
pub const MAX_ARGS: usize = 16;
/// Most `|` separators a single line may hold.
pub const MAX_PIPES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_args: usize,
    pub max_pipes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_args: MAX_ARGS,
            max_pipes: MAX_PIPES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandParseError {
    #[error("too many process arguments")]
    TooManyArguments,
    #[error("too many pipes (max {0})")]
    TooManyPipes(usize),
    #[error("mislocated background sign")]
    MislocatedBackground,
    #[error("mislocated input redirection")]
    MislocatedInput,
    #[error("mislocated output redirection")]
    MislocatedOutput,
    #[error("missing command")]
    MissingCommand,
    #[error("no input file")]
    NoInputFile,
    #[error("no output file")]
    NoOutputFile,
}

impl CommandParseError {
    /// How the rejected line is reported. Only a missing redirection target
    /// gets a completion line.
    pub fn outcome(&self) -> Outcome {
        match self {
            Self::NoInputFile | Self::NoOutputFile => Outcome::Exited(1),
            _ => Outcome::Suppressed,
        }
    }
}

/// Splits a line into its pipeline segments, each trimmed of surrounding
/// whitespace.
pub fn split_stages(line: &str) -> Vec<&str> {
    line.split('|').map(str::trim).collect()
}

/// Rejects structurally invalid lines before anything is split or spawned.
pub fn validate(tokens: &[Token<'_>], limits: &Limits) -> Result<(), CommandParseError> {
    let pipes = tokens.iter().filter(|t| **t == Token::Pipe).count();
    if pipes > limits.max_pipes {
        return Err(CommandParseError::TooManyPipes(limits.max_pipes));
    }

    if let Some(pos) = tokens.iter().position(|t| *t == Token::Background) {
        let trailing = pos + 1 == tokens.len();
        if !trailing || pipes > 0 || tokens.contains(&Token::Write) {
            return Err(CommandParseError::MislocatedBackground);
        }
    }

    if let Some(first_pipe) = tokens.iter().position(|t| *t == Token::Pipe) {
        if tokens[first_pipe..].contains(&Token::Read) {
            return Err(CommandParseError::MislocatedInput);
        }
    }

    if let Some(last_pipe) = tokens.iter().rposition(|t| *t == Token::Pipe) {
        if tokens[..last_pipe].contains(&Token::Write) {
            return Err(CommandParseError::MislocatedOutput);
        }
    }

    Ok(())
}

pub fn parse_command(line: &str, limits: &Limits) -> Result<ExecutionPlan, CommandParseError> {
    let tokens = tokenize(line);

    if tokens.is_empty() {
        return Ok(ExecutionPlan::NoOp);
    }

    validate(&tokens, limits)?;

    let background = tokens.last() == Some(&Token::Background);
    let body = if background {
        let trimmed = line.trim_end();
        trimmed.strip_suffix('&').unwrap_or(trimmed)
    } else {
        line
    };

    let mut stages = split_stages(body)
        .into_iter()
        .map(|segment| parse_stage(segment, limits))
        .collect::<Result<Vec<_>, _>>()?;

    trace!(stages = stages.len(), background, "parsed command line");

    let plan = match (stages.len(), background) {
        (1, true) => ExecutionPlan::Background(stages.remove(0)),
        (1, false) => ExecutionPlan::Execute(stages.remove(0)),
        _ => ExecutionPlan::Pipe(stages),
    };

    Ok(plan)
}
