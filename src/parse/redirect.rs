use std::path::PathBuf;

use super::{
    token::{tokenize, Token},
    CommandParseError, Limits,
};
use crate::cmd::execution_plan::Stage;

/// Parses one pipeline segment into its argument vector and redirections.
///
/// Words before the first marker form the command. A `<` or `>` takes the
/// word right after it as its target; words following a target are appended
/// to the arguments. A repeated marker replaces the earlier target.
pub fn parse_stage(segment: &str, limits: &Limits) -> Result<Stage, CommandParseError> {
    let tokens = tokenize(segment);

    let command_end = tokens
        .iter()
        .position(Token::is_marker)
        .unwrap_or(tokens.len());

    if command_end == 0 {
        return Err(CommandParseError::MissingCommand);
    }

    let mut stage = Stage {
        argv: tokens[..command_end].iter().filter_map(word).collect(),
        ..Default::default()
    };

    let mut rest = tokens[command_end..].iter();
    while let Some(token) = rest.next() {
        match token {
            Token::Word(w) => stage.argv.push(w.to_string()),
            Token::Read => {
                let target = rest.next().and_then(word);
                stage.input = Some(target.map(PathBuf::from).ok_or(CommandParseError::NoInputFile)?);
            }
            Token::Write => {
                let target = rest.next().and_then(word);
                stage.output = Some(target.map(PathBuf::from).ok_or(CommandParseError::NoOutputFile)?);
            }
            Token::Background => return Err(CommandParseError::MislocatedBackground),
            Token::Pipe => return Err(CommandParseError::MissingCommand),
        }
    }

    if stage.argv.len() > limits.max_args {
        return Err(CommandParseError::TooManyArguments);
    }

    Ok(stage)
}

fn word(token: &Token<'_>) -> Option<String> {
    match token {
        Token::Word(w) => Some(w.to_string()),
        _ => None,
    }
}
