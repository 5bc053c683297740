use std::io::{self, Write};

use enum_dispatch::enum_dispatch;
use strum::{EnumIter, IntoEnumIterator};
use thiserror::Error;

use crate::{job::JobSlot, process::status::BuiltinExitStatus};

pub mod cd;
pub mod exit;
pub mod pwd;

#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("too many arguments")]
    TooManyArguments,
    #[error("cannot cd into directory")]
    CannotCd(#[source] io::Error),
    #[error("cannot resolve working directory")]
    WorkingDirectory(#[source] io::Error),
    #[error("cannot write output: {0}")]
    Output(#[source] io::Error),
    #[error("active job still running")]
    ActiveJob,
}

impl BuiltinError {
    /// Interpreter-level status of the failure. Never a process exit code.
    pub fn code(&self) -> i32 {
        match self {
            Self::TooManyArguments => -1,
            Self::CannotCd(_) => -2,
            _ => 1,
        }
    }
}

/// What a builtin gets to see of the interpreter.
pub struct BuiltinContext<'a> {
    pub args: &'a [String],
    pub jobs: &'a JobSlot,
    pub stdout: &'a mut dyn Write,
}

#[enum_dispatch(BuiltinCommands)]
pub trait BuiltinCommand {
    fn name(&self) -> &'static str;
    fn execute(&self, ctx: &mut BuiltinContext<'_>) -> Result<BuiltinExitStatus, BuiltinError>;
}

#[enum_dispatch]
#[derive(Debug, EnumIter)]
pub enum BuiltinCommands {
    Cd(cd::Cd),
    Pwd(pwd::Pwd),
    Exit(exit::Exit),
}

impl BuiltinCommands {
    pub fn from_name(name: &str) -> Option<Self> {
        Self::iter().find(|cmd| cmd.name() == name)
    }
}
