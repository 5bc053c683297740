
use super::{BuiltinCommand, BuiltinContext, BuiltinError};
use crate::process::status::BuiltinExitStatus;

#[derive(Debug, Default)]
pub struct Pwd;

impl BuiltinCommand for Pwd {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn execute(&self, ctx: &mut BuiltinContext<'_>) -> Result<BuiltinExitStatus, BuiltinError> {
        let cwd = std::env::current_dir().map_err(BuiltinError::WorkingDirectory)?;

        writeln!(ctx.stdout, "{}", cwd.display())
            .and_then(|_| ctx.stdout.flush())
            .map_err(BuiltinError::Output)?;

        Ok(BuiltinExitStatus::Silent)
    }
}
