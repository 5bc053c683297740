use super::{BuiltinCommand, BuiltinContext, BuiltinError};
use crate::process::status::BuiltinExitStatus;

#[derive(Debug, Default)]
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn execute(&self, ctx: &mut BuiltinContext<'_>) -> Result<BuiltinExitStatus, BuiltinError> {
        if ctx.jobs.is_running() {
            return Err(BuiltinError::ActiveJob);
        }

        Ok(BuiltinExitStatus::Exit)
    }
}
