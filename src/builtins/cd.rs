use super::{BuiltinCommand, BuiltinContext, BuiltinError};
use crate::process::status::BuiltinExitStatus;

#[derive(Debug, Default)]
pub struct Cd;

impl BuiltinCommand for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn execute(&self, ctx: &mut BuiltinContext<'_>) -> Result<BuiltinExitStatus, BuiltinError> {
        trace!("executing cd builtin: {:?}", ctx.args);

        let [path] = ctx.args else {
            return Err(BuiltinError::TooManyArguments);
        };

        std::env::set_current_dir(path).map_err(|err| {
            debug!("failed to cd: {}", err);
            BuiltinError::CannotCd(err)
        })?;

        Ok(BuiltinExitStatus::Success)
    }
}
