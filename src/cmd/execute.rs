use std::io::Write;

use super::execution_plan::ExecutionPlan;
use crate::{
    builtins::BuiltinCommands,
    process::launch::{self, LaunchError},
    state::{Flow, State},
};

impl ExecutionPlan {
    /// Runs the plan for `line` and reports how it went.
    pub fn execute<O: Write, E: Write>(
        &self,
        line: &str,
        state: &mut State<O, E>,
    ) -> Result<Flow, LaunchError> {
        match self {
            Self::NoOp => {}
            Self::Execute(stage) => {
                if !stage.is_redirected() {
                    if let Some(builtin) = BuiltinCommands::from_name(stage.program()) {
                        return Ok(state.run_builtin(builtin, stage.args(), line));
                    }
                }

                trace!(program = stage.program(), "executing command");
                let outcome = launch::run(stage, &state.search)?;
                state.reporter.completed(line, outcome);
            }
            Self::Background(stage) => {
                if let Err(err) = state.jobs.ensure_idle() {
                    state.reporter.error(&err);
                    return Ok(Flow::Continue);
                }

                trace!(program = stage.program(), "starting background job");
                let child = launch::spawn_background(stage, &state.search)?;
                if let Err(err) = state.jobs.admit(child, line) {
                    state.reporter.error(&err);
                }
            }
            Self::Pipe(stages) => {
                trace!(stages = stages.len(), "executing pipeline");
                let outcomes = launch::run_pipeline(stages, &state.search)?;
                state.reporter.pipeline(line, &outcomes);
            }
        }

        Ok(Flow::Continue)
    }
}
