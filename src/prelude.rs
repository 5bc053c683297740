pub use crate::{
    cmd::{
        execution_plan::{ExecutionPlan, Stage},
        report::Reporter,
    },
    config::Config,
    input::{Input, InputMessage},
    job::JobSlot,
    parse::{CommandParseError, Limits},
    process::{
        launch::LaunchError,
        search::{Resolve, SearchPath},
        status::Outcome,
    },
    state::{Flow, State},
};
