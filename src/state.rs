use std::io::{self, Stderr, Stdout, Write};

use crate::{
    builtins::{BuiltinCommand, BuiltinCommands, BuiltinContext},
    cmd::{execution_plan::ExecutionPlan, report::Reporter},
    config::Config,
    job::JobSlot,
    parse::Limits,
    process::{
        launch::LaunchError,
        search::SearchPath,
        status::BuiltinExitStatus,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Everything the control loop carries from one line to the next.
pub struct State<O: Write = Stdout, E: Write = Stderr> {
    pub prompt: String,
    pub limits: Limits,
    pub search: SearchPath,
    pub jobs: JobSlot,
    pub stdout: O,
    pub reporter: Reporter<E>,
}

impl State {
    pub fn new(config: &Config) -> Self {
        Self::with_streams(config, SearchPath::from_env(), io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> State<O, E> {
    pub fn with_streams(config: &Config, search: SearchPath, stdout: O, stderr: E) -> Self {
        Self {
            prompt: config.prompt.clone(),
            limits: config.limits(),
            search,
            jobs: JobSlot::new(),
            stdout,
            reporter: Reporter::new(stderr),
        }
    }

    pub fn render(&mut self) -> io::Result<()> {
        write!(self.stdout, "{}", self.prompt)?;
        self.stdout.flush()
    }

    /// Echoes a line read from a non-terminal input.
    pub fn echo(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.stdout, "{line}")?;
        self.stdout.flush()
    }

    /// Runs one line. Only an error the interpreter cannot recover from is
    /// returned; everything else is reported and the loop goes on.
    pub fn execute(&mut self, line: &str) -> Result<Flow, LaunchError> {
        let plan = match ExecutionPlan::parse(line, &self.limits) {
            Ok(plan) => plan,
            Err(err) => {
                debug!(%err, line, "rejected command line");
                self.reporter.error(&err);
                self.reporter.completed(line, err.outcome());
                return Ok(Flow::Continue);
            }
        };

        trace!(?plan, "execution plan");

        match plan.execute(line, self) {
            Err(err) if !err.is_fatal() => {
                error!(%err, line, "command line failed");
                self.reporter.error(&err);
                Ok(Flow::Continue)
            }
            res => res,
        }
    }

    pub fn run_builtin(&mut self, builtin: BuiltinCommands, args: &[String], line: &str) -> Flow {
        let mut ctx = BuiltinContext {
            args,
            jobs: &self.jobs,
            stdout: &mut self.stdout,
        };

        match builtin.execute(&mut ctx) {
            Ok(BuiltinExitStatus::Exit) => {
                self.reporter.bye();
                Flow::Exit
            }
            Ok(status) => {
                self.reporter.completed(line, status.outcome());
                Flow::Continue
            }
            Err(err) => {
                debug!(%err, code = err.code(), builtin = builtin.name(), "builtin failed");
                self.reporter.error(&err);
                Flow::Continue
            }
        }
    }

    /// Reports the background job if it has finished since the last check.
    pub fn poll_background(&mut self) {
        match self.jobs.poll() {
            Ok(Some(finished)) => self.reporter.completed(&finished.command, finished.outcome),
            Ok(None) => {}
            Err(err) => {
                error!(%err, "background job check failed");
                self.reporter.error(&err);
            }
        }
    }

    /// Waits for the background job, if any, and reports it.
    pub fn drain_background(&mut self) {
        match self.jobs.wait() {
            Ok(Some(finished)) => self.reporter.completed(&finished.command, finished.outcome),
            Ok(None) => {}
            Err(err) => {
                error!(%err, "background job wait failed");
                self.reporter.error(&err);
            }
        }
    }
}
