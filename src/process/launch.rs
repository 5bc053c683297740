use std::{
    convert::Infallible,
    ffi::{CString, NulError},
    io::{self, Write},
    os::{
        fd::{AsRawFd, OwnedFd, RawFd},
        unix::ffi::OsStrExt,
    },
    path::Path,
};

use nix::{
    errno::Errno,
    fcntl::{self, OFlag},
    libc::{self, STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO},
    sys::stat::Mode,
    unistd::{self, dup2, execv, fork, ForkResult},
};
use thiserror::Error;

use super::{
    child::{Child, REPORT_SUPPRESS},
    pipe::{Pipe, PipeSet},
    search::Resolve,
    status::{Outcome, SUPPRESSED_CODE},
};
use crate::cmd::execution_plan::Stage;

const DEV_NULL: &str = "/dev/null";

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("cannot create pipe: {0}")]
    Pipe(#[source] nix::Error),
    #[error("cannot create process: {0}")]
    Fork(#[source] nix::Error),
    #[error("cannot wait for process: {0}")]
    Wait(#[source] nix::Error),
    #[error("argument contains a nul byte")]
    Nul(#[from] NulError),
}

impl LaunchError {
    /// Failing to create a process leaves the interpreter unable to do its
    /// job at all; the other failures only cost the current line.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fork(_))
    }
}

/// Everything that can stop a child between fork and exec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildError {
    OpenInput(Errno),
    OpenOutput(Errno),
    NotFound,
    Redirect(Errno),
    Exec(Errno),
}

impl ChildError {
    fn exit_code(self) -> i32 {
        match self {
            Self::OpenInput(errno)
            | Self::OpenOutput(errno)
            | Self::Redirect(errno)
            | Self::Exec(errno) => errno as i32,
            Self::NotFound => SUPPRESSED_CODE,
        }
    }

    /// Diagnostic line the user sees, if any.
    fn message(self) -> Option<&'static str> {
        match self {
            Self::OpenInput(_) => Some("Error: cannot open input file\n"),
            Self::OpenOutput(_) => Some("Error: cannot open output file\n"),
            Self::NotFound => Some("Error: command not found\n"),
            Self::Redirect(_) | Self::Exec(_) => None,
        }
    }

    fn suppresses_report(self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Where a stage sits relative to the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Stage `index` of a foreground pipeline.
    Foreground(usize),
    /// The single stage of a background job. Reads from `/dev/null` unless
    /// it redirects its input.
    Background,
}

impl Placement {
    fn index(&self) -> usize {
        match self {
            Self::Foreground(index) => *index,
            Self::Background => 0,
        }
    }
}

/// A stage with its program resolved and every string the child hands to
/// the kernel already converted. The child allocates nothing after fork.
#[derive(Debug)]
struct Prepared<'a> {
    stage: &'a Stage,
    placement: Placement,
    /// `None` when the program is not on the search path.
    program: Option<CString>,
    argv: Vec<CString>,
    input: Option<CString>,
    output: Option<CString>,
}

impl<'a> Prepared<'a> {
    fn new(
        stage: &'a Stage,
        placement: Placement,
        resolver: &dyn Resolve,
    ) -> Result<Self, LaunchError> {
        let input = match (&stage.input, placement) {
            (Some(path), _) => Some(path_cstring(path)?),
            (None, Placement::Background) => Some(CString::new(DEV_NULL)?),
            (None, Placement::Foreground(_)) => None,
        };
        let output = stage.output.as_deref().map(path_cstring).transpose()?;
        let program = resolver
            .resolve(stage.program())
            .map(|path| path_cstring(&path))
            .transpose()?;
        let argv = stage
            .argv
            .iter()
            .map(|arg| CString::new(arg.as_str()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            stage,
            placement,
            program,
            argv,
            input,
            output,
        })
    }
}

fn path_cstring(path: &Path) -> Result<CString, NulError> {
    CString::new(path.as_os_str().as_bytes())
}

/// Forks one child for `prepared` and wires it into `pipes`.
///
/// The parent keeps `pipes` open; it is the caller's job to close them once
/// every stage of the pipeline has been spawned.
fn spawn(prepared: &Prepared<'_>, pipes: &mut PipeSet) -> Result<Child, LaunchError> {
    let Pipe { read, write } = Pipe::new().map_err(LaunchError::Pipe)?;

    // anything buffered would otherwise be written twice
    if let Err(err) = io::stdout().flush() {
        warn!(%err, "failed to flush stdout before fork");
    }

    // SAFETY: between fork and exec the child only duplicates, opens and
    // closes descriptors and writes fixed messages. Everything it reads was
    // built before the fork, so it never waits on a lock held by another
    // thread such as the log writer.
    match unsafe { fork() }.map_err(LaunchError::Fork)? {
        ForkResult::Parent { child } => {
            drop(write);
            trace!(
                pid = %child,
                program = prepared.stage.program(),
                placement = ?prepared.placement,
                "spawned stage"
            );
            Ok(Child::new(child, read))
        }
        ForkResult::Child => {
            drop(read);
            exec_stage(prepared, pipes, write)
        }
    }
}

/// Runs a foreground pipeline of one or more stages and collects one
/// outcome per stage, in stage order.
pub fn run_pipeline(stages: &[Stage], resolver: &dyn Resolve) -> Result<Vec<Outcome>, LaunchError> {
    let prepared = stages
        .iter()
        .enumerate()
        .map(|(index, stage)| Prepared::new(stage, Placement::Foreground(index), resolver))
        .collect::<Result<Vec<_>, _>>()?;

    let mut pipes =
        PipeSet::allocate(stages.len().saturating_sub(1)).map_err(LaunchError::Pipe)?;

    let mut children = Vec::with_capacity(prepared.len());
    for (index, stage) in prepared.iter().enumerate() {
        match spawn(stage, &mut pipes) {
            Ok(child) => children.push(child),
            Err(err) => {
                error!(%err, index, "failed to spawn pipeline stage");
                pipes.close_all();
                reap(children);
                return Err(err);
            }
        }
    }

    pipes.close_all();

    let mut outcomes = Vec::with_capacity(children.len());
    let mut failure = None;
    for child in children {
        match child.wait() {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => {
                failure.get_or_insert(LaunchError::Wait(err));
                outcomes.push(Outcome::Suppressed);
            }
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(outcomes),
    }
}

pub fn run(stage: &Stage, resolver: &dyn Resolve) -> Result<Outcome, LaunchError> {
    let outcomes = run_pipeline(std::slice::from_ref(stage), resolver)?;
    Ok(outcomes.into_iter().next().unwrap_or(Outcome::Suppressed))
}

/// Starts `stage` without waiting for it.
pub fn spawn_background(stage: &Stage, resolver: &dyn Resolve) -> Result<Child, LaunchError> {
    let prepared = Prepared::new(stage, Placement::Background, resolver)?;
    spawn(&prepared, &mut PipeSet::default())
}

fn reap(children: Vec<Child>) {
    for child in children {
        let pid = child.pid();
        if let Err(err) = child.wait() {
            warn!(%pid, %err, "failed to reap child");
        }
    }
}

fn exec_stage(prepared: &Prepared<'_>, pipes: &mut PipeSet, report: OwnedFd) -> ! {
    let err = match redirect_and_exec(prepared, pipes) {
        Ok(never) => match never {},
        Err(err) => err,
    };

    if let Some(message) = err.message() {
        let _ = unistd::write(STDERR_FILENO, message.as_bytes());
    }

    if err.suppresses_report() {
        let _ = unistd::write(report.as_raw_fd(), &[REPORT_SUPPRESS]);
    }

    // SAFETY: ends the forked child without running exit handlers or
    // flushing buffers it shares with the parent
    unsafe { libc::_exit(err.exit_code()) }
}

fn redirect_and_exec(
    prepared: &Prepared<'_>,
    pipes: &mut PipeSet,
) -> Result<Infallible, ChildError> {
    let index = prepared.placement.index();
    if let Some(fd) = pipes.stdin_for(index) {
        replace_stream(fd, STDIN_FILENO)?;
    }
    if let Some(fd) = pipes.stdout_for(index) {
        replace_stream(fd, STDOUT_FILENO)?;
    }
    pipes.close_all();

    if let Some(path) = &prepared.input {
        let fd = fcntl::open(path.as_c_str(), OFlag::O_RDONLY, Mode::empty())
            .map_err(ChildError::OpenInput)?;
        move_stream(fd, STDIN_FILENO)?;
    }

    if let Some(path) = &prepared.output {
        let fd = fcntl::open(
            path.as_c_str(),
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            Mode::from_bits_truncate(0o644),
        )
        .map_err(ChildError::OpenOutput)?;
        move_stream(fd, STDOUT_FILENO)?;
    }

    let program = prepared.program.as_deref().ok_or(ChildError::NotFound)?;
    execv(program, &prepared.argv).map_err(ChildError::Exec)
}

fn replace_stream(fd: RawFd, target: RawFd) -> Result<(), ChildError> {
    if fd != target {
        dup2(fd, target).map_err(ChildError::Redirect)?;
    }
    Ok(())
}

/// Like `replace_stream`, for a descriptor nobody else owns: the original
/// is closed once it sits on `target`.
fn move_stream(fd: RawFd, target: RawFd) -> Result<(), ChildError> {
    replace_stream(fd, target)?;
    if fd != target {
        let _ = unistd::close(fd);
    }
    Ok(())
}
