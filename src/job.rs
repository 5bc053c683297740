use thiserror::Error;

use crate::process::{child::Child, status::Outcome};

#[derive(Debug, Error)]
pub enum JobError {
    #[error("active job still running")]
    Busy,
    #[error("cannot check background job: {0}")]
    Wait(#[source] nix::Error),
}

/// A background process and the line that started it.
#[derive(Debug)]
pub struct Job {
    pub child: Child,
    pub command: String,
}

/// A finished job, ready to be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finished {
    pub command: String,
    pub outcome: Outcome,
}

/// Holds at most one background job.
#[derive(Debug, Default)]
pub struct JobSlot {
    current: Option<Job>,
}

impl JobSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    pub fn command(&self) -> Option<&str> {
        self.current.as_ref().map(|job| job.command.as_str())
    }

    /// Fails without touching the slot if a job is already outstanding.
    pub fn ensure_idle(&self) -> Result<(), JobError> {
        match self.current {
            Some(_) => Err(JobError::Busy),
            None => Ok(()),
        }
    }

    pub fn admit(&mut self, child: Child, command: impl Into<String>) -> Result<(), JobError> {
        self.ensure_idle()?;
        let command = command.into();
        debug!(pid = %child.pid(), %command, "background job started");
        self.current = Some(Job { child, command });
        Ok(())
    }

    /// Non-blocking completion check. Frees the slot when the job is done.
    pub fn poll(&mut self) -> Result<Option<Finished>, JobError> {
        let Some(job) = self.current.as_mut() else {
            return Ok(None);
        };

        match job.child.try_wait() {
            Ok(Some(outcome)) => Ok(self.release(outcome)),
            Ok(None) => Ok(None),
            Err(err) => {
                // the child is gone for good, there is nothing left to wait for
                self.current = None;
                Err(JobError::Wait(err))
            }
        }
    }

    /// Blocks until the outstanding job, if any, terminates.
    pub fn wait(&mut self) -> Result<Option<Finished>, JobError> {
        let Some(job) = self.current.take() else {
            return Ok(None);
        };

        let outcome = job.child.wait().map_err(JobError::Wait)?;
        debug!(command = %job.command, ?outcome, "background job finished");
        Ok(Some(Finished {
            command: job.command,
            outcome,
        }))
    }

    fn release(&mut self, outcome: Outcome) -> Option<Finished> {
        let job = self.current.take()?;
        debug!(command = %job.command, ?outcome, "background job finished");
        Some(Finished {
            command: job.command,
            outcome,
        })
    }
}
