use std::os::fd::{AsRawFd, OwnedFd};

use nix::{
    errno::Errno,
    sys::wait::{waitpid, WaitPidFlag, WaitStatus},
    unistd::{self, Pid},
};

use super::status::Outcome;

/// Byte a child writes on its report pipe when it gives up before exec
/// after already telling the user why.
pub const REPORT_SUPPRESS: u8 = 1;

/// A forked child as seen from the interpreter.
///
/// `report` is the read end of a close-on-exec pipe shared with the child: it
/// reaches end-of-file without data once the program image is replaced, and
/// carries `REPORT_SUPPRESS` if the child exited before that.
#[derive(Debug)]
pub struct Child {
    pid: Pid,
    report: OwnedFd,
}

impl Child {
    pub fn new(pid: Pid, report: OwnedFd) -> Self {
        Self { pid, report }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Blocks until the child terminates.
    pub fn wait(self) -> nix::Result<Outcome> {
        loop {
            match waitpid(self.pid, None) {
                Ok(status) => {
                    if let Some(outcome) = self.outcome(status) {
                        return Ok(outcome);
                    }
                }
                Err(Errno::EINTR) => continue,
                Err(err) => return Err(err),
            }
        }
    }

    /// Checks for termination without blocking.
    pub fn try_wait(&mut self) -> nix::Result<Option<Outcome>> {
        match waitpid(self.pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(status) => Ok(self.outcome(status)),
            Err(Errno::EINTR) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn outcome(&self, status: WaitStatus) -> Option<Outcome> {
        match status {
            WaitStatus::Exited(pid, code) => {
                trace!(%pid, code, "child exited");
                if self.suppressed() {
                    Some(Outcome::Suppressed)
                } else {
                    Some(Outcome::Exited(code))
                }
            }
            WaitStatus::Signaled(pid, signal, _) => {
                debug!(%pid, ?signal, "child killed by signal");
                Some(Outcome::Suppressed)
            }
            _ => None,
        }
    }

    fn suppressed(&self) -> bool {
        let mut buf = [0u8; 1];
        loop {
            match unistd::read(self.report.as_raw_fd(), &mut buf) {
                Ok(n) => return n == 1 && buf[0] == REPORT_SUPPRESS,
                Err(Errno::EINTR) => continue,
                Err(err) => {
                    warn!(pid = %self.pid, %err, "failed to read exec report");
                    return false;
                }
            }
        }
    }
}
