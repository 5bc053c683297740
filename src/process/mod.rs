//! Everything that touches child processes and their descriptors.

pub mod child;
pub mod launch;
pub mod pipe;
pub mod search;
pub mod status;

#[cfg(test)]
pub(crate) mod testing {
    use std::{
        fs,
        panic::{self, AssertUnwindSafe},
    };

    use nix::{
        libc,
        sys::wait::{waitpid, WaitStatus},
        unistd::{fork, ForkResult},
    };

    const FD_DIR: &str = "/proc/self/fd";

    pub fn open_fds() -> usize {
        fs::read_dir(FD_DIR).map(|dir| dir.count()).unwrap_or(0)
    }

    pub fn highest_fd() -> i32 {
        fs::read_dir(FD_DIR)
            .into_iter()
            .flatten()
            .flatten()
            .filter_map(|entry| entry.file_name().to_str()?.parse().ok())
            .max()
            .unwrap_or(2)
    }

    /// Runs `check` in a forked copy of the test process, where no other
    /// test thread can open or close descriptors behind its back.
    pub fn in_forked_child(check: impl FnOnce() -> bool) -> bool {
        // SAFETY: the child never returns into the harness; it leaves through _exit
        match unsafe { fork() }.expect("fork") {
            ForkResult::Child => {
                let passed = panic::catch_unwind(AssertUnwindSafe(check)).unwrap_or(false);
                // SAFETY: ends the forked child without running the parent's exit handlers
                unsafe { libc::_exit(if passed { 0 } else { 1 }) }
            }
            ForkResult::Parent { child } => {
                waitpid(child, None).expect("waitpid") == WaitStatus::Exited(child, 0)
            }
        }
    }
}
