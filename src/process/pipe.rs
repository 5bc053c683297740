use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};

use nix::{fcntl::OFlag, unistd};

/// Both ends of one anonymous pipe. Each end is closed when dropped.
#[derive(Debug)]
pub struct Pipe {
    pub read: OwnedFd,
    pub write: OwnedFd,
}

impl Pipe {
    /// A pipe whose ends disappear when the owning process execs. A child
    /// keeps an end across exec only by duplicating it onto a standard stream.
    pub fn new() -> nix::Result<Self> {
        let (read, write) = unistd::pipe2(OFlag::O_CLOEXEC)?;
        // SAFETY: both descriptors were just returned by pipe2(2) and are owned by nobody else
        Ok(unsafe {
            Self {
                read: OwnedFd::from_raw_fd(read),
                write: OwnedFd::from_raw_fd(write),
            }
        })
    }
}

/// The N-1 pipes connecting an N-stage pipeline.
///
/// Pipe `i` carries stage `i`'s stdout into stage `i + 1`'s stdin.
#[derive(Debug, Default)]
pub struct PipeSet {
    pipes: Vec<Pipe>,
}

impl PipeSet {
    /// Allocates `count` pipes. If any allocation fails, every pipe opened so
    /// far is closed before the error is returned.
    pub fn allocate(count: usize) -> nix::Result<Self> {
        let mut pipes = Vec::with_capacity(count);
        for _ in 0..count {
            pipes.push(Pipe::new()?);
        }
        trace!(count, "allocated pipes");
        Ok(Self { pipes })
    }

    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }

    /// Read end feeding stage `index`, if it is not the first stage.
    pub fn stdin_for(&self, index: usize) -> Option<RawFd> {
        index
            .checked_sub(1)
            .and_then(|i| self.pipes.get(i))
            .map(|pipe| pipe.read.as_raw_fd())
    }

    /// Write end fed by stage `index`, if it is not the last stage.
    pub fn stdout_for(&self, index: usize) -> Option<RawFd> {
        self.pipes.get(index).map(|pipe| pipe.write.as_raw_fd())
    }

    /// Closes every pipe. The backing storage is kept, so this is also safe
    /// to call in a freshly forked child.
    pub fn close_all(&mut self) {
        self.pipes.clear();
    }
}
