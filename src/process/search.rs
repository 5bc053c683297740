use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
};

use nix::unistd::{access, AccessFlags};

const PATH_KEY: &str = "PATH";

/// Turns a program name into something `execv` can run.
pub trait Resolve {
    fn resolve(&self, program: &str) -> Option<PathBuf>;
}

/// Ordered list of directories searched for executables.
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn from_env() -> Self {
        Self::from_var(env::var_os(PATH_KEY))
    }

    /// An absent variable yields an empty search path, so nothing resolves.
    pub fn from_var(var: Option<OsString>) -> Self {
        let dirs = var
            .map(|var| env::split_paths(&var).collect())
            .unwrap_or_default();
        Self { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl Resolve for SearchPath {
    fn resolve(&self, program: &str) -> Option<PathBuf> {
        if program.is_empty() {
            return None;
        }

        if program.contains('/') {
            let path = PathBuf::from(program);
            return is_executable(&path).then_some(path);
        }

        self.dirs
            .iter()
            .map(|dir| dir.join(program))
            .find(|candidate| is_executable(candidate))
    }
}

fn is_executable(path: &Path) -> bool {
    path.is_file() && access(path, AccessFlags::X_OK).is_ok()
}
