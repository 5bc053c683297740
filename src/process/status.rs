use std::fmt;

/// Placeholder printed for a suppressed stage inside a pipeline report.
pub const SUPPRESSED_CODE: i32 = 255;

/// Result of running one stage.
///
/// `Suppressed` is kept apart from any real exit code, so a program that
/// genuinely exits with 255 is still reported as `Exited(255)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Exited(i32),
    Suppressed,
}

impl Outcome {
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Exited(code) => Some(*code),
            Self::Suppressed => None,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.code().unwrap_or(SUPPRESSED_CODE))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinExitStatus {
    /// Handled, print a completion line with code 0.
    Success,
    /// Handled and fully reported by the builtin itself.
    Silent,
    /// Leave the control loop.
    Exit,
}

impl BuiltinExitStatus {
    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Success | Self::Exit => Outcome::Exited(0),
            Self::Silent => Outcome::Suppressed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_255_is_not_suppressed() {
        let outcome = Outcome::Exited(255);
        assert!(!outcome.is_suppressed());
        assert_eq!(outcome.code(), Some(255));
    }

    #[test]
    fn display_brackets() {
        assert_eq!(Outcome::Exited(2).to_string(), "[2]");
        assert_eq!(Outcome::Suppressed.to_string(), "[255]");
    }

    #[test]
    fn builtin_outcomes() {
        assert_eq!(BuiltinExitStatus::Success.outcome(), Outcome::Exited(0));
        assert!(BuiltinExitStatus::Silent.outcome().is_suppressed());
    }
}
