//! Process exit statuses.

use std::fmt;

/// Exit statuses of the `goanysync` binary.
///
/// Per-source skips never change the status; only failures that stop a
/// whole invocation do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful completion.
    Ok = 0,

    /// Invalid command line.
    Syntax = 1,

    /// The configuration file is missing, unreadable or invalid.
    Config = 2,

    /// The lock could not be taken: untrusted lock location, creation
    /// failure or an expired wait.
    Lock = 3,

    /// A verb failed as a whole: volatile root unusable, orphans found by
    /// `start` or left by `stop`, or the orphan scan itself failed.
    Verb = 4,

    /// The lock could not be released. Mutual exclusion can no longer be
    /// trusted and the binary aborts instead of exiting.
    LockIntegrity = 70,
}

impl ExitCode {
    /// Numeric value.
    ///
    /// ```
    /// use cli::ExitCode;
    ///
    /// assert_eq!(ExitCode::Ok.as_i32(), 0);
    /// assert_eq!(ExitCode::LockIntegrity.as_i32(), 70);
    /// ```
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Short description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Ok => "success",
            Self::Syntax => "syntax or usage error",
            Self::Config => "configuration error",
            Self::Lock => "could not acquire lock",
            Self::Verb => "operation failed",
            Self::LockIntegrity => "lock integrity fault",
        }
    }

    /// Maps a numeric status back to its variant.
    #[must_use]
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::Syntax),
            2 => Some(Self::Config),
            3 => Some(Self::Lock),
            4 => Some(Self::Verb),
            70 => Some(Self::LockIntegrity),
            _ => None,
        }
    }

    /// Returns `true` for [`ExitCode::Ok`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ExitCode; 6] = [
        ExitCode::Ok,
        ExitCode::Syntax,
        ExitCode::Config,
        ExitCode::Lock,
        ExitCode::Verb,
        ExitCode::LockIntegrity,
    ];

    #[test]
    fn numeric_values_are_stable() {
        let values: Vec<i32> = ALL.iter().map(|code| code.as_i32()).collect();
        assert_eq!(values, [0, 1, 2, 3, 4, 70]);
    }

    #[test]
    fn from_i32_inverts_as_i32() {
        for code in ALL {
            assert_eq!(ExitCode::from_i32(code.as_i32()), Some(code));
        }
        assert_eq!(ExitCode::from_i32(23), None);
    }

    #[test]
    fn display_includes_number() {
        assert_eq!(ExitCode::Lock.to_string(), "could not acquire lock (3)");
        assert!(ExitCode::Ok.is_success());
        assert!(!ExitCode::Verb.is_success());
    }
}
