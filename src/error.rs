//! Error types for clitools.

use thiserror::Error;

/// Main error type for command construction and execution.
#[derive(Error, Debug)]
pub enum ClitoolsError {
    /// An argument, environment value or escape input was empty.
    #[error("empty {0} is not allowed")]
    EmptyArgument(&'static str),

    /// Argument contains a character no shell token can carry.
    #[error("invalid character in argument: {0:?}")]
    InvalidCharacter(char),

    /// Environment variable name is not a valid shell identifier.
    #[error("invalid environment variable name: '{0}'")]
    InvalidEnvironmentName(String),

    /// Command name was never set.
    #[error("command name is not set")]
    EmptyCommandName,

    /// A sub-command handed to append/combine cannot be executed.
    #[error("command is not executable: {0}")]
    NotExecutable(String),

    /// Container wrapper was built without a target container.
    #[error("container is not set")]
    ContainerNotSet,

    /// Argument template received fewer parameters than placeholders.
    #[error("template '{format}' expects {expected} parameter(s), got {given}")]
    Template {
        format: String,
        expected: usize,
        given: usize,
    },

    /// Invalid executor state transition attempted.
    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        from: crate::execution::ExecutionState,
        to: crate::execution::ExecutionState,
    },

    /// Executor was run without a command attached.
    #[error("no command attached to executor")]
    NoCommand,

    /// The process could not be started at all.
    #[error("failed to spawn process {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited non-zero in strict mode.
    #[error("process {command} did not finish successfully (exit code {exit_code})")]
    ProcessFailed { command: String, exit_code: i32 },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClitoolsError {
    /// Exit code carried by the error, if the process actually ran.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ProcessFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}

/// Convenience Result type for clitools operations.
pub type Result<T> = std::result::Result<T, ClitoolsError>;
