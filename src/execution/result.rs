//! Execution result types.

use std::time::Duration;

/// Result of a capture-mode execution.
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    /// Stdout, split into lines.
    pub output: Vec<String>,
    /// Stderr text as captured.
    pub error_output: String,
    /// Exit code; `128 + signal` when the process was killed.
    pub exit_code: i32,
    /// Execution duration.
    pub duration: Duration,
}

impl ExecutionResult {
    /// Create a result from raw stdout/stderr bytes.
    pub fn new(stdout: &[u8], stderr: &[u8], exit_code: i32, duration: Duration) -> Self {
        Self {
            output: String::from_utf8_lossy(stdout)
                .lines()
                .map(str::to_string)
                .collect(),
            error_output: String::from_utf8_lossy(stderr).into_owned(),
            exit_code,
            duration,
        }
    }

    /// Check if command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout joined back together, trimmed.
    pub fn output_trimmed(&self) -> String {
        self.output.join("\n").trim().to_string()
    }
}

/// How an interactive execution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Exit code 0.
    Success(i32),
    /// Non-zero exit code (only returned when not strict).
    Failed(i32),
    /// Stopped by the given signal; not an error.
    Interrupted(i32),
}

impl Outcome {
    /// Exit code to hand on to our own caller, shell style.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Success(code) | Outcome::Failed(code) => *code,
            Outcome::Interrupted(signal) => 128 + signal,
        }
    }

    /// Check if the process stopped because of a signal.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Outcome::Interrupted(_))
    }
}

/// Live process information handed to running callbacks.
#[derive(Debug, Clone, Copy)]
pub struct RunningStatus {
    /// Process ID of the child.
    pub pid: u32,
    /// Time since spawn.
    pub elapsed: Duration,
    /// Number of polls so far, starting at 1.
    pub polls: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_result_new() {
        let result = ExecutionResult::new(
            b"line1\nline2\n",
            b"warn\n",
            0,
            Duration::from_millis(100),
        );

        assert_eq!(result.output, vec!["line1", "line2"]);
        assert_eq!(result.error_output, "warn\n");
        assert_eq!(result.duration, Duration::from_millis(100));
        assert!(result.success());
    }

    #[test]
    fn test_execution_result_empty_output() {
        let result = ExecutionResult::new(b"", b"", 3, Duration::ZERO);
        assert!(result.output.is_empty());
        assert!(!result.success());
    }

    #[test]
    fn test_output_trimmed() {
        let result = ExecutionResult::new(b"  hello\nworld  \n", b"", 0, Duration::ZERO);
        assert_eq!(result.output_trimmed(), "hello\nworld");
    }

    #[test]
    fn test_outcome_exit_code() {
        assert_eq!(Outcome::Success(0).exit_code(), 0);
        assert_eq!(Outcome::Failed(7).exit_code(), 7);
        assert_eq!(Outcome::Interrupted(2).exit_code(), 130);
        assert!(Outcome::Interrupted(15).is_interrupted());
        assert!(!Outcome::Failed(1).is_interrupted());
    }
}
