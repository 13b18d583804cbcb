//! Command execution engine.

use std::fmt;
use std::process::{self, Child, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::interrupt::InterruptGuard;
use super::result::{ExecutionResult, Outcome, RunningStatus};
use super::state::ExecutionState;
use crate::command::{describe, Command, CommandBuilder, ShellCommand};
use crate::error::ClitoolsError;
use crate::Result;

/// Default poll interval while an interactive child is alive.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default shell used to run built command lines.
pub const DEFAULT_SHELL: &str = "sh";

type Finisher = Box<dyn FnMut()>;
type StartupCallback<'a> = Box<dyn FnMut(&mut Child) + 'a>;
type RunningCallback<'a> = Box<dyn FnMut(&mut Child, &RunningStatus) + 'a>;

/// Callbacks and timing for [`Executor::execute_interactive`].
pub struct InteractiveOptions<'a> {
    startup: Option<StartupCallback<'a>>,
    running: Option<RunningCallback<'a>>,
    poll_interval: Duration,
    catch_interrupts: bool,
}

impl<'a> InteractiveOptions<'a> {
    /// Options with no callbacks and the default poll interval.
    pub fn new() -> Self {
        Self {
            startup: None,
            running: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            catch_interrupts: true,
        }
    }

    /// Called once right after the child is spawned.
    pub fn on_startup(mut self, callback: impl FnMut(&mut Child) + 'a) -> Self {
        self.startup = Some(Box::new(callback));
        self
    }

    /// Called on every poll while the child is alive.
    ///
    /// The child handle is mutable, so a callback may signal or kill it.
    pub fn on_running(mut self, callback: impl FnMut(&mut Child, &RunningStatus) + 'a) -> Self {
        self.running = Some(Box::new(callback));
        self
    }

    /// Set the poll interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Whether to install the process-wide Ctrl-C handler (default `true`).
    ///
    /// Turn this off when the embedding program handles SIGINT itself.
    /// Ctrl-C is then only seen through the child's exit status.
    pub fn catch_interrupts(mut self, catch: bool) -> Self {
        self.catch_interrupts = catch;
        self
    }
}

impl Default for InteractiveOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs one command at a time, capturing output or attached to the terminal.
///
/// Finisher callbacks run after every attempt, successful or not, before
/// any error is returned to the caller.
pub struct Executor {
    command: Option<Command>,
    shell: String,
    strict: bool,
    state: ExecutionState,
    result: Option<ExecutionResult>,
    exit_code: Option<i32>,
    finishers: Vec<Finisher>,
}

impl Executor {
    /// Create an executor for `command`.
    pub fn new(command: impl Into<Command>) -> Self {
        Self {
            command: Some(command.into()),
            ..Self::default()
        }
    }

    /// Run built lines through a different shell.
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Set strict mode: non-zero exit codes become errors.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set strict mode in place.
    pub fn set_strict(&mut self, strict: bool) -> &mut Self {
        self.strict = strict;
        self
    }

    /// Check if strict mode is on.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Attach a new command, discarding captured state of the previous run.
    pub fn set_command(&mut self, command: impl Into<Command>) -> &mut Self {
        self.command = Some(command.into());
        self.reset();
        self
    }

    /// The attached command.
    pub fn command(&self) -> Option<&Command> {
        self.command.as_ref()
    }

    /// Mutable access to the attached command.
    pub fn command_mut(&mut self) -> Option<&mut Command> {
        self.command.as_mut()
    }

    /// Current state of the last attempt.
    pub fn state(&self) -> ExecutionState {
        self.state
    }

    /// Captured stdout lines of the last capture-mode run.
    pub fn output(&self) -> Option<&[String]> {
        self.result.as_ref().map(|r| r.output.as_slice())
    }

    /// Exit code of the last run, in either mode.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Full result of the last capture-mode run.
    pub fn result(&self) -> Option<&ExecutionResult> {
        self.result.as_ref()
    }

    /// Register a cleanup callback run after every execution attempt.
    pub fn add_finisher_callback(&mut self, callback: impl FnMut() + 'static) -> &mut Self {
        self.finishers.push(Box::new(callback));
        self
    }

    /// Run all finisher callbacks once, in registration order.
    pub fn run_finishers(&mut self) {
        for finisher in &mut self.finishers {
            finisher();
        }
    }

    /// Run the command capturing stdout lines and exit code.
    ///
    /// Stdin is closed and the terminal is not attached. With strict mode
    /// a non-zero exit returns [`ClitoolsError::ProcessFailed`]; the
    /// captured result stays available through [`result`](Self::result).
    pub fn execute(&mut self) -> Result<&ExecutionResult> {
        self.reset();
        let attempt = self.run_captured();
        self.run_finishers();
        let result = attempt?;

        let exit_code = result.exit_code;
        let command = self.command_name();
        let strict = self.strict;
        self.exit_code = Some(exit_code);
        let stored = self.result.insert(result);

        if strict && exit_code != 0 {
            debug!(command = %command, exit_code, "process failed");
            return Err(ClitoolsError::ProcessFailed { command, exit_code });
        }
        Ok(stored)
    }

    /// Run the command attached to our own stdin, stdout and stderr.
    ///
    /// A child stopped by a signal yields [`Outcome::Interrupted`] even in
    /// strict mode. Failing to spawn is always an error.
    ///
    /// # Signals
    ///
    /// The first call installs a process-wide Ctrl-C handler that stays
    /// for the life of the process. While a child runs, Ctrl-C only marks
    /// the run as interrupted. At any other time it exits the process with
    /// code 130 without running finishers or destructors. Use
    /// [`InteractiveOptions::catch_interrupts`] to keep SIGINT untouched.
    pub fn execute_interactive(&mut self, mut options: InteractiveOptions<'_>) -> Result<Outcome> {
        self.reset();
        let attempt = self.run_interactive(&mut options);
        self.run_finishers();
        let outcome = attempt?;
        self.exit_code = Some(outcome.exit_code());

        match outcome {
            Outcome::Failed(exit_code) if self.strict => Err(ClitoolsError::ProcessFailed {
                command: self.command_name(),
                exit_code,
            }),
            Outcome::Interrupted(signal) => {
                info!("process {} stopped by signal {}", self.command_name(), signal);
                Ok(outcome)
            }
            _ => Ok(outcome),
        }
    }

    fn reset(&mut self) {
        self.state = ExecutionState::Idle;
        self.result = None;
        self.exit_code = None;
    }

    fn command_name(&self) -> String {
        self.command.as_ref().map(|c| describe(c)).unwrap_or_default()
    }

    /// Validate and render the attached command.
    fn prepare(&mut self) -> Result<(String, String)> {
        let prepared = match self.command.as_ref() {
            None => Err(ClitoolsError::NoCommand),
            Some(c) if !c.is_executable() => Err(ClitoolsError::NotExecutable(describe(c))),
            Some(c) => c.build().map(|line| (describe(c), line)),
        };

        match prepared {
            Ok(p) => {
                self.state.transition_to(ExecutionState::Built)?;
                Ok(p)
            }
            Err(e) => {
                self.state.transition_to(ExecutionState::Crashed)?;
                Err(e)
            }
        }
    }

    fn shell_process(&self, line: &str) -> process::Command {
        let mut process = process::Command::new(&self.shell);
        process.arg("-c").arg(line);
        process
    }

    fn run_captured(&mut self) -> Result<ExecutionResult> {
        let (name, line) = self.prepare()?;
        debug!(command = %name, "capturing: {}", line);

        let start = Instant::now();
        let output = match self.shell_process(&line).stdin(Stdio::null()).output() {
            Ok(output) => output,
            Err(source) => {
                self.state.transition_to(ExecutionState::Crashed)?;
                return Err(ClitoolsError::Spawn {
                    command: name,
                    source,
                });
            }
        };

        let exit_code = exit_code_of(output.status);
        self.state.transition_to(if exit_code == 0 {
            ExecutionState::Succeeded
        } else {
            ExecutionState::Failed
        })?;

        Ok(ExecutionResult::new(
            &output.stdout,
            &output.stderr,
            exit_code,
            start.elapsed(),
        ))
    }

    fn run_interactive(&mut self, options: &mut InteractiveOptions<'_>) -> Result<Outcome> {
        let (name, line) = self.prepare()?;
        debug!(command = %name, "interactive: {}", line);

        let guard = if options.catch_interrupts {
            InterruptGuard::begin()
        } else {
            InterruptGuard::passive()
        };
        let spawned = self
            .shell_process(&line)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(source) => {
                self.state.transition_to(ExecutionState::Crashed)?;
                return Err(ClitoolsError::Spawn {
                    command: name,
                    source,
                });
            }
        };

        let start = Instant::now();
        if let Some(startup) = options.startup.as_mut() {
            startup(&mut child);
        }

        let mut polls = 0u64;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    polls += 1;
                    if let Some(running) = options.running.as_mut() {
                        let status = RunningStatus {
                            pid: child.id(),
                            elapsed: start.elapsed(),
                            polls,
                        };
                        running(&mut child, &status);
                    }
                    std::thread::sleep(options.poll_interval);
                }
                Err(e) => {
                    self.state.transition_to(ExecutionState::Crashed)?;
                    return Err(ClitoolsError::Io(e));
                }
            }
        };

        let outcome = classify(status, guard.interrupted());
        drop(guard);

        self.state.transition_to(match outcome {
            Outcome::Success(_) => ExecutionState::Succeeded,
            Outcome::Failed(_) => ExecutionState::Failed,
            Outcome::Interrupted(_) => ExecutionState::Interrupted,
        })?;
        Ok(outcome)
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self {
            command: None,
            shell: DEFAULT_SHELL.to_string(),
            strict: true,
            state: ExecutionState::Idle,
            result: None,
            exit_code: None,
            finishers: Vec::new(),
        }
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("command", &self.command)
            .field("shell", &self.shell)
            .field("strict", &self.strict)
            .field("state", &self.state)
            .field("exit_code", &self.exit_code)
            .field("finishers", &self.finishers.len())
            .finish()
    }
}

/// Map an exit status to the three interactive outcomes.
///
/// A shell whose child died of Ctrl-C often exits `128 + signal` instead
/// of dying itself; that only counts as interruption when Ctrl-C was
/// actually seen.
fn classify(status: ExitStatus, interrupted: bool) -> Outcome {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Outcome::Interrupted(signal);
        }
    }

    match status.code() {
        Some(0) => Outcome::Success(0),
        Some(code) if interrupted && code > 128 => Outcome::Interrupted(code - 128),
        Some(code) => Outcome::Failed(code),
        None => Outcome::Interrupted(-1),
    }
}

fn exit_code_of(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    status.code().unwrap_or(-1)
}

/// Simple one-shot capture of a trusted command line.
pub fn execute_simple(command_line: &str) -> Result<ExecutionResult> {
    let mut command = CommandBuilder::default();
    command.parse(command_line)?;
    let mut executor = Executor::new(command);
    let result = executor.execute()?.clone();
    Ok(result)
}
