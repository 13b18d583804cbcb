//! Several commands merged into one output stream.

use super::builder::{describe, OutputTail};
use super::{Command, ShellCommand};
use crate::error::ClitoolsError;
use crate::Result;

/// Runs sub-commands in sequence as one subshell: `( a ; b ; c )`.
///
/// Redirect and pipes set on the combined command apply to the merged
/// output, e.g. a structure dump and a data dump written to one file.
#[derive(Debug, Clone, Default)]
pub struct CombinedOutputCommand {
    commands: Vec<Command>,
    tail: OutputTail,
}

impl CombinedOutputCommand {
    /// Create an empty combined command.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sub-command. It must be executable now.
    pub fn add_command(&mut self, command: impl Into<Command>) -> Result<&mut Self> {
        let command = command.into();
        if !command.is_executable() {
            return Err(ClitoolsError::NotExecutable(describe(&command)));
        }
        self.commands.push(command);
        Ok(self)
    }

    /// Sub-commands in execution order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Set a raw redirection fragment for the merged output.
    pub fn set_output_redirect(&mut self, raw: impl Into<String>) -> &mut Self {
        self.tail.set_redirect(raw.into());
        self
    }

    /// Redirect the merged output into `path` (escaped).
    pub fn set_output_redirect_to_file(&mut self, path: impl AsRef<str>) -> Result<&mut Self> {
        self.tail.set_redirect_to_file(path.as_ref())?;
        Ok(self)
    }

    /// Remove any output redirection.
    pub fn clear_output_redirect(&mut self) -> &mut Self {
        self.tail.clear_redirect();
        self
    }

    /// Pipe the merged output into `command`.
    pub fn add_pipe_command(&mut self, command: impl Into<Command>) -> &mut Self {
        self.tail.add_pipe(command.into());
        self
    }
}

impl ShellCommand for CombinedOutputCommand {
    fn build(&self) -> Result<String> {
        if self.commands.is_empty() {
            return Err(ClitoolsError::NotExecutable(
                "combined output command without sub-commands".to_string(),
            ));
        }

        let parts = self
            .commands
            .iter()
            .map(|c| c.build())
            .collect::<Result<Vec<_>>>()?;
        let mut line = format!("( {} )", parts.join(" ; "));
        self.tail.render_onto(&mut line)?;
        Ok(line)
    }

    fn is_executable(&self) -> bool {
        !self.commands.is_empty()
    }

    fn name(&self) -> &str {
        self.commands.first().map_or("", |c| c.name())
    }
}
