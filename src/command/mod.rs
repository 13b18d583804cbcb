//! Shell command construction.
//!
//! This module builds shell-safe command lines:
//! - Escaped, raw and templated arguments
//! - Output redirection and pipes
//! - Environment variable prefixes
//! - Remote (ssh), container (docker exec) and combined-output wrappers
//!
//! # Example
//!
//! ```
//! use clitools::command::{CommandBuilder, ShellCommand};
//!
//! # fn main() -> clitools::Result<()> {
//! let mut grep = CommandBuilder::new("grep");
//! grep.add_argument("-v")?.add_argument("^#")?;
//!
//! let mut cat = CommandBuilder::new("cat");
//! cat.add_argument("/etc/hosts")?.add_pipe_command(grep);
//!
//! assert_eq!(cat.build()?, "cat '/etc/hosts' | grep '-v' '^#'");
//! # Ok(())
//! # }
//! ```

mod builder;
mod combined;
mod container;
mod remote;
mod template;

pub use builder::CommandBuilder;
pub use combined::CombinedOutputCommand;
pub use container::{ContainerCommand, DEFAULT_CONTAINER_RUNTIME};
pub use remote::{RemoteCommand, DEFAULT_TRANSPORT};

pub(crate) use builder::describe;

use crate::Result;

/// Anything that renders to one executable shell line.
pub trait ShellCommand {
    /// Render the full command line.
    fn build(&self) -> Result<String>;

    /// Whether `build` can succeed at all.
    fn is_executable(&self) -> bool;

    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    /// Tokens spliced into another command's argument list.
    ///
    /// Composite commands have no argv of their own and splice as their
    /// whole rendered line.
    fn splice_parts(&self) -> Result<Vec<String>> {
        Ok(vec![self.build()?])
    }
}

/// Any command variant, owned.
///
/// Pipes and combined sub-commands hold `Command` values, so cloning a
/// command deep-copies its whole nested graph.
#[derive(Debug, Clone)]
pub enum Command {
    Plain(CommandBuilder),
    Remote(RemoteCommand),
    Container(ContainerCommand),
    Combined(CombinedOutputCommand),
}

impl Command {
    fn inner(&self) -> &dyn ShellCommand {
        match self {
            Command::Plain(c) => c,
            Command::Remote(c) => c,
            Command::Container(c) => c,
            Command::Combined(c) => c,
        }
    }
}

impl ShellCommand for Command {
    fn build(&self) -> Result<String> {
        self.inner().build()
    }

    fn is_executable(&self) -> bool {
        self.inner().is_executable()
    }

    fn name(&self) -> &str {
        self.inner().name()
    }

    fn splice_parts(&self) -> Result<Vec<String>> {
        self.inner().splice_parts()
    }
}

impl From<CommandBuilder> for Command {
    fn from(c: CommandBuilder) -> Self {
        Command::Plain(c)
    }
}

impl From<RemoteCommand> for Command {
    fn from(c: RemoteCommand) -> Self {
        Command::Remote(c)
    }
}

impl From<ContainerCommand> for Command {
    fn from(c: ContainerCommand) -> Self {
        Command::Container(c)
    }
}

impl From<CombinedOutputCommand> for Command {
    fn from(c: CombinedOutputCommand) -> Self {
        Command::Combined(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_delegates() {
        let mut echo = CommandBuilder::new("echo");
        echo.add_argument("hi").unwrap();
        let cmd = Command::from(echo);

        assert!(cmd.is_executable());
        assert_eq!(cmd.name(), "echo");
        assert_eq!(cmd.build().unwrap(), "echo 'hi'");
    }

    #[test]
    fn test_clone_is_deep() {
        let mut tail = CommandBuilder::new("tail");
        tail.add_argument("-n1").unwrap();
        let mut cat = CommandBuilder::new("cat");
        cat.add_pipe_command(tail);

        let original = Command::from(cat);
        let mut copy = original.clone();
        if let Command::Plain(c) = &mut copy {
            c.clear_pipes();
        }

        assert_eq!(original.build().unwrap(), "cat | tail '-n1'");
        assert_eq!(copy.build().unwrap(), "cat");
    }

    #[test]
    fn test_empty_command_not_executable() {
        let cmd = Command::from(CommandBuilder::default());
        assert!(!cmd.is_executable());
        assert!(cmd.build().is_err());
    }
}
