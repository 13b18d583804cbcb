//! Execution inside a container through `docker exec`.

use super::builder::describe;
use super::{CommandBuilder, ShellCommand};
use crate::error::ClitoolsError;
use crate::escape::escape;
use crate::Result;

/// Default container runtime binary.
pub const DEFAULT_CONTAINER_RUNTIME: &str = "docker";

/// Shell started inside the container.
const CONTAINER_SHELL: &str = "sh";

/// Runs a command inside a container.
///
/// The wrapped command's own redirect and pipes apply to the outer
/// runtime invocation on the host. Everything else is rendered as the
/// inner line and handed to `sh -c` inside the container:
///
/// `docker exec -i '<container>' sh -c '<inner line>' [redirect] [| pipes]`
#[derive(Debug, Clone)]
pub struct ContainerCommand {
    runtime: String,
    container: Option<String>,
    command: CommandBuilder,
}

impl ContainerCommand {
    /// Wrap `command` for execution inside `container`.
    pub fn new(container: impl Into<String>, command: CommandBuilder) -> Self {
        Self {
            runtime: DEFAULT_CONTAINER_RUNTIME.to_string(),
            container: Some(container.into()),
            command,
        }
    }

    /// Wrap `command` without a target yet; building fails until
    /// [`set_container`](Self::set_container) is called.
    pub fn without_container(command: CommandBuilder) -> Self {
        Self {
            runtime: DEFAULT_CONTAINER_RUNTIME.to_string(),
            container: None,
            command,
        }
    }

    /// Use a different runtime binary (e.g. `podman`).
    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }

    /// Set the target container.
    pub fn set_container(&mut self, container: impl Into<String>) -> &mut Self {
        self.container = Some(container.into());
        self
    }

    /// Target container, if set.
    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    /// The wrapped command.
    pub fn command(&self) -> &CommandBuilder {
        &self.command
    }

    /// Mutable access to the wrapped command.
    pub fn command_mut(&mut self) -> &mut CommandBuilder {
        &mut self.command
    }
}

impl ShellCommand for ContainerCommand {
    fn build(&self) -> Result<String> {
        let container = match self.container.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => return Err(ClitoolsError::ContainerNotSet),
        };
        if !self.command.is_executable() {
            return Err(ClitoolsError::NotExecutable(describe(&self.command)));
        }

        let mut inner = self.command.clone();
        let tail = inner.take_tail();
        let inner_line = inner.build()?;

        let mut outer = CommandBuilder::new(self.runtime.as_str());
        outer
            .add_argument_raw("exec")?
            .add_argument_raw("-i")?
            .add_argument(container)?
            .add_argument_raw(CONTAINER_SHELL)?
            .add_argument_raw("-c")?
            .add_argument_raw(escape(&inner_line)?)?;

        let mut line = outer.build()?;
        tail.render_onto(&mut line)?;
        Ok(line)
    }

    fn is_executable(&self) -> bool {
        self.container.as_deref().is_some_and(|c| !c.is_empty()) && self.command.is_executable()
    }

    fn name(&self) -> &str {
        self.command.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mysql_query() -> CommandBuilder {
        let mut c = CommandBuilder::new("mysql");
        c.add_argument_template("-e %s", &["SELECT 'a b'"]).unwrap();
        c
    }

    #[test]
    fn test_container_build() {
        let mut echo = CommandBuilder::new("echo");
        echo.add_argument("hi").unwrap();
        let cmd = ContainerCommand::new("web", echo);

        assert_eq!(
            cmd.build().unwrap(),
            r"docker exec -i 'web' sh -c 'echo '\''hi'\'''"
        );
    }

    #[test]
    fn test_container_tail_applies_outside() {
        let mut dump = CommandBuilder::new("mysqldump");
        dump.add_argument("app").unwrap();
        dump.set_output_redirect_to_file("/tmp/app.sql").unwrap();
        dump.add_pipe_command(CommandBuilder::new("gzip"));

        let cmd = ContainerCommand::new("db", dump);
        assert_eq!(
            cmd.build().unwrap(),
            r"docker exec -i 'db' sh -c 'mysqldump '\''app'\''' > '/tmp/app.sql' | gzip"
        );
        // building does not mutate the wrapped command
        assert_eq!(cmd.command().pipes().len(), 1);
        assert!(cmd.command().output_redirect().is_some());
    }

    #[test]
    fn test_container_environment_stays_inside() {
        let mut c = CommandBuilder::new("env");
        c.add_environment_var("FOO", "bar").unwrap();
        let cmd = ContainerCommand::new("app", c).with_runtime("podman");

        assert_eq!(
            cmd.build().unwrap(),
            r"podman exec -i 'app' sh -c 'FOO='\''bar'\'' env'"
        );
    }

    #[test]
    fn test_container_not_set() {
        let mut cmd = ContainerCommand::without_container(mysql_query());
        assert!(!cmd.is_executable());
        assert!(matches!(cmd.build(), Err(ClitoolsError::ContainerNotSet)));

        cmd.set_container("db");
        assert!(cmd.is_executable());
        assert!(cmd.build().is_ok());
    }

    #[test]
    fn test_container_requires_command_name() {
        let cmd = ContainerCommand::new("db", CommandBuilder::default());
        assert!(matches!(cmd.build(), Err(ClitoolsError::NotExecutable(_))));
    }
}
