//! Remote execution through a transport program (ssh).

use super::builder::describe;
use super::{Command, CommandBuilder, ShellCommand};
use crate::error::ClitoolsError;
use crate::Result;

/// Default transport binary.
pub const DEFAULT_TRANSPORT: &str = "ssh";

/// Runs an inner command on a remote host.
///
/// Renders as `<transport> [options] '<host>' '<inner line>'`: the inner
/// command travels as one escaped argument and is re-parsed by the
/// remote shell.
#[derive(Debug, Clone)]
pub struct RemoteCommand {
    transport: CommandBuilder,
    host: String,
    inner: Box<Command>,
}

impl RemoteCommand {
    /// Wrap `inner` for execution on `host` via the default transport.
    pub fn new(host: impl Into<String>, inner: impl Into<Command>) -> Self {
        Self {
            transport: CommandBuilder::new(DEFAULT_TRANSPORT),
            host: host.into(),
            inner: Box::new(inner.into()),
        }
    }

    /// Use a different transport binary.
    pub fn with_transport(mut self, program: impl Into<String>) -> Self {
        self.transport.set_command(program);
        self
    }

    /// Transport invocation, for options placed before the host (`-t`,
    /// `-p 2222`) and for redirect/pipes applied locally.
    pub fn transport_mut(&mut self) -> &mut CommandBuilder {
        &mut self.transport
    }

    /// Target host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The wrapped command.
    pub fn inner(&self) -> &Command {
        &self.inner
    }

    /// Mutable access to the wrapped command.
    pub fn inner_mut(&mut self) -> &mut Command {
        &mut self.inner
    }
}

impl ShellCommand for RemoteCommand {
    fn build(&self) -> Result<String> {
        if !self.inner.is_executable() {
            return Err(ClitoolsError::NotExecutable(describe(self.inner.as_ref())));
        }
        let mut outer = self.transport.clone();
        outer
            .add_argument(&self.host)?
            .append(self.inner.as_ref(), true)?;
        outer.build()
    }

    fn is_executable(&self) -> bool {
        self.transport.is_executable() && !self.host.is_empty() && self.inner.is_executable()
    }

    fn name(&self) -> &str {
        self.transport.name()
    }
}
