//! Command builder: name, arguments, environment, redirect and pipes.

use std::collections::BTreeMap;

use super::{template, Command, ShellCommand};
use crate::error::ClitoolsError;
use crate::escape::{escape, quote_program};
use crate::Result;

/// Output redirection plus pipe list, shared by every renderable command.
#[derive(Debug, Clone, Default)]
pub(crate) struct OutputTail {
    redirect: Option<String>,
    pipes: Vec<Command>,
}

impl OutputTail {
    pub(crate) fn set_redirect(&mut self, raw: String) {
        self.redirect = Some(raw);
    }

    pub(crate) fn set_redirect_to_file(&mut self, path: &str) -> Result<()> {
        self.redirect = Some(format!("> {}", escape(path)?));
        Ok(())
    }

    pub(crate) fn clear_redirect(&mut self) {
        self.redirect = None;
    }

    pub(crate) fn redirect(&self) -> Option<&str> {
        self.redirect.as_deref()
    }

    pub(crate) fn add_pipe(&mut self, command: Command) {
        self.pipes.push(command);
    }

    pub(crate) fn pipes(&self) -> &[Command] {
        &self.pipes
    }

    pub(crate) fn clear_pipes(&mut self) {
        self.pipes.clear();
    }

    /// Append ` <redirect>` and ` | <pipe>` for each pipe to `line`.
    pub(crate) fn render_onto(&self, line: &mut String) -> Result<()> {
        if let Some(redirect) = &self.redirect {
            line.push(' ');
            line.push_str(redirect);
        }
        for pipe in &self.pipes {
            line.push_str(" | ");
            line.push_str(&pipe.build()?);
        }
        Ok(())
    }
}

/// Mutable builder for one shell command line.
///
/// Arguments are rendered when inserted: escaped ones are quoted right
/// away, raw ones are stored verbatim, and nothing is re-escaped on
/// [`build`](ShellCommand::build).
#[derive(Debug, Clone, Default)]
pub struct CommandBuilder {
    name: String,
    arguments: Vec<String>,
    environment: BTreeMap<String, String>,
    tail: OutputTail,
}

impl CommandBuilder {
    /// Create a builder for the given executable.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder that invokes the running executable again.
    pub fn self_command() -> Result<Self> {
        let exe = std::env::current_exe()?;
        Ok(Self::new(exe.to_string_lossy().into_owned()))
    }

    /// Set or overwrite the executable name.
    pub fn set_command(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    /// Escape `value` and append it as one argument.
    pub fn add_argument(&mut self, value: impl AsRef<str>) -> Result<&mut Self> {
        let escaped = escape(value.as_ref())?;
        self.arguments.push(escaped);
        Ok(self)
    }

    /// Append `value` verbatim. The caller vouches for its shell safety.
    pub fn add_argument_raw(&mut self, value: impl Into<String>) -> Result<&mut Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(ClitoolsError::EmptyArgument("argument"));
        }
        self.arguments.push(value);
        Ok(self)
    }

    /// Escape each param and substitute them into `format` as one argument.
    ///
    /// `add_argument_template("--user=%s", &["ali ce"])` renders
    /// `--user='ali ce'`, which the shell reads as a single token.
    pub fn add_argument_template<S: AsRef<str>>(
        &mut self,
        format: &str,
        params: &[S],
    ) -> Result<&mut Self> {
        let escaped = params
            .iter()
            .map(|p| escape(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let rendered = template::render(format, &escaped)?;
        self.add_argument_raw(rendered)
    }

    /// Append many arguments, escaped or raw.
    ///
    /// All values are validated before any is inserted.
    pub fn add_argument_list<I, S>(&mut self, values: I, escape_values: bool) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rendered = values
            .into_iter()
            .map(|v| {
                let v = v.as_ref();
                if escape_values {
                    escape(v)
                } else if v.is_empty() {
                    Err(ClitoolsError::EmptyArgument("argument"))
                } else {
                    Ok(v.to_string())
                }
            })
            .collect::<Result<Vec<_>>>()?;
        self.arguments.extend(rendered);
        Ok(self)
    }

    /// Set a raw redirection fragment such as `2>&1` or `&> /dev/null`.
    pub fn set_output_redirect(&mut self, raw: impl Into<String>) -> &mut Self {
        self.tail.set_redirect(raw.into());
        self
    }

    /// Redirect stdout into `path` (escaped).
    pub fn set_output_redirect_to_file(&mut self, path: impl AsRef<str>) -> Result<&mut Self> {
        self.tail.set_redirect_to_file(path.as_ref())?;
        Ok(self)
    }

    /// Remove any output redirection.
    pub fn clear_output_redirect(&mut self) -> &mut Self {
        self.tail.clear_redirect();
        self
    }

    /// Pipe this command's stdout into `command`.
    ///
    /// Executability of the pipe is checked when this command is built.
    pub fn add_pipe_command(&mut self, command: impl Into<Command>) -> &mut Self {
        self.tail.add_pipe(command.into());
        self
    }

    /// Drop every pipe command.
    pub fn clear_pipes(&mut self) -> &mut Self {
        self.tail.clear_pipes();
        self
    }

    /// Set `NAME='value'` for the command. Later values for a name win.
    pub fn add_environment_var(
        &mut self,
        name: impl Into<String>,
        value: impl AsRef<str>,
    ) -> Result<&mut Self> {
        let name = name.into();
        if !is_env_name(&name) {
            return Err(ClitoolsError::InvalidEnvironmentName(name));
        }
        let value = value.as_ref();
        if value.is_empty() {
            return Err(ClitoolsError::EmptyArgument("environment value"));
        }
        self.environment.insert(name, escape(value)?);
        Ok(self)
    }

    /// Append another command.
    ///
    /// With `inline`, the other command's full line becomes one escaped
    /// argument (`sudo sh -c '<line>'` style). Without it, the other
    /// command's name and arguments are spliced in as raw tokens; its
    /// environment, redirect and pipes are not carried over.
    pub fn append<C>(&mut self, other: &C, inline: bool) -> Result<&mut Self>
    where
        C: ShellCommand + ?Sized,
    {
        if !other.is_executable() {
            return Err(ClitoolsError::NotExecutable(describe(other)));
        }
        if inline {
            let line = other.build()?;
            self.add_argument(line)
        } else {
            let parts = other.splice_parts()?;
            self.add_argument_list(parts, false)
        }
    }

    /// Split `line` on its first space into name and one raw argument blob.
    ///
    /// Not quote-aware: only pass trusted, already-correct strings.
    /// Existing arguments are replaced.
    pub fn parse(&mut self, line: &str) -> Result<&mut Self> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ClitoolsError::EmptyCommandName);
        }
        self.arguments.clear();
        match line.split_once(' ') {
            Some((name, rest)) => {
                self.name = name.to_string();
                let rest = rest.trim_start();
                if !rest.is_empty() {
                    self.arguments.push(rest.to_string());
                }
            }
            None => self.name = line.to_string(),
        }
        Ok(self)
    }

    /// Rendered arguments in insertion order.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Rendered (escaped) environment values by name.
    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    /// Current output redirection, if any.
    pub fn output_redirect(&self) -> Option<&str> {
        self.tail.redirect()
    }

    /// Pipe commands in order.
    pub fn pipes(&self) -> &[Command] {
        self.tail.pipes()
    }

    /// Take redirect and pipes out, leaving this command bare.
    pub(crate) fn take_tail(&mut self) -> OutputTail {
        std::mem::take(&mut self.tail)
    }

    /// Render everything except redirect and pipes.
    fn render_head(&self) -> Result<String> {
        if self.name.is_empty() {
            return Err(ClitoolsError::EmptyCommandName);
        }

        let mut parts: Vec<String> =
            Vec::with_capacity(self.environment.len() + self.arguments.len() + 1);
        for (k, v) in &self.environment {
            parts.push(format!("{}={}", k, v));
        }
        parts.push(quote_program(&self.name));
        parts.extend(self.arguments.iter().cloned());

        Ok(parts.join(" "))
    }
}

impl ShellCommand for CommandBuilder {
    fn build(&self) -> Result<String> {
        let mut line = self.render_head()?;
        self.tail.render_onto(&mut line)?;
        Ok(line)
    }

    fn is_executable(&self) -> bool {
        !self.name.is_empty()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn splice_parts(&self) -> Result<Vec<String>> {
        if self.name.is_empty() {
            return Err(ClitoolsError::EmptyCommandName);
        }
        let mut parts = Vec::with_capacity(self.arguments.len() + 1);
        parts.push(quote_program(&self.name));
        parts.extend(self.arguments.iter().cloned());
        Ok(parts)
    }
}

pub(crate) fn describe<C: ShellCommand + ?Sized>(command: &C) -> String {
    if command.name().is_empty() {
        "<unnamed command>".to_string()
    } else {
        command.name().to_string()
    }
}

fn is_env_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
