//! Command-line interface for the `ct` binary.
//!
//! Uses lexopt for minimal binary size overhead (~34KB). Global options
//! come first; everything after a pass-through subcommand name is handed
//! on untouched.

use std::ffi::OsString;
use std::path::PathBuf;

/// A subcommand to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Run a program interactively.
    Exec { argv: Vec<String> },
    /// Run a program (or a login shell) on a remote host.
    Ssh { host: String, argv: Vec<String> },
    /// Run a program inside a container.
    DockerExec { container: String, argv: Vec<String> },
    /// Re-run this tool under sudo.
    Sudo { argv: Vec<String> },
    /// Check the configured MySQL server.
    MysqlPing,
    /// Dump a database: structure of everything plus filtered data.
    MysqlDump {
        database: String,
        data_excludes: Vec<String>,
        output: Option<PathBuf>,
    },
}

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Print built command lines instead of running them.
    pub dry_run: bool,
    /// Do not fail on non-zero exit codes.
    pub no_strict: bool,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
    /// Subcommand, if any.
    pub task: Option<Task>,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Short('n') | Long("dry-run") => {
                result.dry_run = true;
            }
            Long("no-strict") => {
                result.no_strict = true;
            }
            Value(val) => {
                let name = val.string()?;
                result.task = Some(parse_task(&name, &mut parser)?);
                break;
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

fn parse_task(name: &str, parser: &mut lexopt::Parser) -> Result<Task, ArgsError> {
    match name {
        "exec" => {
            let argv = rest(parser)?;
            if argv.is_empty() {
                return Err(ArgsError::MissingValue("exec", "command"));
            }
            Ok(Task::Exec { argv })
        }
        "ssh" => {
            let mut argv = rest(parser)?.into_iter();
            let host = argv.next().ok_or(ArgsError::MissingValue("ssh", "host"))?;
            Ok(Task::Ssh {
                host,
                argv: argv.collect(),
            })
        }
        "docker:exec" => {
            let mut argv = rest(parser)?.into_iter();
            let container = argv
                .next()
                .ok_or(ArgsError::MissingValue("docker:exec", "container"))?;
            let argv: Vec<String> = argv.collect();
            if argv.is_empty() {
                return Err(ArgsError::MissingValue("docker:exec", "command"));
            }
            Ok(Task::DockerExec { container, argv })
        }
        "sudo" => {
            let argv = rest(parser)?;
            if argv.is_empty() {
                return Err(ArgsError::MissingValue("sudo", "subcommand"));
            }
            Ok(Task::Sudo { argv })
        }
        "mysql:ping" => {
            if let Some(extra) = rest(parser)?.into_iter().next() {
                return Err(ArgsError::UnexpectedArgument(extra));
            }
            Ok(Task::MysqlPing)
        }
        "mysql:dump" => parse_mysql_dump(parser),
        other => Err(ArgsError::UnknownCommand(other.to_string())),
    }
}

fn parse_mysql_dump(parser: &mut lexopt::Parser) -> Result<Task, ArgsError> {
    use lexopt::prelude::*;

    let mut database = None;
    let mut data_excludes = Vec::new();
    let mut output = None;

    while let Some(arg) = parser.next()? {
        match arg {
            Short('o') | Long("output") => {
                output = Some(parser.value()?.parse()?);
            }
            Long("data-exclude") => {
                data_excludes.push(parser.value()?.parse()?);
            }
            Value(val) if database.is_none() => {
                database = Some(val.string()?);
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(Task::MysqlDump {
        database: database.ok_or(ArgsError::MissingValue("mysql:dump", "database"))?,
        data_excludes,
        output,
    })
}

/// Remaining arguments verbatim, minus a leading `--`.
fn rest(parser: &mut lexopt::Parser) -> Result<Vec<String>, ArgsError> {
    let mut argv = parser
        .raw_args()?
        .map(|a| a.into_string().map_err(ArgsError::NotUnicode))
        .collect::<Result<Vec<_>, _>>()?;
    if argv.first().map(String::as_str) == Some("--") {
        argv.remove(0);
    }
    Ok(argv)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"ct {version}
Developer toolbelt for common sysadmin and devops tasks

USAGE:
    ct [OPTIONS] <COMMAND> [ARGS...]

COMMANDS:
    exec <cmd> [args...]                  Run a program attached to the terminal
    ssh <host> [cmd...]                   Run a command (or a shell) on a remote host
    docker:exec <container> <cmd...>      Run a command inside a container
    sudo <command...>                     Re-run ct with the given command under sudo
    mysql:ping                            Check the configured MySQL server
    mysql:dump <db> [OPTIONS]             Dump structure and data of a database
        --data-exclude <table>            Dump structure only for this table (repeatable)
        -o, --output <FILE>               Write the dump to a file

OPTIONS:
    -c, --config <FILE>     Path to configuration file (JSON)
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -n, --dry-run           Print the command line instead of running it
        --no-strict         Do not treat non-zero exit codes as errors
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    CLITOOLS_SHELL          Shell running built commands [default: sh]
    CLITOOLS_SSH            Remote transport [default: ssh]
    CLITOOLS_DOCKER         Container runtime [default: docker]
    CLITOOLS_MYSQL_HOST     MySQL host (overrides config)
    CLITOOLS_MYSQL_USER     MySQL user (overrides config)
    CLITOOLS_MYSQL_PASSWORD MySQL password (overrides config)
    CLITOOLS_LOG_LEVEL      Log level (overrides config)
    RUST_LOG                Alternative log level setting

EXAMPLES:
    # Tail a log on a remote host
    ct ssh deploy@web1 tail -f /var/log/nginx/error.log

    # Open a shell in a container
    ct docker:exec app bash

    # Show what a dump would run
    ct -n mysql:dump shop --data-exclude sessions -o shop.sql
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("ct {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Subcommand is missing a required value.
    MissingValue(&'static str, &'static str),
    /// Unknown subcommand.
    UnknownCommand(String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
    /// Pass-through argument is not valid UTF-8.
    NotUnicode(OsString),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::MissingValue(command, what) => {
                write!(f, "{} requires a {}", command, what)
            }
            Self::UnknownCommand(name) => write!(f, "unknown command: '{}'", name),
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
            Self::NotUnicode(arg) => {
                write!(f, "argument is not valid unicode: {:?}", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
