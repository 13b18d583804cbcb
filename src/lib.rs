//! # clitools
//!
//! Shell-safe command construction and execution for developer tooling.
//!
//! This crate builds command lines for a POSIX shell without letting
//! untrusted values break out of their argument, then runs them either
//! capturing output or attached to the terminal.
//!
//! ## Features
//!
//! - **Escaping**: single-quote escaping for arguments, templates and env values
//! - **Composition**: pipes, redirects, remote (ssh), container (docker exec)
//!   and combined-output commands that nest into each other
//! - **Execution**: capture mode, interactive mode with polling callbacks,
//!   strict exit-code checking and finisher callbacks
//! - **MySQL**: client, query and dump commands from explicit connection settings
//!
//! ## Quick Start
//!
//! ```no_run
//! use clitools::command::{CommandBuilder, ContainerCommand, ShellCommand};
//! use clitools::execution::Executor;
//!
//! fn main() -> clitools::Result<()> {
//!     clitools::logging::try_init().ok();
//!
//!     let mut psql = CommandBuilder::new("psql");
//!     psql.add_argument("-c")?.add_argument("SELECT 1")?;
//!
//!     let container = ContainerCommand::new("db", psql);
//!     println!("{}", container.build()?);
//!
//!     let mut executor = Executor::new(container);
//!     for line in &executor.execute()?.output {
//!         println!("{}", line);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod escape;
pub mod execution;
pub mod logging;
pub mod mysql;

// Re-export commonly used types
pub use command::{
    CombinedOutputCommand, Command, CommandBuilder, ContainerCommand, RemoteCommand, ShellCommand,
};
pub use error::{ClitoolsError, Result};
pub use escape::escape;
pub use execution::{ExecutionResult, ExecutionState, Executor, InteractiveOptions, Outcome};
pub use mysql::{MysqlConnection, MysqlSettings};
