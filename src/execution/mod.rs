//! Command execution engine.
//!
//! This module runs built command lines through `sh -c`:
//! - Capture mode: stdout lines and exit code, no terminal
//! - Interactive mode: child attached to our terminal, polled until exit
//! - Finisher callbacks that run after every attempt
//!
//! # Example
//!
//! ```no_run
//! use clitools::command::CommandBuilder;
//! use clitools::execution::{Executor, InteractiveOptions, Outcome};
//!
//! # fn main() -> clitools::Result<()> {
//! let mut ls = CommandBuilder::new("ls");
//! ls.add_argument("/tmp")?;
//!
//! let mut executor = Executor::new(ls);
//! let lines = executor.execute()?.output.clone();
//! println!("{} entries", lines.len());
//!
//! let mut less = CommandBuilder::new("less");
//! less.add_argument("/etc/hosts")?;
//! executor.set_command(less);
//! if let Outcome::Interrupted(signal) = executor.execute_interactive(InteractiveOptions::new())? {
//!     println!("stopped by signal {}", signal);
//! }
//! # Ok(())
//! # }
//! ```

mod executor;
mod interrupt;
mod result;
mod state;

pub use executor::{
    execute_simple, Executor, InteractiveOptions, DEFAULT_POLL_INTERVAL, DEFAULT_SHELL,
};
pub use result::{ExecutionResult, Outcome, RunningStatus};
pub use state::ExecutionState;
