//! `ct` binary entry point.

use std::process::ExitCode;

use clitools::cli::{self, Args, Task};
use clitools::command::{
    Command, CommandBuilder, ContainerCommand, RemoteCommand, ShellCommand,
};
use clitools::config::Config;
use clitools::execution::{Executor, InteractiveOptions, Outcome};
use clitools::mysql::MysqlConnection;
use clitools::{logging, ClitoolsError};
use tracing::{debug, info};

/// Exit code for a session stopped by a signal.
const EXIT_INTERRUPTED: u8 = 130;

fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Run 'ct --help' for usage");
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }

    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let Some(task) = args.task.clone() else {
        cli::print_help();
        return ExitCode::FAILURE;
    };

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Ignore the error: a subscriber may already be installed.
    let _ = logging::try_init_with(config.log_filter());
    debug!("ct v{}", env!("CARGO_PKG_VERSION"));

    match run(&args, &config, task) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(exit_status(e.exit_code().unwrap_or(1)))
        }
    }
}

fn run(args: &Args, config: &Config, task: Task) -> clitools::Result<ExitCode> {
    if args.dry_run {
        println!("{}", build_command(args, config, task)?.build()?);
        return Ok(ExitCode::SUCCESS);
    }

    if task == Task::MysqlPing {
        return mysql_ping(config);
    }

    let command = build_command(args, config, task)?;

    let mut executor = Executor::new(command)
        .with_shell(config.tools.shell.as_str())
        .strict(config.execution.strict);
    let options = InteractiveOptions::new().poll_interval(config.poll_interval());

    Ok(match executor.execute_interactive(options)? {
        Outcome::Success(_) => ExitCode::SUCCESS,
        Outcome::Failed(code) => ExitCode::from(exit_status(code)),
        Outcome::Interrupted(_) => {
            info!("session interrupted");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    })
}

fn build_command(args: &Args, config: &Config, task: Task) -> clitools::Result<Command> {
    match task {
        Task::Exec { argv } => Ok(program(&argv)?.into()),
        Task::Ssh { host, argv } if argv.is_empty() => {
            let mut login = CommandBuilder::new(config.tools.ssh.as_str());
            login.add_argument_raw("-t")?.add_argument(&host)?;
            Ok(login.into())
        }
        Task::Ssh { host, argv } => {
            let mut remote =
                RemoteCommand::new(host, program(&argv)?).with_transport(config.tools.ssh.as_str());
            remote.transport_mut().add_argument_raw("-t")?;
            Ok(remote.into())
        }
        Task::DockerExec { container, argv } => {
            Ok(ContainerCommand::new(container, program(&argv)?)
                .with_runtime(config.tools.docker.as_str())
                .into())
        }
        Task::Sudo { argv } => {
            let mut me = CommandBuilder::self_command()?;
            if let Some(ref path) = args.config {
                me.add_argument("--config")?
                    .add_argument(path.to_string_lossy())?;
            }
            if args.no_strict {
                me.add_argument_raw("--no-strict")?;
            }
            me.add_argument_list(&argv, true)?;

            let mut sudo = CommandBuilder::new("sudo");
            sudo.append(&me, false)?;
            Ok(sudo.into())
        }
        Task::MysqlDump {
            database,
            data_excludes,
            output,
        } => {
            let connection = mysql(config);
            let mut dump = connection.dump_command(&database, &data_excludes)?;
            if let Some(path) = output {
                dump.set_output_redirect_to_file(path.to_string_lossy())?;
            }
            Ok(dump.into())
        }
        Task::MysqlPing => Ok(mysql(config).ping_command()?.into()),
    }
}

fn mysql_ping(config: &Config) -> clitools::Result<ExitCode> {
    let mut connection = mysql(config);
    let settings = connection.settings().clone();
    if !connection.ping()? {
        println!("{}:{} is not answering", settings.host, settings.port);
        return Ok(ExitCode::FAILURE);
    }

    connection.open()?;
    println!("{}:{} is alive", settings.host, settings.port);
    connection.close();
    Ok(ExitCode::SUCCESS)
}

fn mysql(config: &Config) -> MysqlConnection {
    MysqlConnection::new(config.mysql.clone()).with_shell(config.tools.shell.as_str())
}

/// First word is the program, the rest are escaped arguments.
fn program(argv: &[String]) -> clitools::Result<CommandBuilder> {
    let (name, rest) = argv.split_first().ok_or(ClitoolsError::EmptyCommandName)?;
    let mut command = CommandBuilder::new(name.as_str());
    command.add_argument_list(rest, true)?;
    Ok(command)
}

fn exit_status(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}
