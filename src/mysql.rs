//! MySQL connection settings and the commands built from them.
//!
//! A [`MysqlConnection`] is passed to whoever needs the database instead
//! of living in process-wide state. All access goes through the mysql
//! client binaries, composed with [`CommandBuilder`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::command::{CombinedOutputCommand, CommandBuilder};
use crate::execution::Executor;
use crate::Result;

/// Connection settings for the mysql client tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MysqlSettings {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Login user.
    pub user: String,
    /// Password, handed over via `MYSQL_PWD` rather than argv.
    pub password: Option<String>,
}

impl Default for MysqlSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: None,
        }
    }
}

/// An explicit MySQL connection with `open` / `ping` / `close` lifecycle.
#[derive(Debug, Clone)]
pub struct MysqlConnection {
    settings: MysqlSettings,
    shell: String,
    open: bool,
}

impl MysqlConnection {
    /// Create a closed connection.
    pub fn new(settings: MysqlSettings) -> Self {
        Self {
            settings,
            shell: crate::execution::DEFAULT_SHELL.to_string(),
            open: false,
        }
    }

    /// Run the client tools through a different shell.
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Connection settings.
    pub fn settings(&self) -> &MysqlSettings {
        &self.settings
    }

    /// Check if [`open`](Self::open) succeeded and `close` was not called.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Verify the server answers, then mark the connection open.
    pub fn open(&mut self) -> Result<()> {
        let mut executor = Executor::new(self.ping_command()?).with_shell(self.shell.as_str());
        executor.execute()?;
        self.open = true;
        info!(host = %self.settings.host, port = self.settings.port, "mysql connection open");
        Ok(())
    }

    /// Check whether the server answers, without failing on a dead server.
    pub fn ping(&self) -> Result<bool> {
        let mut executor = Executor::new(self.ping_command()?)
            .with_shell(self.shell.as_str())
            .strict(false);
        let alive = executor.execute()?.success();
        debug!(alive, "mysql ping");
        Ok(alive)
    }

    /// Mark the connection closed.
    pub fn close(&mut self) {
        if self.open {
            debug!(host = %self.settings.host, "mysql connection closed");
        }
        self.open = false;
    }

    /// Interactive `mysql` client, optionally bound to `database`.
    pub fn client_command(&self, database: Option<&str>) -> Result<CommandBuilder> {
        let mut cmd = self.with_credentials("mysql")?;
        if let Some(database) = database {
            cmd.add_argument(database)?;
        }
        Ok(cmd)
    }

    /// Batch query without column headers: one row per output line.
    pub fn query_command(&self, sql: &str, database: Option<&str>) -> Result<CommandBuilder> {
        let mut cmd = self.with_credentials("mysql")?;
        cmd.add_argument_raw("-N")?
            .add_argument_raw("-B")?
            .add_argument_template("-e %s", &[sql])?;
        if let Some(database) = database {
            cmd.add_argument(database)?;
        }
        Ok(cmd)
    }

    /// Run `sql` and return its rows as tab separated lines.
    pub fn query(&self, sql: &str, database: Option<&str>) -> Result<Vec<String>> {
        let mut executor =
            Executor::new(self.query_command(sql, database)?).with_shell(self.shell.as_str());
        Ok(executor.execute()?.output.clone())
    }

    /// Structure of every table followed by data of all tables except
    /// `data_excludes`, as one output stream.
    pub fn dump_command(
        &self,
        database: &str,
        data_excludes: &[String],
    ) -> Result<CombinedOutputCommand> {
        let mut structure = self.with_credentials("mysqldump")?;
        structure
            .add_argument_raw("--single-transaction")?
            .add_argument_raw("--no-data")?
            .add_argument_raw("--routines")?
            .add_argument(database)?;

        let mut data = self.with_credentials("mysqldump")?;
        data.add_argument_raw("--single-transaction")?
            .add_argument_raw("--no-create-info")?
            .add_argument_raw("--skip-triggers")?;
        for table in data_excludes {
            data.add_argument_template("--ignore-table=%s", &[format!("{}.{}", database, table)])?;
        }
        data.add_argument(database)?;

        let mut dump = CombinedOutputCommand::new();
        dump.add_command(structure)?.add_command(data)?;
        Ok(dump)
    }

    /// `mysqladmin ping`, silenced: only the exit code matters.
    pub fn ping_command(&self) -> Result<CommandBuilder> {
        let mut cmd = self.with_credentials("mysqladmin")?;
        cmd.add_argument_raw("ping")?.set_output_redirect("> /dev/null 2>&1");
        Ok(cmd)
    }

    fn with_credentials(&self, program: &str) -> Result<CommandBuilder> {
        let mut cmd = CommandBuilder::new(program);
        if let Some(password) = self.settings.password.as_deref().filter(|p| !p.is_empty()) {
            cmd.add_environment_var("MYSQL_PWD", password)?;
        }
        if !self.settings.host.is_empty() {
            cmd.add_argument_template("--host=%s", &[&self.settings.host])?;
        }
        cmd.add_argument_template("--port=%s", &[self.settings.port.to_string()])?;
        if !self.settings.user.is_empty() {
            cmd.add_argument_template("--user=%s", &[&self.settings.user])?;
        }
        Ok(cmd)
    }
}
