mod app;
mod completions;
mod config;
mod field;
mod file;
mod formula;
mod page;
mod record;
mod relationship;
mod report;
mod table;
mod user_token;
mod variable;

use std::{io, path::PathBuf, time::Duration};

use app::AppCommand;
use clap::{Args, Parser, Subcommand};
use completions::CompletionsCommand;
use config::ConfigCommand;
use eyre::{Result, eyre};
use field::FieldCommand;
use file::FileCommand;
use formula::FormulaCommand;
use page::PageCommand;
use qbcli_client::{Client, ConfigToml, DEFAULT_PROFILE, DumpTransport, HttpTransport, Profile};
use record::RecordCommand;
use relationship::RelationshipCommand;
use report::ReportCommand;
use serde::Serialize;
use table::TableCommand;
use tracing::debug;
use user_token::UserTokenCommand;
use variable::VariableCommand;

use crate::{
    logging,
    reports::{Output, OutputFormat, Report, ResourceReport, TerminalOutput},
};

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Extension trait for exiting on library errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for qbcli_client::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

impl<T> UnwrapOrExit<T> for qbcli_core::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "qb")]
#[command(version)]
#[command(about = "Command line client for the Quick Base API")]
pub(crate) struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        logging::init_logging(&self.global.log_level, self.global.log_file.as_deref())?;

        let g = &self.global;
        match &self.command {
            Commands::App(cmd) => cmd.run(g),
            Commands::Table(cmd) => cmd.run(g),
            Commands::Field(cmd) => cmd.run(g),
            Commands::Record(cmd) => cmd.run(g),
            Commands::Relationship(cmd) => cmd.run(g),
            Commands::Report(cmd) => cmd.run(g),
            Commands::Page(cmd) => cmd.run(g),
            Commands::Variable(cmd) => cmd.run(g),
            Commands::UserToken(cmd) => cmd.run(g),
            Commands::Formula(cmd) => cmd.run(g),
            Commands::File(cmd) => cmd.run(g),
            Commands::Config(cmd) => cmd.run(g),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Work with apps
    App(AppCommand),

    /// Work with tables
    Table(TableCommand),

    /// Work with fields
    Field(FieldCommand),

    /// Insert, query and delete records
    Record(RecordCommand),

    /// Work with table relationships
    Relationship(RelationshipCommand),

    /// List and run reports
    Report(ReportCommand),

    /// Work with code pages
    Page(PageCommand),

    /// Read and write app variables
    Variable(VariableCommand),

    /// Clone, deactivate and delete user tokens
    UserToken(UserTokenCommand),

    /// Evaluate formulas
    Formula(FormulaCommand),

    /// Work with file attachments
    File(FileCommand),

    /// Manage configuration profiles
    Config(ConfigCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Connection and output settings shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub(crate) struct GlobalArgs {
    /// Configuration profile to use
    #[arg(short, long, global = true, env = "QUICKBASE_PROFILE", default_value = DEFAULT_PROFILE)]
    pub profile: String,

    /// Realm hostname, e.g. example.quickbase.com
    #[arg(short, long, global = true, env = "QUICKBASE_REALM_HOSTNAME")]
    pub realm_hostname: Option<String>,

    /// User token for authentication
    #[arg(short, long, global = true, env = "QUICKBASE_USER_TOKEN", hide_env_values = true)]
    pub user_token: Option<String>,

    /// Temporary token for authentication
    #[arg(short, long, global = true, env = "QUICKBASE_TEMP_TOKEN", hide_env_values = true)]
    pub temp_token: Option<String>,

    /// Default app ID
    #[arg(long, global = true, env = "QUICKBASE_APP_ID")]
    pub app_id: Option<String>,

    /// Default table ID
    #[arg(long, global = true, env = "QUICKBASE_TABLE_ID")]
    pub table_id: Option<String>,

    /// Configuration file (defaults to ~/.config/quickbase/config.toml)
    #[arg(long, global = true, env = "QUICKBASE_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Log level or filter directive
    #[arg(short, long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Write logs to this file instead of stderr
    #[arg(short = 'f', long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Write every request and response to this directory
    #[arg(short, long, global = true)]
    pub dump_dir: Option<PathBuf>,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t)]
    pub output: OutputFormat,
}

impl GlobalArgs {
    pub fn config_path(&self) -> Result<PathBuf> {
        self.config_file
            .clone()
            .or_else(ConfigToml::default_path)
            .ok_or_else(|| eyre!("cannot locate the home directory, pass --config-file"))
    }

    pub fn config(&self) -> Result<ConfigToml> {
        let path = self.config_path()?;
        Ok(ConfigToml::open_or_default(path).unwrap_or_exit())
    }

    /// Settings from flags and the environment, completed from the profile.
    pub fn profile(&self) -> Result<Profile> {
        let flags = Profile {
            realm_hostname: self.realm_hostname.clone(),
            user_token: self.user_token.clone(),
            temp_token: self.temp_token.clone(),
            app_id: self.app_id.clone(),
            table_id: self.table_id.clone(),
            field_id: None,
        };
        let config = self.config()?;
        let stored = config.profile(&self.profile).cloned().unwrap_or_default();
        debug!(profile = %self.profile, path = %config.path().display(), "loaded configuration");
        Ok(flags.or(&stored))
    }

    pub fn client(&self) -> Result<Client> {
        let profile = self.profile()?;
        let http = HttpTransport::new(HTTP_TIMEOUT).unwrap_or_exit();
        let client = match &self.dump_dir {
            Some(dir) => Client::new(&profile, DumpTransport::new(http, dir).unwrap_or_exit()),
            None => Client::new(&profile, http),
        };
        Ok(client.unwrap_or_exit())
    }

    /// The app from `--app-id`, the environment or the profile.
    pub fn app_id(&self) -> Result<String> {
        self.profile()?
            .app_id
            .ok_or_else(|| eyre!("app ID required, pass --app-id or set QUICKBASE_APP_ID"))
    }

    /// The table from `--table-id`, the environment or the profile.
    pub fn table_id(&self) -> Result<String> {
        self.profile()?
            .table_id
            .ok_or_else(|| eyre!("table ID required, pass --table-id or set QUICKBASE_TABLE_ID"))
    }

    pub fn output(&self) -> TerminalOutput<io::Stdout> {
        TerminalOutput::new(io::stdout(), self.output, self.quiet)
    }

    pub fn render(&self, report: &dyn Report) -> Result<()> {
        self.output().render(report)
    }

    /// Render any API response.
    pub fn render_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        self.render(&ResourceReport::new(value)?)
    }
}
