//! SQL Server to CSV/ZIP export tool.
//!
//! This binary tests a SQL Server connection, recreates the export views,
//! reads every selected entity and writes one semicolon-delimited CSV file
//! per entity, bundled into a single ZIP archive.
//!
//! # Security Guarantees
//! - The password is read from the environment or an interactive prompt,
//!   never echoed and never logged
//! - Connection failures name server and database only
//! - Export files are written locally only

mod app;
mod console;

use anyhow::{Context, bail};
use app::App;
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{ConsoleObserver, render_summary};
use exportador_core::services::ExportSettingsRepository;
use exportador_core::{ExportConfig, LogFormat, SecretPassword, init_logging};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "exportador")]
#[command(about = "Export SQL Server tables as CSV files bundled in a ZIP archive")]
#[command(version)]
#[command(long_about = "
Exportador - SQL Server data export

Reads selected ERP entities from a SQL Server database and writes them as
semicolon-delimited CSV files, bundled into a single ZIP archive.

Before reading, the export views (dbo.<Table>Exportacao) are recreated so
their column lists match the current export layout.

SECURITY FEATURES:
- Password read from EXPORTADOR_PASSWORD or an interactive prompt
- No credentials stored or logged

EXAMPLES:
  exportador test --server db01 --database erp --user exporter
  exportador export --server db01,1433 --database erp --user exporter --entity Clientes --entity NFe
  exportador export --all --output-dir /srv/exports --file-name fechamento
  exportador result
")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Test the database connection
    Test(ConnectionArgs),
    /// List base tables of the database
    Tables(TablesArgs),
    /// List exportable entities
    Entities,
    /// Export entities into a ZIP archive
    Export(ExportArgs),
    /// Show the summary of the last export
    Result,
    /// Show or change the destination directory and archive name
    Settings(SettingsArgs),
}

#[derive(Args)]
struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    quiet: bool,

    /// Log record format
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Text)]
    log_format: LogFormatArg,

    /// Directory holding settings.json and export_result.json
    #[arg(long, global = true, env = "EXPORTADOR_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    /// Scratch directory for temporary CSV files
    #[arg(long, global = true, env = "EXPORTADOR_TEMP_DIR")]
    temp_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

#[derive(Args)]
struct ConnectionArgs {
    /// Server name: host, host\instance or host,port
    #[arg(long, env = "EXPORTADOR_SERVER")]
    server: String,

    /// Database name
    #[arg(long, env = "EXPORTADOR_DATABASE")]
    database: String,

    /// SQL Server login
    #[arg(long, env = "EXPORTADOR_USER")]
    user: String,

    /// Password; prompted for when absent
    #[arg(long, env = "EXPORTADOR_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Default TCP port when the server name carries none
    #[arg(long, default_value_t = exportador_core::config::DEFAULT_PORT)]
    port: u16,

    /// Require a certificate signed by a trusted authority
    #[arg(long)]
    verify_certificate: bool,

    /// Connection timeout in seconds
    #[arg(long, default_value_t = 10)]
    connect_timeout: u64,
}

#[derive(Args)]
struct TablesArgs {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// LIKE pattern applied to table names
    #[arg(long, default_value = "%")]
    pattern: String,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Entity to export; repeat for several
    #[arg(short, long = "entity", value_name = "NAME", required_unless_present = "all")]
    entities: Vec<String>,

    /// Export every known entity
    #[arg(long, conflicts_with = "entities")]
    all: bool,

    /// Destination directory, saved for later runs
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Archive name without extension, saved for later runs
    #[arg(short, long)]
    file_name: Option<String>,

    /// Wait after view setup before reading, in milliseconds
    #[arg(long, default_value_t = 2000)]
    settle_delay_ms: u64,
}

#[derive(Args)]
struct SettingsArgs {
    /// New destination directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// New archive name without extension
    #[arg(short, long)]
    file_name: Option<String>,
}

impl GlobalArgs {
    fn config(&self) -> ExportConfig {
        let mut config = ExportConfig::default();
        if let Some(dir) = &self.storage_dir {
            config = config.with_storage_dir(dir);
        }
        if let Some(dir) = &self.temp_dir {
            config = config.with_temp_dir(dir);
        }
        config
    }
}

impl ConnectionArgs {
    fn apply(&self, config: ExportConfig) -> ExportConfig {
        config
            .with_port(self.port)
            .with_trust_server_certificate(!self.verify_certificate)
            .with_connect_timeout(Duration::from_secs(self.connect_timeout))
    }

    /// Password from the arguments or an interactive prompt.
    fn password(&self) -> anyhow::Result<SecretPassword> {
        if let Some(password) = &self.password {
            return Ok(SecretPassword::new(password.as_str()));
        }
        let password = rpassword::prompt_password(format!(
            "Password for {}@{}: ",
            self.user, self.server
        ))
        .context("Failed to read password")?;
        Ok(SecretPassword::new(password))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet, cli.global.log_format.into())?;

    match &cli.command {
        Command::Test(connection) => {
            let app = App::new(connection.apply(cli.global.config()))?;
            connect(&app, connection).await?;
            println!("Connection to {}/{} successful", connection.server, connection.database);
            Ok(())
        }
        Command::Tables(args) => {
            let app = App::new(args.connection.apply(cli.global.config()))?;
            connect(&app, &args.connection).await?;
            for name in app.table_names(&args.pattern).await? {
                println!("{name}");
            }
            Ok(())
        }
        Command::Entities => {
            let app = App::new(cli.global.config())?;
            for name in app.entities() {
                println!("{name}");
            }
            Ok(())
        }
        Command::Export(args) => run_export(&cli.global, args).await,
        Command::Result => {
            let app = App::new(cli.global.config())?;
            match app.latest_result().await? {
                Some(result) => println!("{}", render_summary(&result)),
                None => println!("No export has completed yet."),
            }
            Ok(())
        }
        Command::Settings(args) => {
            let app = App::new(cli.global.config())?;
            update_settings(&app, args.output_dir.as_ref(), args.file_name.as_deref())?;
            let settings = app.settings().settings();
            println!("Destination: {}", settings.destination_directory.display());
            println!("File name:   {}", settings.output_file_name);
            Ok(())
        }
    }
}

/// Tests the connection and keeps the parameters for later operations.
async fn connect(app: &App, args: &ConnectionArgs) -> anyhow::Result<()> {
    let password = args.password()?;
    let result = app
        .test_connection(&args.server, &args.database, &args.user, password.expose())
        .await;

    if let Some(message) = result.error_message() {
        error!("Connection test failed: {message}");
        bail!("{message}");
    }
    info!("Connection test successful");
    Ok(())
}

fn update_settings(
    app: &App,
    output_dir: Option<&PathBuf>,
    file_name: Option<&str>,
) -> exportador_core::Result<()> {
    if let Some(dir) = output_dir {
        app.settings().set_destination_directory(dir)?;
    }
    if let Some(name) = file_name {
        app.settings().set_output_file_name(name)?;
    }
    Ok(())
}

async fn run_export(global: &GlobalArgs, args: &ExportArgs) -> anyhow::Result<()> {
    let config = args
        .connection
        .apply(global.config())
        .with_view_settle_delay(Duration::from_millis(args.settle_delay_ms));
    let app = App::new(config)?;
    update_settings(&app, args.output_dir.as_ref(), args.file_name.as_deref())?;

    let known = app.entities();
    let entities = if args.all { known.clone() } else { args.entities.clone() };
    let selection = app.selection();
    for entity in &entities {
        if !known.contains(entity) {
            warn!(entity = %entity, "Unknown entity, it will be skipped");
        }
        selection.add(entity)?;
    }

    connect(&app, &args.connection).await?;

    let observer = Arc::new(ConsoleObserver::new(global.quiet));
    let result = app.export(observer).await?;

    if !global.quiet {
        println!("{}", render_summary(&result));
    }
    Ok(())
}
