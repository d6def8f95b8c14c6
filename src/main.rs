use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use workbook::archive::ConflictResolution;
use workbook::cli::{
    handle_budget_command, handle_compare_command, handle_export_command, handle_history_command,
    handle_import_command, handle_model_command, handle_report_command, handle_service_command,
    handle_version_command,
};
use workbook::config::{Settings, WorkbookPaths};
use workbook::models::{AppState, DEFAULT_MODEL_NAME};
use workbook::state::{Action, Workbook};

/// Environment variable holding the log filter
const LOG_ENV: &str = "WORKBOOK_LOG";

#[derive(Parser)]
#[command(
    name = "workbook",
    author = "Kaylee Beyene",
    version,
    about = "Versioned service cost budgeting workbook",
    long_about = "Workbook forecasts the monthly cost of metered services over a \
                  twelve-month horizon. Keep several independent models, snapshot \
                  them as versions, compare any two snapshots and share models as \
                  archives."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Model management commands
    #[command(subcommand)]
    Model(workbook::cli::ModelCommands),

    /// Service catalogue commands
    #[command(subcommand, alias = "svc")]
    Service(workbook::cli::ServiceCommands),

    /// Monthly budget commands
    #[command(subcommand)]
    Budget(workbook::cli::BudgetCommands),

    /// Version history commands
    #[command(subcommand)]
    Version(workbook::cli::VersionCommands),

    /// Compare two datasets of a model
    Compare {
        /// Older dataset: version number or "working"
        older: String,
        /// Newer dataset: version number or "working"
        #[arg(default_value = "working")]
        newer: String,
        /// Model name or ID (defaults to the active model)
        #[arg(short, long)]
        model: Option<String>,
        /// List every changed cell
        #[arg(short, long)]
        verbose: bool,
    },

    /// Export a model archive with its shared versions
    Export {
        /// Model name or ID (defaults to the active model)
        #[arg(short, long)]
        model: Option<String>,
        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a model archive
    Import {
        /// Archive file
        file: PathBuf,
        /// How to handle a model that already exists: replace, merge or new
        #[arg(short, long)]
        resolve: Option<ConflictResolution>,
    },

    /// Cost reports
    #[command(subcommand)]
    Report(workbook::cli::ReportCommands),

    /// Show recent changes
    History {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        count: usize,
    },

    /// Show configuration, or change one setting
    Config {
        /// Setting to change
        key: Option<String>,
        /// New value
        #[arg(requires = "key")]
        value: Option<String>,
    },

    /// Discard all models and start over
    Reset {
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = WorkbookPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    let mut workbook = Workbook::open(&paths, &settings)?;

    match cli.command {
        Some(Commands::Model(cmd)) => handle_model_command(&mut workbook, &settings, cmd)?,
        Some(Commands::Service(cmd)) => handle_service_command(&mut workbook, &settings, cmd)?,
        Some(Commands::Budget(cmd)) => handle_budget_command(&mut workbook, &settings, cmd)?,
        Some(Commands::Version(cmd)) => handle_version_command(&mut workbook, &settings, cmd)?,
        Some(Commands::Compare {
            older,
            newer,
            model,
            verbose,
        }) => handle_compare_command(
            &workbook,
            &settings,
            model.as_deref(),
            &older,
            &newer,
            verbose,
        )?,
        Some(Commands::Export { model, output }) => {
            handle_export_command(&workbook, &paths, &settings, model.as_deref(), output)?
        }
        Some(Commands::Import { file, resolve }) => {
            handle_import_command(&mut workbook, &file, resolve)?
        }
        Some(Commands::Report(cmd)) => handle_report_command(&workbook, &settings, cmd)?,
        Some(Commands::History { count }) => handle_history_command(&workbook, count)?,
        Some(Commands::Config { key, value }) => {
            if let (Some(key), Some(value)) = (&key, &value) {
                settings.set(key, value)?;
                settings.save(&paths)?;
                println!("Set {} = {}", key, value);
                println!();
            } else if key.is_some() {
                anyhow::bail!("Missing value. Usage: workbook config <key> <value>");
            }

            println!("Workbook Configuration");
            println!("======================");
            println!("Data directory:    {}", paths.base_dir().display());
            println!("State directory:   {}", paths.state_dir().display());
            println!("Exports directory: {}", paths.exports_dir().display());
            println!("Audit log:         {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  persist_debounce_ms: {}", settings.persist_debounce_ms);
            println!("  undo_depth:          {}", settings.undo_depth);
            println!("  currency_symbol:     {}", settings.currency_symbol);
            println!(
                "  default_start_month: {}",
                settings.default_start_month + 1
            );
            println!("  default_start_year:  {}", settings.default_start_year);
            println!("  archive_extension:   {}", settings.archive_extension);
        }
        Some(Commands::Reset { force }) => {
            if !force {
                println!(
                    "This will delete all {} model(s) and their versions.",
                    workbook.state().models.len()
                );
                println!("To proceed, run again with --force flag:");
                println!("  workbook reset --force");
                return Ok(());
            }

            let state =
                AppState::with_default_model(settings.default_budget_config(), workbook.now());
            workbook.dispatch(Action::ResetState {
                state: Box::new(state),
            });
            println!("Workbook reset. Active model: {}", DEFAULT_MODEL_NAME);
        }
        None => {
            println!("Workbook - versioned service cost budgeting");
            println!();
            match workbook.active_model() {
                Some(model) => println!("Active model: {}", model),
                None => println!("No models yet."),
            }
            println!();
            println!("Run 'workbook --help' for usage information.");
        }
    }

    workbook.flush();
    Ok(())
}
