//! Report CLI commands
//!
//! Print a cost report for the active model, or write it as CSV.

use clap::Subcommand;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::{WorkbookError, WorkbookResult};
use crate::models::ModelData;
use crate::reports::{ExecutiveSummary, MonthlyTimeline};
use crate::state::{DataRef, Workbook};

use super::resolve_model_or_active;

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Annual totals and each service's share
    Summary {
        /// Version number or "working"
        #[arg(short, long, default_value = "working")]
        data: String,
        /// Write CSV to this file instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Month-by-month costs with changes
    Timeline {
        /// Version number or "working"
        #[arg(short, long, default_value = "working")]
        data: String,
        /// Write CSV to this file instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn handle_report_command(
    workbook: &Workbook,
    settings: &Settings,
    cmd: ReportCommands,
) -> WorkbookResult<()> {
    let currency = settings.currency_symbol.as_str();

    match cmd {
        ReportCommands::Summary { data, output } => {
            let (title, dataset) = select_dataset(workbook, &data)?;
            let summary = ExecutiveSummary::build(dataset);
            match output {
                Some(path) => {
                    summary.export_csv(create_file(&path)?)?;
                    println!("Summary written to {}", path.display());
                }
                None => print!("{}", summary.format_terminal(&title, currency)),
            }
        }

        ReportCommands::Timeline { data, output } => {
            let (title, dataset) = select_dataset(workbook, &data)?;
            let timeline = MonthlyTimeline::build(dataset);
            match output {
                Some(path) => {
                    timeline.export_csv(create_file(&path)?)?;
                    println!("Timeline written to {}", path.display());
                }
                None => print!("{}", timeline.format_terminal(&title, currency)),
            }
        }
    }

    Ok(())
}

fn select_dataset<'a>(
    workbook: &'a Workbook,
    data: &str,
) -> WorkbookResult<(String, &'a ModelData)> {
    let model = resolve_model_or_active(workbook, None)?;
    let data_ref: DataRef = data.parse().map_err(WorkbookError::Validation)?;

    let dataset = workbook
        .dataset(model.id, data_ref)
        .ok_or_else(|| WorkbookError::version_not_found(data_ref.to_string()))?;

    let title = match data_ref {
        DataRef::Working => model.name.clone(),
        DataRef::Version(n) => format!("{} (v{})", model.name, n),
    };
    Ok((title, dataset))
}

fn create_file(path: &Path) -> WorkbookResult<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        WorkbookError::Export(format!("Failed to create {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}
