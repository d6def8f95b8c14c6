//! Version CLI commands
//!
//! Snapshots of the active model's working data.

use clap::Subcommand;

use crate::config::Settings;
use crate::display::format_version_list;
use crate::error::{WorkbookError, WorkbookResult};
use crate::state::{Action, Workbook};

use super::resolve_model_or_active;

#[derive(Subcommand)]
pub enum VersionCommands {
    /// List saved versions of the active model
    List,
    /// Snapshot the working data
    Save {
        /// Version name
        name: String,
        /// Include in exports
        #[arg(short, long)]
        shared: bool,
    },
    /// Replace the working data with a version's data
    Restore {
        /// Version number
        number: u32,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Delete a version; later versions are renumbered
    Delete {
        /// Version number
        number: u32,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Toggle whether a version is included in exports
    Share {
        /// Version number
        number: u32,
    },
    /// Rename a version
    Rename {
        /// Version number
        number: u32,
        /// New name
        name: String,
    },
}

pub fn handle_version_command(
    workbook: &mut Workbook,
    settings: &Settings,
    cmd: VersionCommands,
) -> WorkbookResult<()> {
    match cmd {
        VersionCommands::List => {
            let model = resolve_model_or_active(workbook, None)?;
            println!("Model: {}", model.name);
            print!("{}", format_version_list(model, &settings.currency_symbol));
        }

        VersionCommands::Save { name, shared } => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(WorkbookError::Validation(
                    "Version name cannot be empty".to_string(),
                ));
            }
            let known: Vec<_> = resolve_model_or_active(workbook, None)?
                .versions
                .iter()
                .map(|v| v.timestamp)
                .collect();

            workbook.dispatch(Action::SaveVersion {
                name: name.clone(),
                shared,
            });
            let number = resolve_model_or_active(workbook, None)?
                .versions
                .iter()
                .find(|v| !known.contains(&v.timestamp))
                .map(|v| v.number)
                .unwrap_or(0);
            println!(
                "Saved version v{}: {}{}",
                number,
                name,
                if shared { " (shared)" } else { "" }
            );
        }

        VersionCommands::Restore { number, force } => {
            let name = version_name(workbook, number)?;

            if !force {
                println!(
                    "This will replace the working data with v{} ({}).",
                    number, name
                );
                println!("Unsaved working changes will be lost.");
                println!("To proceed, run again with --force flag:");
                println!("  workbook version restore {} --force", number);
                return Ok(());
            }

            workbook.dispatch(Action::RestoreVersion { number });
            println!("Restored v{}: {}", number, name);
        }

        VersionCommands::Delete { number, force } => {
            let name = version_name(workbook, number)?;

            if !force {
                println!("This will permanently delete v{} ({}).", number, name);
                println!("To proceed, run again with --force flag:");
                println!("  workbook version delete {} --force", number);
                return Ok(());
            }

            workbook.dispatch(Action::DeleteVersion { number });
            println!("Deleted v{}: {}", number, name);
        }

        VersionCommands::Share { number } => {
            version_name(workbook, number)?;
            workbook.dispatch(Action::ToggleVersionShared { number });

            let shared = resolve_model_or_active(workbook, None)?
                .version(number)
                .map(|v| v.shared)
                .unwrap_or(false);
            if shared {
                println!("v{} is now shared and will be exported.", number);
            } else {
                println!("v{} is no longer shared.", number);
            }
        }

        VersionCommands::Rename { number, name } => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(WorkbookError::Validation(
                    "Version name cannot be empty".to_string(),
                ));
            }
            let old_name = version_name(workbook, number)?;

            workbook.dispatch(Action::RenameVersion {
                number,
                name: name.clone(),
            });
            println!("Renamed v{}: {} -> {}", number, old_name, name);
        }
    }

    Ok(())
}

fn version_name(workbook: &Workbook, number: u32) -> WorkbookResult<String> {
    resolve_model_or_active(workbook, None)?
        .version(number)
        .map(|v| v.name.clone())
        .ok_or_else(|| WorkbookError::version_not_found(format!("v{}", number)))
}
