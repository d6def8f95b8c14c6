//! Export and import CLI commands
//!
//! Exports write a zip archive of one model with its shared versions. Imports
//! read such an archive and, when the model already exists locally, ask for a
//! conflict resolution before touching the state.

use std::path::{Path, PathBuf};

use crate::archive::{
    export_model, read_archive_file, write_archive, ConflictResolution, ImportPlan,
};
use crate::config::{Settings, WorkbookPaths};
use crate::error::{WorkbookError, WorkbookResult};
use crate::state::Workbook;

use super::resolve_model_or_active;

/// Export a model (the active one by default)
///
/// `output` may be a file path or a directory; without it the archive goes
/// to the exports directory under a dated name.
pub fn handle_export_command(
    workbook: &Workbook,
    paths: &WorkbookPaths,
    settings: &Settings,
    model: Option<&str>,
    output: Option<PathBuf>,
) -> WorkbookResult<()> {
    let model = resolve_model_or_active(workbook, model)?;
    let today = workbook.now().date_naive();

    let path = match output {
        Some(path) if !path.is_dir() => {
            write_archive(model, &path)?;
            path
        }
        Some(dir) => export_model(model, &dir, &settings.archive_extension, today)?,
        None => {
            paths.ensure_directories()?;
            export_model(model, &paths.exports_dir(), &settings.archive_extension, today)?
        }
    };

    let skipped = model.versions.len() - model.shared_version_count();
    println!("Exported model: {}", model.name);
    println!("  File:     {}", path.display());
    println!("  Versions: {} shared", model.shared_version_count());
    if skipped > 0 {
        println!(
            "  Skipped {} unshared version(s). Use 'workbook version share' to include them.",
            skipped
        );
    }

    Ok(())
}

/// Import a model archive
pub fn handle_import_command(
    workbook: &mut Workbook,
    file: &Path,
    resolve: Option<ConflictResolution>,
) -> WorkbookResult<()> {
    if !file.exists() {
        return Err(WorkbookError::Io(format!(
            "File not found: {}",
            file.display()
        )));
    }

    let model = read_archive_file(file, workbook.now())?;
    let plan = workbook.plan_import(model);

    let resolution = match (&plan, resolve) {
        (
            ImportPlan::Conflict {
                model,
                local_name,
                local_versions,
                imported_versions,
            },
            None,
        ) => {
            println!("Model '{}' already exists locally.", local_name);
            println!("  Local:    {} version(s)", local_versions);
            println!(
                "  Imported: '{}' with {} version(s)",
                model.name, imported_versions
            );
            println!();
            println!("Choose how to resolve and run again with --resolve:");
            println!("  replace  Overwrite the local model");
            println!("  merge    Keep the local model and add unseen versions");
            println!("  new      Import as a separate model");
            return Ok(());
        }
        (_, Some(resolution)) => resolution,
        (ImportPlan::New { .. }, None) => ConflictResolution::Replace,
    };

    let was_conflict = plan.is_conflict();
    let versions_before = plan.model().versions.len();

    if !workbook.dispatch(plan.into_action(resolution)) {
        println!("Nothing to import: the local model already has every version.");
        return Ok(());
    }

    let Some(active) = workbook.active_model() else {
        return Ok(());
    };
    if was_conflict {
        println!("Imported with '{}': {}", resolution, active.name);
    } else {
        println!("Imported model: {}", active.name);
    }
    println!(
        "  Services: {}  Versions: {} (archive had {})",
        active.data.services.len(),
        active.versions.len(),
        versions_before
    );

    Ok(())
}
