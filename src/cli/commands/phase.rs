//! `mpt phase` command - Phase scheduling within a project

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::confirm;
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat, Session};
use crate::core::identity::EntityPrefix;
use crate::core::store::Store;
use crate::entities::{Phase, PhasePatch, PhasePayload, PhaseStatus};

use super::project::report_change;

#[derive(Subcommand, Debug)]
pub enum PhaseCommands {
    /// List phases of one project, or of every project
    List(ListArgs),

    /// Add a phase to a project
    New(NewArgs),

    /// Change fields of an existing phase
    Edit(EditArgs),

    /// Delete a phase
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Project reference; omit to list phases of all projects
    pub project: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project reference (PRJ@N, full ID or unique fragment)
    pub project: String,

    #[arg(long, short = 'n')]
    pub name: String,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,

    /// End date (YYYY-MM-DD), used for deadline alerts
    #[arg(long)]
    pub end: NaiveDate,

    /// Completion percentage
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub progress: u8,

    #[arg(long, default_value = "on_track")]
    pub status: PhaseStatus,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Phase reference (PHS@N, full ID or unique fragment)
    pub phase: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long)]
    pub start: Option<NaiveDate>,

    #[arg(long)]
    pub end: Option<NaiveDate>,

    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub progress: Option<u8>,

    #[arg(long)]
    pub status: Option<PhaseStatus>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Phase reference (PHS@N, full ID or unique fragment)
    pub phase: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: PhaseCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PhaseCommands::List(args) => run_list(args, global),
        PhaseCommands::New(args) => run_new(args, global),
        PhaseCommands::Edit(args) => run_edit(args, global),
        PhaseCommands::Delete(args) => run_delete(args, global),
    }
}

const PHASE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "phase_name"),
    ColumnDef::new("start_date", "phase_start_date"),
    ColumnDef::new("end_date", "phase_end_date"),
    ColumnDef::new("progress", "phase_progress"),
    ColumnDef::new("status", "phase_status"),
];

const PHASE_COLUMNS_WITH_PROJECT: &[ColumnDef] = &[
    ColumnDef::new("project", "project"),
    ColumnDef::new("name", "phase_name"),
    ColumnDef::new("start_date", "phase_start_date"),
    ColumnDef::new("end_date", "phase_end_date"),
    ColumnDef::new("progress", "phase_progress"),
    ColumnDef::new("status", "phase_status"),
];

/// Render phases in `format`; `with_project` adds the owning project's name
pub(crate) fn phase_table(
    session: &Session,
    phases: &[Phase],
    format: OutputFormat,
    with_project: bool,
) -> String {
    let store = &session.store;
    let rows: Vec<TableRow> = phases
        .iter()
        .map(|phase| {
            let project_name = store
                .project(&phase.project_id)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            TableRow::new(&phase.id, store.short_id(&phase.id))
                .cell("project", CellValue::Text(project_name))
                .cell("name", CellValue::Text(phase.name.clone()))
                .cell("start_date", CellValue::Date(phase.start_date))
                .cell("end_date", CellValue::Date(phase.end_date))
                .cell("progress", CellValue::Percent(phase.progress.into()))
                .cell("status", CellValue::PhaseStatus(phase.status))
        })
        .collect();

    let columns = if with_project {
        PHASE_COLUMNS_WITH_PROJECT
    } else {
        PHASE_COLUMNS
    };
    let formatter = TableFormatter::new(columns, &session.tr, EntityPrefix::Phs);
    if with_project {
        formatter.render(&rows, format)
    } else {
        formatter.without_summary().render(&rows, format)
    }
}

/// Look a phase up by full ID across all projects
pub(crate) fn find_phase<'a>(store: &'a Store, id: &str) -> Option<&'a Phase> {
    store
        .projects()
        .iter()
        .flat_map(|p| p.phases.iter())
        .find(|phase| phase.id == id)
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let format = session.format(global, OutputFormat::Table);

    let phases: Vec<Phase> = match args.project {
        Some(ref reference) => {
            let id = session.resolve(EntityPrefix::Prj, reference)?;
            session
                .store
                .project(&id)
                .map(|p| p.phases.clone())
                .unwrap_or_default()
        }
        None => session
            .store
            .projects()
            .iter()
            .flat_map(|p| p.phases.iter().cloned())
            .collect(),
    };

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&phases).into_diagnostic()?);
        return Ok(());
    }
    if phases.is_empty() && matches!(format, OutputFormat::Table | OutputFormat::Md) {
        println!("{}", style(session.t("no_phases")).dim());
        return Ok(());
    }
    print!("{}", phase_table(&session, &phases, format, true));
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let project_id = session.resolve(EntityPrefix::Prj, &args.project)?;

    let payload = PhasePayload {
        name: args.name.trim().to_string(),
        start_date: args.start,
        end_date: args.end,
        progress: args.progress,
        status: args.status,
    };
    payload.validate().map_err(|e| miette::miette!("{}", e))?;

    let id = session
        .store
        .add_phase(&project_id, &payload)
        .map_err(|e| miette::miette!("{}", e))?;
    report_change(&session, global, "phase_created", &id);
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = session.resolve(EntityPrefix::Phs, &args.phase)?;

    let patch = PhasePatch {
        name: args.name.map(|n| n.trim().to_string()),
        start_date: args.start,
        end_date: args.end,
        progress: args.progress,
        status: args.status,
    };
    if patch.is_empty() {
        return Err(miette::miette!(
            "Nothing to change. Pass at least one field, e.g. --progress 50"
        ));
    }
    if let Some(current) = find_phase(&session.store, &id) {
        current
            .payload()
            .merge(&patch)
            .validate()
            .map_err(|e| miette::miette!("{}", e))?;
    }

    let updated = session
        .store
        .update_phase(&id, &patch)
        .map_err(|e| miette::miette!("{}", e))?;
    if !updated {
        return Err(miette::miette!("Phase '{}' not found", args.phase));
    }
    report_change(&session, global, "phase_updated", &id);
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = session.resolve(EntityPrefix::Phs, &args.phase)?;
    let label = session.store.display_id(&id);

    let prompt = format!("{} ({})", session.t("confirm_delete_phase"), label);
    if !confirm(&prompt, args.yes)? {
        println!("{}", style(session.t("delete_cancelled")).dim());
        return Ok(());
    }

    let removed = session
        .store
        .delete_phase(&id)
        .map_err(|e| miette::miette!("{}", e))?;
    if !removed {
        return Err(miette::miette!("Phase '{}' not found", args.phase));
    }
    if !global.quiet {
        println!(
            "{} {} {}",
            style("✓").green(),
            session.t("phase_deleted"),
            style(label).cyan()
        );
    }
    Ok(())
}
