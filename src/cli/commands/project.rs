//! `mpt project` command - Project management

use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::confirm;
use crate::cli::table::{render_panel, CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat, Session};
use crate::core::identity::EntityPrefix;
use crate::core::metrics::project_progress;
use crate::core::store::{Store, StoreError};
use crate::entities::{
    HealthStatus, Project, ProjectPatch, ProjectPayload, ProjectStatus, ProjectWithRelations,
};

use super::phase::phase_table;
use super::resource::resource_table;

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// List projects with optional search and status filter
    List(ListArgs),

    /// Show a project's details, phases, resources and budget
    Show(ShowArgs),

    /// Create a new project
    New(NewArgs),

    /// Change fields of an existing project
    Edit(EditArgs),

    /// Delete a project with its phases and resources
    Delete(DeleteArgs),
}

/// Status filter for list command
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Planned,
    Active,
    #[value(name = "on_hold", alias = "on-hold")]
    OnHold,
    Completed,
}

impl StatusFilter {
    pub fn matches(self, status: ProjectStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Planned => status == ProjectStatus::Planned,
            StatusFilter::Active => status == ProjectStatus::Active,
            StatusFilter::OnHold => status == ProjectStatus::OnHold,
            StatusFilter::Completed => status == ProjectStatus::Completed,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Case-insensitive match on name or description
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Only projects with this status
    #[arg(long, default_value = "all")]
    pub status: StatusFilter,

    /// Show only the count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Project reference (PRJ@N, full ID or unique fragment)
    pub project: String,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project name (must be unique)
    #[arg(long, short = 'n')]
    pub name: String,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end: NaiveDate,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    #[arg(long, default_value = "planned")]
    pub status: ProjectStatus,

    /// Allocated budget
    #[arg(long, default_value_t = 0.0)]
    pub budget: f64,

    /// Amount spent so far
    #[arg(long, default_value_t = 0.0)]
    pub spent: f64,

    #[arg(long, default_value = "stable")]
    pub health: HealthStatus,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Project reference (PRJ@N, full ID or unique fragment)
    pub project: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long)]
    pub status: Option<ProjectStatus>,

    #[arg(long)]
    pub start: Option<NaiveDate>,

    #[arg(long)]
    pub end: Option<NaiveDate>,

    #[arg(long)]
    pub budget: Option<f64>,

    #[arg(long)]
    pub spent: Option<f64>,

    #[arg(long)]
    pub health: Option<HealthStatus>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Project reference (PRJ@N, full ID or unique fragment)
    pub project: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run a project subcommand
pub fn run(cmd: ProjectCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProjectCommands::List(args) => run_list(args, global),
        ProjectCommands::Show(args) => run_show(args, global),
        ProjectCommands::New(args) => run_new(args, global),
        ProjectCommands::Edit(args) => run_edit(args, global),
        ProjectCommands::Delete(args) => run_delete(args, global),
    }
}

pub(crate) const PROJECT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "project_name"),
    ColumnDef::new("status", "project_status"),
    ColumnDef::new("progress", "progress"),
    ColumnDef::new("start_date", "project_start_date"),
    ColumnDef::new("end_date", "project_end_date"),
    ColumnDef::new("budget", "project_budget"),
    ColumnDef::new("spent", "project_spent"),
    ColumnDef::new("health", "health_status"),
];

pub(crate) fn project_rows(store: &Store, projects: &[&ProjectWithRelations]) -> Vec<TableRow> {
    projects
        .iter()
        .map(|p| {
            TableRow::new(&p.id, store.short_id(&p.id))
                .cell("name", CellValue::Text(p.name.clone()))
                .cell("status", CellValue::ProjectStatus(p.status))
                .cell("progress", CellValue::Percent(project_progress(p).into()))
                .cell("start_date", CellValue::Date(p.start_date))
                .cell("end_date", CellValue::Date(p.end_date))
                .cell("budget", CellValue::Money(p.budget))
                .cell("spent", CellValue::Money(p.spent))
                .cell("health", CellValue::Health(p.health))
        })
        .collect()
}

/// A project as emitted in JSON, with its derived progress
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectView<'a> {
    short_id: Option<&'a str>,
    #[serde(flatten)]
    project: &'a ProjectWithRelations,
    progress: u8,
    remaining_budget: f64,
}

impl<'a> ProjectView<'a> {
    pub(crate) fn new(store: &'a Store, project: &'a ProjectWithRelations) -> Self {
        Self {
            short_id: store.short_id(&project.id),
            project,
            progress: project_progress(project),
            remaining_budget: project.remaining_budget(),
        }
    }
}

/// Search on name or description, case-insensitive, then status filter
pub(crate) fn filter_projects<'a>(
    projects: &'a [ProjectWithRelations],
    search: Option<&str>,
    status: StatusFilter,
) -> Vec<&'a ProjectWithRelations> {
    let needle = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();
    projects
        .iter()
        .filter(|p| {
            needle.is_empty()
                || p.name.to_lowercase().contains(&needle)
                || p.description.to_lowercase().contains(&needle)
        })
        .filter(|p| status.matches(p.status))
        .collect()
}

fn store_error(session: &Session, e: StoreError) -> miette::Report {
    match e {
        StoreError::DuplicateName(name) => {
            miette::miette!("{}: '{}'", session.t("duplicate_name_error"), name)
        }
        other => miette::miette!("{}", other),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let projects = filter_projects(session.store.projects(), args.search.as_deref(), args.status);

    if args.count {
        println!("{}", projects.len());
        return Ok(());
    }

    let format = session.format(global, OutputFormat::Table);
    if format == OutputFormat::Json {
        let views: Vec<_> = projects
            .iter()
            .map(|p| ProjectView::new(&session.store, p))
            .collect();
        println!("{}", serde_json::to_string_pretty(&views).into_diagnostic()?);
        return Ok(());
    }

    if projects.is_empty() && matches!(format, OutputFormat::Table | OutputFormat::Md) {
        println!("{}", style(session.t("no_projects")).dim());
        return Ok(());
    }

    let rows = project_rows(&session.store, &projects);
    let formatter = TableFormatter::new(PROJECT_COLUMNS, &session.tr, EntityPrefix::Prj);
    print!("{}", formatter.render(&rows, format));
    Ok(())
}

fn project_panel(session: &Session, project: &ProjectWithRelations) -> String {
    let tr = &session.tr;
    let mut pairs = vec![
        (tr.t("project_name").to_string(), project.name.clone()),
        ("#".to_string(), session.store.display_id(&project.id)),
    ];
    if !project.description.is_empty() {
        pairs.push((tr.t("project_description").to_string(), project.description.clone()));
    }
    pairs.extend([
        (
            tr.t("project_status").to_string(),
            tr.project_status(project.status).to_string(),
        ),
        (
            tr.t("health_status").to_string(),
            tr.health(project.health).to_string(),
        ),
        (
            tr.t("progress").to_string(),
            tr.format_percent(project_progress(project)),
        ),
        (
            tr.t("timeline").to_string(),
            format!(
                "{} → {}",
                tr.format_date(project.start_date),
                tr.format_date(project.end_date)
            ),
        ),
    ]);
    render_panel(&pairs, tr)
}

fn budget_panel(session: &Session, project: &Project) -> String {
    let tr = &session.tr;
    let pairs = [
        (tr.t("total_budget").to_string(), tr.format_number(project.budget)),
        (tr.t("total_spent").to_string(), tr.format_number(project.spent)),
        (
            tr.t("remaining_budget").to_string(),
            tr.format_number(project.remaining_budget()),
        ),
        (
            tr.t("updated_at").to_string(),
            tr.format_date(project.updated_at.date_naive()),
        ),
    ];
    render_panel(&pairs, tr)
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let id = session.resolve(EntityPrefix::Prj, &args.project)?;
    let project = session
        .store
        .project(&id)
        .ok_or_else(|| miette::miette!("{} '{}'", session.t("no_projects"), args.project))?;

    let format = session.format(global, OutputFormat::Auto);
    match format {
        OutputFormat::Json => {
            let view = ProjectView::new(&session.store, project);
            println!("{}", serde_json::to_string_pretty(&view).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", project.id),
        _ => {
            let tr = &session.tr;
            println!("{}", style(&project.name).bold());
            println!("{}", project_panel(&session, project));

            println!();
            println!("{}", style(tr.t("phase_details")).bold());
            if project.phases.is_empty() {
                println!("{}", style(tr.t("no_phases")).dim());
            } else {
                print!("{}", phase_table(&session, &project.phases, OutputFormat::Table, false));
            }

            println!();
            println!("{}", style(tr.t("resource_details")).bold());
            if project.resources.is_empty() {
                println!("{}", style(tr.t("no_resources")).dim());
            } else {
                print!(
                    "{}",
                    resource_table(&session, &project.resources, OutputFormat::Table, false)
                );
            }

            println!();
            println!("{}", style(tr.t("financials")).bold());
            println!("{}", budget_panel(&session, project));
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    let payload = ProjectPayload {
        name: args.name.trim().to_string(),
        description: args.description,
        status: args.status,
        start_date: args.start,
        end_date: args.end,
        budget: args.budget,
        spent: args.spent,
        health: args.health,
    };
    payload.validate().map_err(|e| miette::miette!("{}", e))?;

    let id = match session.store.add_project(&payload) {
        Ok(id) => id,
        Err(e) => return Err(store_error(&session, e)),
    };
    report_change(&session, global, "project_created", &id);
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = session.resolve(EntityPrefix::Prj, &args.project)?;

    let patch = ProjectPatch {
        name: args.name.map(|n| n.trim().to_string()),
        description: args.description,
        status: args.status,
        start_date: args.start,
        end_date: args.end,
        budget: args.budget,
        spent: args.spent,
        health: args.health,
    };
    if patch.is_empty() {
        return Err(miette::miette!(
            "Nothing to change. Pass at least one field, e.g. --status active"
        ));
    }

    if let Some(current) = session.store.project(&id) {
        current
            .payload()
            .merge(&patch)
            .validate()
            .map_err(|e| miette::miette!("{}", e))?;
    }

    let updated = session
        .store
        .update_project(&id, &patch)
        .map_err(|e| store_error(&session, e))?;
    if !updated {
        return Err(miette::miette!("Project '{}' not found", args.project));
    }
    report_change(&session, global, "project_updated", &id);
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = session.resolve(EntityPrefix::Prj, &args.project)?;
    let label = session.store.display_id(&id);

    let prompt = format!("{} ({})", session.t("confirm_delete_project"), label);
    if !confirm(&prompt, args.yes)? {
        println!("{}", style(session.t("delete_cancelled")).dim());
        return Ok(());
    }

    let removed = session
        .store
        .delete_project(&id)
        .map_err(|e| miette::miette!("{}", e))?;
    if !removed {
        return Err(miette::miette!("Project '{}' not found", args.project));
    }
    if !global.quiet {
        println!(
            "{} {} {}",
            style("✓").green(),
            session.t("project_deleted"),
            style(label).cyan()
        );
    }
    Ok(())
}

/// Print the outcome of a create or update
///
/// With `--format id` only the full ID is printed, for scripting.
pub(crate) fn report_change(session: &Session, global: &GlobalOpts, message_key: &str, id: &str) {
    if global.format == OutputFormat::Id {
        println!("{}", id);
        return;
    }
    if global.quiet {
        return;
    }
    println!(
        "{} {} {}",
        style("✓").green(),
        session.t(message_key),
        style(session.store.display_id(id)).cyan()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::Storage;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn store() -> Store {
        let mut store = Store::open_empty(Storage::in_memory()).unwrap();
        let mut roads = ProjectPayload::new("Ring Road", date("2025-01-01"), date("2025-12-31"));
        roads.description = "Resurface the NORTH ring".to_string();
        roads.status = ProjectStatus::Active;
        store.add_project(&roads).unwrap();
        let mut park = ProjectPayload::new("Central Park", date("2025-02-01"), date("2025-10-31"));
        park.status = ProjectStatus::OnHold;
        store.add_project(&park).unwrap();
        store
    }

    #[test]
    fn test_filter_by_search_on_name_and_description() {
        let store = store();
        let by_name = filter_projects(store.projects(), Some("park"), StatusFilter::All);
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Central Park");

        let by_description = filter_projects(store.projects(), Some("north"), StatusFilter::All);
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].name, "Ring Road");
    }

    #[test]
    fn test_filter_by_status() {
        let store = store();
        assert_eq!(filter_projects(store.projects(), None, StatusFilter::All).len(), 2);
        let on_hold = filter_projects(store.projects(), None, StatusFilter::OnHold);
        assert_eq!(on_hold.len(), 1);
        assert_eq!(on_hold[0].status, ProjectStatus::OnHold);
        assert!(filter_projects(store.projects(), Some("park"), StatusFilter::Active).is_empty());
    }

    #[test]
    fn test_project_rows_carry_short_ids() {
        let store = store();
        let projects: Vec<_> = store.projects().iter().collect();
        let rows = project_rows(&store, &projects);
        assert_eq!(rows[0].short_id, "PRJ@1");
        assert!(matches!(rows[0].get("progress"), Some(CellValue::Percent(0))));
    }
}
