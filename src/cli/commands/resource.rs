//! `mpt resource` command - Resource allocation

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::confirm;
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat, Session};
use crate::core::identity::EntityPrefix;
use crate::core::store::Store;
use crate::entities::{Resource, ResourcePatch, ResourcePayload};

use super::project::report_change;

#[derive(Subcommand, Debug)]
pub enum ResourceCommands {
    /// List resources of one project, or of every project
    List(ListArgs),

    /// Allocate a resource to a project
    New(NewArgs),

    /// Change fields of an existing resource
    Edit(EditArgs),

    /// Remove a resource
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Project reference; omit to list resources of all projects
    pub project: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project reference (PRJ@N, full ID or unique fragment)
    pub project: String,

    #[arg(long, short = 'n')]
    pub name: String,

    /// Kind of resource, e.g. team, equipment, contractor
    #[arg(long = "type", short = 't')]
    pub resource_type: String,

    /// Share allocated to the project, in percent
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub allocation: u8,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Resource reference (RES@N, full ID or unique fragment)
    pub resource: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long = "type", short = 't')]
    pub resource_type: Option<String>,

    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub allocation: Option<u8>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Resource reference (RES@N, full ID or unique fragment)
    pub resource: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: ResourceCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ResourceCommands::List(args) => run_list(args, global),
        ResourceCommands::New(args) => run_new(args, global),
        ResourceCommands::Edit(args) => run_edit(args, global),
        ResourceCommands::Delete(args) => run_delete(args, global),
    }
}

const RESOURCE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "resource_name"),
    ColumnDef::new("type", "resource_type"),
    ColumnDef::new("allocation", "resource_allocation"),
];

const RESOURCE_COLUMNS_WITH_PROJECT: &[ColumnDef] = &[
    ColumnDef::new("project", "project"),
    ColumnDef::new("name", "resource_name"),
    ColumnDef::new("type", "resource_type"),
    ColumnDef::new("allocation", "resource_allocation"),
];

pub(crate) fn resource_table(
    session: &Session,
    resources: &[Resource],
    format: OutputFormat,
    with_project: bool,
) -> String {
    let store = &session.store;
    let rows: Vec<TableRow> = resources
        .iter()
        .map(|res| {
            let project_name = store
                .project(&res.project_id)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            TableRow::new(&res.id, store.short_id(&res.id))
                .cell("project", CellValue::Text(project_name))
                .cell("name", CellValue::Text(res.name.clone()))
                .cell("type", CellValue::Text(res.resource_type.clone()))
                .cell("allocation", CellValue::Percent(res.allocation.into()))
        })
        .collect();

    let columns = if with_project {
        RESOURCE_COLUMNS_WITH_PROJECT
    } else {
        RESOURCE_COLUMNS
    };
    let formatter = TableFormatter::new(columns, &session.tr, EntityPrefix::Res);
    if with_project {
        formatter.render(&rows, format)
    } else {
        formatter.without_summary().render(&rows, format)
    }
}

pub(crate) fn find_resource<'a>(store: &'a Store, id: &str) -> Option<&'a Resource> {
    store
        .projects()
        .iter()
        .flat_map(|p| p.resources.iter())
        .find(|res| res.id == id)
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let format = session.format(global, OutputFormat::Table);

    let resources: Vec<Resource> = match args.project {
        Some(ref reference) => {
            let id = session.resolve(EntityPrefix::Prj, reference)?;
            session
                .store
                .project(&id)
                .map(|p| p.resources.clone())
                .unwrap_or_default()
        }
        None => session
            .store
            .projects()
            .iter()
            .flat_map(|p| p.resources.iter().cloned())
            .collect(),
    };

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&resources).into_diagnostic()?);
        return Ok(());
    }
    if resources.is_empty() && matches!(format, OutputFormat::Table | OutputFormat::Md) {
        println!("{}", style(session.t("no_resources")).dim());
        return Ok(());
    }
    print!("{}", resource_table(&session, &resources, format, true));
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let project_id = session.resolve(EntityPrefix::Prj, &args.project)?;

    let payload = ResourcePayload {
        name: args.name.trim().to_string(),
        resource_type: args.resource_type.trim().to_string(),
        allocation: args.allocation,
    };
    payload.validate().map_err(|e| miette::miette!("{}", e))?;

    let id = session
        .store
        .add_resource(&project_id, &payload)
        .map_err(|e| miette::miette!("{}", e))?;
    report_change(&session, global, "resource_created", &id);
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = session.resolve(EntityPrefix::Res, &args.resource)?;

    let patch = ResourcePatch {
        name: args.name.map(|n| n.trim().to_string()),
        resource_type: args.resource_type.map(|t| t.trim().to_string()),
        allocation: args.allocation,
    };
    if patch.is_empty() {
        return Err(miette::miette!(
            "Nothing to change. Pass at least one field, e.g. --allocation 50"
        ));
    }
    if let Some(current) = find_resource(&session.store, &id) {
        current
            .payload()
            .merge(&patch)
            .validate()
            .map_err(|e| miette::miette!("{}", e))?;
    }

    let updated = session
        .store
        .update_resource(&id, &patch)
        .map_err(|e| miette::miette!("{}", e))?;
    if !updated {
        return Err(miette::miette!("Resource '{}' not found", args.resource));
    }
    report_change(&session, global, "resource_updated", &id);
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = session.resolve(EntityPrefix::Res, &args.resource)?;
    let label = session.store.display_id(&id);

    let prompt = format!("{} ({})", session.t("confirm_delete_resource"), label);
    if !confirm(&prompt, args.yes)? {
        println!("{}", style(session.t("delete_cancelled")).dim());
        return Ok(());
    }

    let removed = session
        .store
        .delete_resource(&id)
        .map_err(|e| miette::miette!("{}", e))?;
    if !removed {
        return Err(miette::miette!("Resource '{}' not found", args.resource));
    }
    if !global.quiet {
        println!(
            "{} {} {}",
            style("✓").green(),
            session.t("resource_deleted"),
            style(label).cyan()
        );
    }
    Ok(())
}
