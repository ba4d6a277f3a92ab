//! `mpt alerts` command - Upcoming deadlines and recent notifications

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat, Session};
use crate::core::alerts::{recent_notifications, upcoming_deadlines, Deadline};
use crate::core::identity::EntityPrefix;
use crate::entities::Notification;

#[derive(clap::Args, Debug)]
pub struct AlertsArgs {
    /// Look-ahead window in days (default from config, 30)
    #[arg(long)]
    pub window: Option<i64>,

    /// Maximum deadlines shown (default from config, 5)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Maximum notifications shown (default from config, 6)
    #[arg(long)]
    pub notifications: Option<usize>,
}

const DEADLINE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("project", "project"),
    ColumnDef::new("phase", "phase_name"),
    ColumnDef::new("end_date", "phase_end_date"),
    ColumnDef::new("days_left", "days_left"),
    ColumnDef::new("urgency", "severity"),
];

const NOTIFICATION_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("message", "message"),
    ColumnDef::new("project", "project"),
    ColumnDef::new("severity", "severity"),
    ColumnDef::new("created_at", "created_at"),
    ColumnDef::new("read", "read"),
];

/// The alerts panel as emitted in JSON
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AlertsView<'a> {
    pub deadlines: Vec<Deadline<'a>>,
    pub notifications: &'a [Notification],
}

impl<'a> AlertsView<'a> {
    /// Deadlines and notifications using configured limits unless overridden
    pub(crate) fn collect(
        session: &'a Session,
        window: Option<i64>,
        limit: Option<usize>,
        notification_limit: Option<usize>,
    ) -> Self {
        let config = &session.config;
        Self {
            deadlines: upcoming_deadlines(
                session.store.projects(),
                session.today,
                window.unwrap_or_else(|| config.deadline_window_days()),
                limit.unwrap_or_else(|| config.deadline_limit()),
            ),
            notifications: recent_notifications(
                session.store.notifications(),
                notification_limit.unwrap_or_else(|| config.notification_limit()),
            ),
        }
    }
}

pub(crate) fn deadline_table(
    session: &Session,
    deadlines: &[Deadline<'_>],
    format: OutputFormat,
) -> String {
    let rows: Vec<TableRow> = deadlines
        .iter()
        .map(|d| {
            TableRow::new(&d.phase.id, session.store.short_id(&d.phase.id))
                .cell("project", CellValue::Text(d.project_name.to_string()))
                .cell("phase", CellValue::Text(d.phase.name.clone()))
                .cell("end_date", CellValue::Date(d.phase.end_date))
                .cell("days_left", CellValue::Number(d.days_left))
                .cell("urgency", CellValue::Severity(d.urgency.severity()))
        })
        .collect();
    TableFormatter::new(DEADLINE_COLUMNS, &session.tr, EntityPrefix::Phs)
        .without_summary()
        .render(&rows, format)
}

pub(crate) fn notification_table(
    session: &Session,
    notifications: &[Notification],
    format: OutputFormat,
    with_summary: bool,
) -> String {
    let store = &session.store;
    let rows: Vec<TableRow> = notifications
        .iter()
        .map(|n| {
            let project = n
                .project_id
                .as_deref()
                .and_then(|id| store.project(id))
                .map(|p| CellValue::Text(p.name.clone()))
                .unwrap_or(CellValue::Empty);
            TableRow::new(&n.id, store.short_id(&n.id))
                .cell("message", CellValue::Text(n.message.clone()))
                .cell("project", project)
                .cell("severity", CellValue::Severity(n.severity))
                .cell("created_at", CellValue::DateTime(n.created_at))
                .cell("read", CellValue::Read(n.is_read))
        })
        .collect();
    let formatter = TableFormatter::new(NOTIFICATION_COLUMNS, &session.tr, EntityPrefix::Ntf);
    if with_summary {
        formatter.render(&rows, format)
    } else {
        formatter.without_summary().render(&rows, format)
    }
}

/// Print both alert sections under headings
pub(crate) fn print_alerts(session: &Session, view: &AlertsView<'_>, format: OutputFormat) {
    println!("{}", style(session.t("upcoming_deadlines")).bold());
    if view.deadlines.is_empty() {
        println!("{}", style(session.t("no_deadlines")).dim());
    } else {
        print!("{}", deadline_table(session, &view.deadlines, format));
    }

    println!();
    println!("{}", style(session.t("notifications")).bold());
    if view.notifications.is_empty() {
        println!("{}", style(session.t("no_notifications")).dim());
    } else {
        print!("{}", notification_table(session, view.notifications, format, false));
    }
}

pub fn run(args: AlertsArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let view = AlertsView::collect(&session, args.window, args.limit, args.notifications);

    match session.format(global, OutputFormat::Table) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&view).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            print!("{}", deadline_table(&session, &view.deadlines, OutputFormat::Csv));
        }
        OutputFormat::Id => {
            for d in &view.deadlines {
                println!("{}", d.phase.id);
            }
        }
        format => print_alerts(&session, &view, format),
    }
    Ok(())
}
