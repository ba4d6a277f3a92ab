//! `mpt dashboard` command - Metric cards, project table and alerts

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::table::{render_panel, TableFormatter};
use crate::cli::{GlobalOpts, OutputFormat, Session};
use crate::core::i18n::Translator;
use crate::core::identity::EntityPrefix;
use crate::core::metrics::DashboardMetrics;

use super::alerts::{print_alerts, AlertsView};
use super::project::{filter_projects, project_rows, ProjectView, StatusFilter, PROJECT_COLUMNS};

#[derive(clap::Args, Debug)]
pub struct DashboardArgs {
    /// Only show projects matching this text in the table
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Only show projects with this status in the table
    #[arg(long, default_value = "all")]
    pub status: StatusFilter,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardView<'a> {
    generated_at: chrono::NaiveDate,
    locale: &'static str,
    metrics: DashboardMetrics,
    projects: Vec<ProjectView<'a>>,
    #[serde(flatten)]
    alerts: AlertsView<'a>,
}

/// Label/value pairs for the metric cards
pub(crate) fn metric_cards(metrics: &DashboardMetrics, tr: &Translator) -> Vec<(String, String)> {
    let count = |n: usize| tr.digits(&n.to_string());
    let mut cards = vec![
        (tr.t("total_projects").to_string(), count(metrics.total_projects)),
        (tr.t("active_projects").to_string(), count(metrics.active_projects)),
        (
            tr.t("completed_projects").to_string(),
            count(metrics.completed_projects),
        ),
        (
            tr.t("quarterly_progress").to_string(),
            tr.format_percent(metrics.average_progress),
        ),
        (
            tr.t("budget_utilization").to_string(),
            tr.format_percent(metrics.budget_utilization),
        ),
        (tr.t("total_budget").to_string(), tr.format_number(metrics.total_budget)),
        (tr.t("total_spent").to_string(), tr.format_number(metrics.total_spent)),
        (
            tr.t("remaining_budget").to_string(),
            tr.format_number(metrics.remaining_budget()),
        ),
    ];
    if let Some(health) = metrics.headline_health {
        cards.push((tr.t("health_status").to_string(), tr.health(health).to_string()));
    }
    cards
}

pub fn run(args: DashboardArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let metrics = DashboardMetrics::compute(session.store.projects());
    let projects = filter_projects(session.store.projects(), args.search.as_deref(), args.status);
    let alerts = AlertsView::collect(&session, None, None, None);

    let format = session.format(global, OutputFormat::Table);
    if format == OutputFormat::Json {
        let view = DashboardView {
            generated_at: session.today,
            locale: session.tr.locale().code(),
            metrics,
            projects: projects
                .iter()
                .map(|p| ProjectView::new(&session.store, p))
                .collect(),
            alerts,
        };
        println!("{}", serde_json::to_string_pretty(&view).into_diagnostic()?);
        return Ok(());
    }

    let tr = &session.tr;
    println!("{}", style(tr.t("app_title")).bold());
    println!("{}", render_panel(&metric_cards(&metrics, tr), tr));

    println!();
    println!("{}", style(tr.t("projects")).bold());
    if projects.is_empty() {
        println!("{}", style(tr.t("no_projects")).dim());
    } else {
        let rows = project_rows(&session.store, &projects);
        print!(
            "{}",
            TableFormatter::new(PROJECT_COLUMNS, tr, EntityPrefix::Prj).render(&rows, format)
        );
    }

    println!();
    print_alerts(&session, &alerts, format);
    Ok(())
}
