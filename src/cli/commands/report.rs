//! `mpt report` command - Printable markdown report

use miette::Result;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::write_output;
use crate::cli::table::TableFormatter;
use crate::cli::{GlobalOpts, OutputFormat, Session};
use crate::core::identity::EntityPrefix;
use crate::core::metrics::{project_progress, DashboardMetrics};

use super::alerts::{deadline_table, notification_table, AlertsView};
use super::dashboard::metric_cards;
use super::phase::phase_table;
use super::project::{project_rows, PROJECT_COLUMNS};
use super::resource::resource_table;

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Leave out the per-project phase and resource sections
    #[arg(long)]
    pub summary_only: bool,
}

pub fn run(args: ReportArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let report = build_report(&session, args.summary_only);
    write_output(&report, args.output, global.quiet)
}

/// Render the whole dashboard as a markdown document
pub(crate) fn build_report(session: &Session, summary_only: bool) -> String {
    let tr = &session.tr;
    let projects = session.store.projects();
    let metrics = DashboardMetrics::compute(projects);

    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", tr.t("app_title")));
    output.push_str(&format!(
        "{}: {}\n\n",
        tr.t("generated_at"),
        tr.format_date(session.today)
    ));

    output.push_str(&format!("## {}\n\n", tr.t("dashboard")));
    let mut builder = Builder::default();
    builder.push_record([tr.t("field"), tr.t("value")]);
    for (label, value) in metric_cards(&metrics, tr) {
        builder.push_record([label, value]);
    }
    let mut table = builder.build();
    table.with(Style::markdown());
    output.push_str(&format!("{}\n\n", table));

    output.push_str(&format!("## {}\n\n", tr.t("projects")));
    if projects.is_empty() {
        output.push_str(&format!("_{}_\n\n", tr.t("no_projects")));
    } else {
        let all: Vec<_> = projects.iter().collect();
        let rows = project_rows(&session.store, &all);
        output.push_str(
            &TableFormatter::new(PROJECT_COLUMNS, tr, EntityPrefix::Prj).render(&rows, OutputFormat::Md),
        );
        output.push('\n');
    }

    if !summary_only {
        for project in projects {
            output.push_str(&format!(
                "### {} ({})\n\n",
                project.name,
                tr.format_percent(project_progress(project))
            ));
            if !project.description.is_empty() {
                output.push_str(&format!("{}\n\n", project.description));
            }
            output.push_str(&format!(
                "{}: {} / {} ({}: {})\n\n",
                tr.t("financials"),
                tr.format_number(project.spent),
                tr.format_number(project.budget),
                tr.t("remaining_budget"),
                tr.format_number(project.remaining_budget())
            ));

            output.push_str(&format!("#### {}\n\n", tr.t("phase_details")));
            if project.phases.is_empty() {
                output.push_str(&format!("_{}_\n\n", tr.t("no_phases")));
            } else {
                output.push_str(&phase_table(session, &project.phases, OutputFormat::Md, false));
                output.push('\n');
            }

            output.push_str(&format!("#### {}\n\n", tr.t("resource_details")));
            if project.resources.is_empty() {
                output.push_str(&format!("_{}_\n\n", tr.t("no_resources")));
            } else {
                output.push_str(&resource_table(
                    session,
                    &project.resources,
                    OutputFormat::Md,
                    false,
                ));
                output.push('\n');
            }
        }
    }

    let alerts = AlertsView::collect(session, None, None, None);
    output.push_str(&format!("## {}\n\n", tr.t("upcoming_deadlines")));
    if alerts.deadlines.is_empty() {
        output.push_str(&format!("_{}_\n\n", tr.t("no_deadlines")));
    } else {
        output.push_str(&deadline_table(session, &alerts.deadlines, OutputFormat::Md));
        output.push('\n');
    }

    output.push_str(&format!("## {}\n\n", tr.t("notifications")));
    if alerts.notifications.is_empty() {
        output.push_str(&format!("_{}_\n", tr.t("no_notifications")));
    } else {
        output.push_str(&notification_table(
            session,
            alerts.notifications,
            OutputFormat::Md,
            false,
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::i18n::Locale;
    use crate::core::storage::Storage;
    use crate::core::store::Store;
    use crate::core::Workspace;

    fn session(tmp: &tempfile::TempDir, seeded: bool) -> Session {
        let workspace = Workspace::init(tmp.path()).unwrap();
        let storage = Storage::load(&workspace.storage_path()).unwrap();
        let today = chrono::Local::now().date_naive();
        if seeded {
            Store::open(storage, today).unwrap();
        } else {
            Store::open_empty(storage).unwrap();
        }

        let global = GlobalOpts {
            format: OutputFormat::Auto,
            lang: Some(Locale::En),
            quiet: true,
            verbose: false,
            workspace: Some(tmp.path().to_path_buf()),
        };
        Session::open(&global).unwrap()
    }

    #[test]
    fn test_report_sections() {
        let tmp = tempfile::tempdir().unwrap();
        let report = build_report(&session(&tmp, true), false);
        assert!(report.starts_with("# Municipal Project Tracker\n"));
        assert!(report.contains("## Dashboard"));
        let total = report
            .lines()
            .find(|line| line.starts_with("| Total projects"))
            .unwrap();
        assert!(total.contains(" 4 "));
        assert!(report.contains("#### Phases"));
        assert!(report.contains("## Upcoming deadlines"));
        assert!(report.contains("## Notifications"));
    }

    #[test]
    fn test_summary_only_skips_project_sections() {
        let tmp = tempfile::tempdir().unwrap();
        let report = build_report(&session(&tmp, true), true);
        assert!(!report.contains("#### Phases"));
        assert!(report.contains("## Projects"));
    }

    #[test]
    fn test_empty_report() {
        let tmp = tempfile::tempdir().unwrap();
        let report = build_report(&session(&tmp, false), false);
        assert!(report.contains("_No projects found_"));
        assert!(report.contains("_No upcoming deadlines_"));
        assert!(report.contains("_No notifications_"));
    }
}
