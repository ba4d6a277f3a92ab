//! `mpt notify` command - Dashboard notifications

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::{GlobalOpts, OutputFormat, Session};
use crate::core::identity::EntityPrefix;
use crate::entities::{Notification, Severity};

use super::alerts::notification_table;
use super::project::report_change;

#[derive(Subcommand, Debug)]
pub enum NotifyCommands {
    /// List notifications, newest first
    List(ListArgs),

    /// Post a notification
    Add(AddArgs),

    /// Mark a notification as read
    Read(ReadArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only unread notifications
    #[arg(long)]
    pub unread: bool,

    /// Maximum number shown
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Notification text
    #[arg(long, short = 'm')]
    pub message: String,

    /// info, warning or danger
    #[arg(long, short = 's', default_value = "info")]
    pub severity: Severity,

    /// Project the notification is about
    #[arg(long, short = 'p')]
    pub project: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ReadArgs {
    /// Notification reference (NTF@N, full ID or unique fragment)
    pub notification: String,
}

pub fn run(cmd: NotifyCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        NotifyCommands::List(args) => run_list(args, global),
        NotifyCommands::Add(args) => run_add(args, global),
        NotifyCommands::Read(args) => run_read(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let mut notifications: Vec<Notification> = session
        .store
        .notifications()
        .iter()
        .filter(|n| !args.unread || !n.is_read)
        .cloned()
        .collect();
    if let Some(limit) = args.limit {
        notifications.truncate(limit);
    }

    let format = session.format(global, OutputFormat::Table);
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&notifications).into_diagnostic()?);
        return Ok(());
    }
    if notifications.is_empty() && matches!(format, OutputFormat::Table | OutputFormat::Md) {
        println!("{}", style(session.t("no_notifications")).dim());
        return Ok(());
    }
    print!("{}", notification_table(&session, &notifications, format, true));
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let message = args.message.trim();
    if message.is_empty() {
        return Err(miette::miette!("message must not be blank"));
    }
    let project_id = match args.project {
        Some(ref reference) => Some(session.resolve(EntityPrefix::Prj, reference)?),
        None => None,
    };

    let id = session
        .store
        .add_notification(project_id.as_deref(), message, args.severity)
        .map_err(|e| miette::miette!("{}", e))?;
    report_change(&session, global, "notification_added", &id);
    Ok(())
}

fn run_read(args: ReadArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = session.resolve(EntityPrefix::Ntf, &args.notification)?;

    let changed = session
        .store
        .mark_notification_read(&id)
        .map_err(|e| miette::miette!("{}", e))?;
    if !changed {
        return Err(miette::miette!("Notification '{}' not found", args.notification));
    }
    report_change(&session, global, "notification_read", &id);
    Ok(())
}
