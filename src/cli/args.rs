//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    alerts::AlertsArgs, completions::CompletionsArgs, config::ConfigCommands,
    dashboard::DashboardArgs, export::ExportArgs, init::InitArgs, lang::LangArgs,
    notify::NotifyCommands, phase::PhaseCommands, project::ProjectCommands,
    report::ReportArgs, resource::ResourceCommands,
};
use crate::core::i18n::Locale;

#[derive(Parser)]
#[command(name = "mpt")]
#[command(author, version, about = "Municipal project tracker")]
#[command(
    long_about = "Track municipal development projects, their phases, resources and budgets from the terminal, in Arabic or English."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Interface language (overrides the saved preference)
    #[arg(long, short = 'l', global = true)]
    pub lang: Option<Locale>,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace root (default: auto-detect by finding .mpt/)
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new workspace
    Init(InitArgs),

    /// Show metric cards, the project table and alerts
    #[command(visible_alias = "dash")]
    Dashboard(DashboardArgs),

    /// Project management
    #[command(subcommand, visible_alias = "prj")]
    Project(ProjectCommands),

    /// Phase management
    #[command(subcommand, visible_alias = "phs")]
    Phase(PhaseCommands),

    /// Resource allocation management
    #[command(subcommand, visible_alias = "res")]
    Resource(ResourceCommands),

    /// Upcoming deadlines and recent notifications
    Alerts(AlertsArgs),

    /// Notification management
    #[command(subcommand)]
    Notify(NotifyCommands),

    /// Export projects as JSON or CSV (use --format)
    Export(ExportArgs),

    /// Printable markdown report
    Report(ReportArgs),

    /// Show or change the interface language
    Lang(LangArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pick per command (tables for lists, panels for details)
    #[default]
    Auto,
    /// Aligned table
    Table,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}
