//! `mpt init` command - Initialize a new workspace

use chrono::Local;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::storage::Storage;
use crate::core::store::Store;
use crate::core::workspace::{Workspace, WorkspaceError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Start with an empty database instead of sample projects
    #[arg(long)]
    pub empty: bool,

    /// Reinitialize even if .mpt/ already exists (discards stored data)
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        if !global.quiet {
            println!(
                "{} Created directory {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
    }

    let workspace = if args.force {
        Workspace::init_force(&path)
    } else {
        Workspace::init(&path)
    };

    let workspace = match workspace {
        Ok(workspace) => workspace,
        Err(WorkspaceError::AlreadyExists(path)) => {
            println!(
                "{} MPT workspace already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("mpt init --force").yellow());
            return Ok(());
        }
        Err(e) => return Err(miette::miette!("{}", e)),
    };

    let storage = Storage::load(&workspace.storage_path()).map_err(|e| miette::miette!("{}", e))?;
    let store = if args.empty {
        Store::open_empty(storage)
    } else {
        Store::open(storage, Local::now().date_naive())
    }
    .map_err(|e| miette::miette!("{}", e))?;

    if global.quiet {
        return Ok(());
    }

    println!(
        "{} Initialized MPT workspace at {}",
        style("✓").green(),
        style(workspace.root().display()).cyan()
    );
    println!(
        "  {} project(s), {} notification(s)",
        style(store.projects().len()).cyan(),
        style(store.notifications().len()).cyan()
    );
    println!();
    println!("Next steps:");
    println!("  {} Open the dashboard", style("mpt dashboard").yellow());
    println!(
        "  {} Add a project",
        style("mpt project new --name <NAME> --start <DATE> --end <DATE>").yellow()
    );
    println!("  {} Switch language", style("mpt lang en").yellow());
    Ok(())
}
