//! `mpt export` command - Export all projects as JSON or CSV

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::write_output;
use crate::cli::{GlobalOpts, OutputFormat, Session};
use crate::core::export::{to_csv, to_json};

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Write to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let projects = session.store.projects();

    let content = match global.format {
        OutputFormat::Auto | OutputFormat::Json => {
            to_json(projects).map(|json| format!("{}\n", json))
        }
        OutputFormat::Csv => to_csv(projects),
        other => {
            return Err(miette::miette!(
                "export supports --format json or csv (got {:?})",
                other
            ))
        }
    }
    .map_err(|e| miette::miette!("{}", e))?;

    let to_file = args.output.is_some();
    write_output(&content, args.output, true)?;
    if to_file && !global.quiet {
        eprintln!(
            "{} {} ({})",
            style("✓").green(),
            session.t("export_success"),
            session.tr.digits(&projects.len().to_string())
        );
    }
    Ok(())
}
