use clap::Parser;
use miette::Result;
use mpt::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    // MPT_LOG takes a tracing filter, e.g. `MPT_LOG=mpt=debug`
    let default_level = if global.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("MPT_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init(args) => mpt::cli::commands::init::run(args, &global),
        Commands::Dashboard(args) => mpt::cli::commands::dashboard::run(args, &global),
        Commands::Project(cmd) => mpt::cli::commands::project::run(cmd, &global),
        Commands::Phase(cmd) => mpt::cli::commands::phase::run(cmd, &global),
        Commands::Resource(cmd) => mpt::cli::commands::resource::run(cmd, &global),
        Commands::Alerts(args) => mpt::cli::commands::alerts::run(args, &global),
        Commands::Notify(cmd) => mpt::cli::commands::notify::run(cmd, &global),
        Commands::Export(args) => mpt::cli::commands::export::run(args, &global),
        Commands::Report(args) => mpt::cli::commands::report::run(args, &global),
        Commands::Lang(args) => mpt::cli::commands::lang::run(args, &global),
        Commands::Config(cmd) => mpt::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => mpt::cli::commands::completions::run(args),
    }
}
