use clap::Parser;
use dpt::cli::{Cli, Commands};
use miette::Result;
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

    // Best-effort warnings (gateway failures, skipped records) go to stderr;
    // tune with DPT_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("DPT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Install miette's fancy error handler for readable diagnostics
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

    match cli.command {
        Commands::Init(args) => dpt::cli::commands::init::run(args),
        Commands::Sync(args) => dpt::cli::commands::sync::run(args, &global),
        Commands::Import(args) => dpt::cli::commands::import::run(args, &global),
        Commands::Query(cmd) => dpt::cli::commands::query::run(cmd, &global),
        Commands::Active(cmd) => dpt::cli::commands::active::run(cmd, &global),
        Commands::Export(args) => dpt::cli::commands::export::run(args, &global),
        Commands::Completions(args) => dpt::cli::commands::completions::run(args),
    }
}
