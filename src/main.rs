use clap::Parser;
use tracing_subscriber::EnvFilter;

use commtrack::cli::{self, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("commtrack=debug,info")
    } else {
        EnvFilter::new("commtrack=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Track(args) => {
            cli::track::run(args, cli.format, cli.verbose)?;
        }
        Commands::Aggregate(args) => {
            cli::aggregate::run(args, cli.format, cli.verbose)?;
        }
        Commands::TimelineStats(args) => {
            cli::stats::run_timeline(args, cli.format, cli.verbose)?;
        }
        Commands::NodeStats(args) => {
            cli::stats::run_nodes(args, cli.format, cli.verbose)?;
        }
        Commands::StepStats(args) => {
            cli::stats::run_steps(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
