use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::cluster::{assigned_count, overlapping_count};
use crate::core::dynamic::{count_dead, DynamicCluster};
use crate::parsing::clustering::{read_clustering, DEFAULT_SEPARATOR};
use crate::parsing::timeline::write_timelines;
use crate::tracking::{
    DynamicTracker, MatcherKind, Similarity, TrackerConfig, DEFAULT_DEATH_AGE,
    DEFAULT_MIN_CLUSTER_SIZE, DEFAULT_THRESHOLD,
};

#[derive(Args)]
pub struct TrackArgs {
    /// Step community files, one per time step, in step order
    #[arg(required = true)]
    pub steps: Vec<PathBuf>,

    /// Matching threshold; similarity must exceed this for a match
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,

    /// Steps a community may go unobserved before it dies (<= 0 disables)
    #[arg(short, long, default_value_t = DEFAULT_DEATH_AGE)]
    pub death_age: i32,

    /// Step clusters smaller than this are never tracked
    #[arg(short = 's', long, default_value_t = DEFAULT_MIN_CLUSTER_SIZE)]
    pub min_size: usize,

    /// Similarity measure for front matching
    #[arg(long, value_enum, default_value = "jaccard")]
    pub similarity: Similarity,

    /// Match-finding strategy
    #[arg(long, value_enum, default_value = "indexed")]
    pub matcher: MatcherKind,

    /// Field separator in step community files
    #[arg(long, default_value_t = DEFAULT_SEPARATOR)]
    pub delimiter: char,

    /// Output file prefix
    #[arg(short, long, default_value = "dynamic")]
    pub output: String,
}

/// Execute track subcommand
///
/// # Errors
///
/// Returns an error if the configuration is invalid, a step file cannot be
/// read, or the timeline cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: TrackArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = TrackerConfig {
        threshold: args.threshold,
        death_age: args.death_age,
        min_cluster_size: args.min_size,
        similarity: args.similarity,
        matcher: args.matcher,
    };
    let mut tracker = DynamicTracker::new(config)?;

    if verbose {
        eprintln!(
            "Tracking with {:?} matcher, {:?} similarity, threshold {}",
            args.matcher, args.similarity, args.threshold
        );
    }

    let max_step = args.steps.len();
    for (i, path) in args.steps.iter().enumerate() {
        let step = i + 1;
        let step_clustering = read_clustering(path, args.delimiter)?;

        if verbose {
            eprintln!(
                "Step {step}/{max_step} ({}): {} non-empty step communities, {} nodes assigned, {} in multiple clusters",
                path.display(),
                step_clustering.len(),
                assigned_count(&step_clustering),
                overlapping_count(&step_clustering),
            );
        }

        tracker.add_clustering(&step_clustering);

        if matches!(format, OutputFormat::Text) {
            println!(
                "Step {step}/{max_step}: {} dynamic communities, {} now dead",
                tracker.clusters().len(),
                count_dead(tracker.clusters(), tracker.step(), args.death_age),
            );
        }
    }

    // Count the dead as of the horizon where every community has had its
    // full death window.
    let horizon = tracker
        .step()
        .saturating_add(u32::try_from(args.death_age.max(0)).unwrap_or(0));
    let dead = count_dead(tracker.clusters(), horizon, args.death_age);
    let total = tracker.clusters().len();

    let timeline_path = PathBuf::from(format!("{}.timeline", args.output));
    write_timelines(
        &timeline_path,
        tracker.clusters().iter().map(DynamicCluster::timeline),
    )?;

    match format {
        OutputFormat::Text => {
            println!("Tracked {total} dynamic communities, {dead} now dead");
            println!("Wrote timeline to {}", timeline_path.display());
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "steps": max_step,
                "communities": total,
                "dead": dead,
                "similarity": args.similarity,
                "matcher": args.matcher,
                "threshold": args.threshold,
                "timeline_file": timeline_path,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
