use std::path::PathBuf;

use anyhow::bail;
use clap::Args;
use tracing::warn;

use crate::aggregate::{AggregateConfig, TimelineAggregator};
use crate::cli::OutputFormat;
use crate::core::cluster::{remove_duplicate_clusters, remove_small_clusters};
use crate::core::timeline::Timeline;
use crate::parsing::clustering::{read_clustering, write_clustering, DEFAULT_SEPARATOR};
use crate::parsing::timeline::read_timelines;
use crate::tracking::DEFAULT_MIN_CLUSTER_SIZE;

/// Default minimum number of observations for a persistent timeline.
pub const DEFAULT_MIN_LENGTH: usize = 2;

#[derive(Args)]
pub struct AggregateArgs {
    /// Timeline file produced by `track`
    #[arg(short = 'i', long)]
    pub timeline: PathBuf,

    /// Step community files, one per time step, in step order
    #[arg(required = true)]
    pub steps: Vec<PathBuf>,

    /// Persistence threshold; 0 takes the plain union of step memberships
    #[arg(short, long, default_value_t = 0.0)]
    pub persist: f64,

    /// Truncate the timeline at this step
    #[arg(long)]
    pub max_step: Option<u32>,

    /// Minimum number of observations for a timeline to be aggregated
    #[arg(long, default_value_t = DEFAULT_MIN_LENGTH)]
    pub min_length: usize,

    /// Field separator in step community files
    #[arg(long, default_value_t = DEFAULT_SEPARATOR)]
    pub delimiter: char,

    /// List each aggregated community's size and observation count
    #[arg(long)]
    pub report: bool,

    /// Output file prefix
    #[arg(short, long, default_value = "dynamic")]
    pub output: String,
}

#[derive(serde::Serialize)]
struct CommunityReport {
    community: usize,
    size: usize,
    observations: usize,
}

/// Execute aggregate subcommand
///
/// # Errors
///
/// Returns an error if the arguments are invalid, the timeline or a step
/// file cannot be read, or the persistent communities cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: AggregateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&args.persist) {
        bail!(
            "invalid persistence threshold {}: value should be between 0 and 1",
            args.persist
        );
    }

    let set = read_timelines(&args.timeline)?;
    if verbose {
        eprintln!(
            "Read {} dynamic community timelines spanning {} steps from {}",
            set.timelines.len(),
            set.max_step,
            args.timeline.display(),
        );
    }

    let max_step = match args.max_step {
        Some(user_max) if user_max > 0 && user_max < set.max_step => {
            if verbose {
                eprintln!("Timeline will be truncated at step {user_max}");
            }
            user_max
        }
        _ => set.max_step,
    };

    let supplied = args.steps.len();
    if supplied < max_step as usize {
        bail!("incorrect number of step files specified ({supplied} < {max_step})");
    } else if supplied > max_step as usize {
        warn!("some step files will be ignored ({supplied} > {max_step})");
    }

    if args.min_length < 1 || args.min_length > max_step as usize {
        bail!(
            "invalid minimum persistent timeline length {} for {} steps",
            args.min_length,
            max_step
        );
    }

    let observations: Vec<usize> = set.timelines.iter().map(Timeline::size).collect();
    let mut aggregator = TimelineAggregator::new(
        set.timelines,
        AggregateConfig {
            persist_threshold: args.persist,
            min_length: args.min_length,
            max_step,
        },
    );

    let summary = aggregator.filter_summary();
    if verbose {
        if summary.too_short > 0 {
            eprintln!(
                "Ignoring {} communities of duration < {}",
                summary.too_short, args.min_length
            );
        }
        if summary.inactive > 0 {
            eprintln!("Ignoring {} inactive communities", summary.inactive);
        }
        if args.persist > 0.0 {
            eprintln!(
                "Keeping nodes appearing in >= {} associated step communities",
                aggregator.min_persist_steps()
            );
        }
    }

    for (i, path) in args.steps.iter().take(max_step as usize).enumerate() {
        let step_clustering = read_clustering(path, args.delimiter)?;
        if verbose {
            eprintln!(
                "Step {}/{max_step} ({}): {} non-empty step communities",
                i + 1,
                path.display(),
                step_clustering.len(),
            );
        }
        aggregator.add_step_clustering(&step_clustering);
    }

    // Per-community report rows, gathered while slots are still
    // index-aligned with the timelines.
    let kept: Vec<usize> = (0..observations.len())
        .filter(|&dyn_index| !aggregator.is_ignored(dyn_index))
        .collect();
    let mut persist_clustering = aggregator.finish();
    let community_report: Vec<CommunityReport> = if args.report {
        kept.iter()
            .map(|&dyn_index| CommunityReport {
                community: dyn_index + 1,
                size: persist_clustering[dyn_index].len(),
                observations: observations[dyn_index],
            })
            .collect()
    } else {
        Vec::new()
    };

    // The slots of ignored timelines are empty and fall out here with the
    // genuinely small groups.
    let ignored = summary.too_short + summary.inactive;
    let removed_small = remove_small_clusters(&mut persist_clustering, DEFAULT_MIN_CLUSTER_SIZE)
        .saturating_sub(ignored);
    let removed_duplicates = remove_duplicate_clusters(&mut persist_clustering);

    let persist_path = PathBuf::from(format!("{}.persist", args.output));
    write_clustering(&persist_path, args.delimiter, &persist_clustering)?;

    match format {
        OutputFormat::Text => {
            if args.report {
                println!(
                    "Aggregated {} of {} dynamic communities:",
                    kept.len(),
                    observations.len(),
                );
                for row in &community_report {
                    println!(
                        "D{}: size={} observations={}",
                        row.community, row.size, row.observations,
                    );
                }
            }
            if removed_small > 0 {
                println!("Removed {removed_small} group(s) of size < {DEFAULT_MIN_CLUSTER_SIZE}");
            }
            if removed_duplicates > 0 {
                println!("Removed {removed_duplicates} duplicate group(s)");
            }
            println!(
                "Wrote {} persistent communities to {}",
                persist_clustering.len(),
                persist_path.display(),
            );
        }
        OutputFormat::Json => {
            let mut output = serde_json::json!({
                "steps": max_step,
                "persist_threshold": args.persist,
                "communities": persist_clustering.len(),
                "removed_small": removed_small,
                "removed_duplicates": removed_duplicates,
                "ignored_short": summary.too_short,
                "ignored_inactive": summary.inactive,
                "persist_file": persist_path,
            });
            if args.report {
                output["community_report"] = serde_json::json!(community_report);
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
