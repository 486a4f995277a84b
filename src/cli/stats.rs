use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::bail;
use clap::Args;
use serde::Serialize;
use tracing::warn;

use crate::cli::OutputFormat;
use crate::core::cluster::{assigned_count, assigned_nodes, count_to_f64, Cluster, Node};
use crate::parsing::clustering::{read_clustering, DEFAULT_SEPARATOR};
use crate::parsing::timeline::read_timelines;
use crate::tracking::DEFAULT_DEATH_AGE;

/// Default observation count above which a community is long-lived.
pub const DEFAULT_LONG_LIVED: usize = 2;

#[derive(Args)]
pub struct TimelineStatsArgs {
    /// Timeline file produced by `track`
    #[arg(required = true)]
    pub timeline: PathBuf,

    /// Steps a community may go unobserved before it counts as dead
    #[arg(long, default_value_t = DEFAULT_DEATH_AGE)]
    pub death_age: i32,

    /// Communities observed in more than this many steps are long-lived
    #[arg(long, default_value_t = DEFAULT_LONG_LIVED)]
    pub long_lived: usize,
}

#[derive(Args)]
pub struct NodeStatsArgs {
    /// Timeline file produced by `track`
    #[arg(short = 'i', long)]
    pub timeline: PathBuf,

    /// Step community files, one per time step, in step order
    #[arg(required = true)]
    pub steps: Vec<PathBuf>,

    /// Field separator in step community files
    #[arg(long, default_value_t = DEFAULT_SEPARATOR)]
    pub delimiter: char,
}

#[derive(Args)]
pub struct StepStatsArgs {
    /// Step community files, one per time step, in step order
    #[arg(required = true)]
    pub steps: Vec<PathBuf>,

    /// Field separator in step community files
    #[arg(long, default_value_t = DEFAULT_SEPARATOR)]
    pub delimiter: char,
}

#[derive(Serialize)]
struct FrequencyBucket {
    steps: usize,
    communities: usize,
}

#[derive(Serialize)]
struct TimelineStatsReport {
    communities: usize,
    max_step: u32,
    long_lived: usize,
    short_lived: usize,
    intermittent: usize,
    dead: usize,
    observation_frequencies: Vec<FrequencyBucket>,
    consecutive_frequencies: Vec<FrequencyBucket>,
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * count_to_f64(part) / count_to_f64(total)
}

/// Execute timeline-stats subcommand
///
/// # Errors
///
/// Returns an error if the timeline file cannot be read or parsed.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run_timeline(
    args: TimelineStatsArgs,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let set = read_timelines(&args.timeline)?;
    let total = set.timelines.len();
    let max_step = set.max_step;

    if verbose {
        eprintln!("Found {total} dynamic community timelines from {max_step} time steps");
    }

    let mut freq = vec![0usize; max_step as usize + 1];
    let mut consec = vec![0usize; max_step as usize + 1];
    let mut long_lived = 0;
    let mut intermittent = 0;
    let mut dead = 0;
    for timeline in &set.timelines {
        let seen = timeline.size();
        if seen > args.long_lived {
            long_lived += 1;
        }
        freq[seen.min(max_step as usize)] += 1;
        consec[timeline.consecutive_length().min(max_step as usize)] += 1;
        // Gaps in the observed span make a community intermittent
        if let Some(first) = timeline.first_observed() {
            let span = (timeline.last_observed() - first + 1) as usize;
            if span > seen {
                intermittent += 1;
            }
        }
        if timeline.is_dead(max_step, args.death_age) {
            dead += 1;
        }
    }
    let short_lived = total - long_lived;

    match format {
        OutputFormat::Text => {
            println!(
                "Observed {long_lived} long-lived communities of length > {} ({:.1}%)",
                args.long_lived,
                percent(long_lived, total),
            );
            println!(
                "Observed {short_lived} short-lived communities of length <= {} ({:.1}%)",
                args.long_lived,
                percent(short_lived, total),
            );
            println!(
                "Observed {intermittent} intermittent communities ({:.1}%)",
                percent(intermittent, total),
            );
            println!(
                "{dead} communities were dead by step {max_step} ({:.1}%)",
                percent(dead, total),
            );
            println!("Observation frequencies:");
            for steps in (1..=max_step as usize).rev() {
                println!(
                    "  Present in {steps} step(s): {} communities ({:.1}%)",
                    freq[steps],
                    percent(freq[steps], total),
                );
            }
            println!("Consecutive observation frequencies:");
            for steps in (1..=max_step as usize).rev() {
                println!(
                    "  Present in {steps} consecutive step(s): {} communities ({:.1}%)",
                    consec[steps],
                    percent(consec[steps], total),
                );
            }
        }
        OutputFormat::Json => {
            let buckets = |counts: &[usize]| {
                counts
                    .iter()
                    .enumerate()
                    .skip(1)
                    .map(|(steps, &communities)| FrequencyBucket { steps, communities })
                    .collect()
            };
            let report = TimelineStatsReport {
                communities: total,
                max_step,
                long_lived,
                short_lived,
                intermittent,
                dead,
                observation_frequencies: buckets(&freq),
                consecutive_frequencies: buckets(&consec),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct NodeCohort {
    consecutive_steps: usize,
    communities: usize,
    community_percent: f64,
    nodes: usize,
    node_percent: f64,
    mean_communities_per_node: f64,
    max_communities_per_node: usize,
}

#[derive(Serialize)]
struct NodeStatsReport {
    total_nodes: usize,
    cohorts: Vec<NodeCohort>,
}

/// Execute node-stats subcommand
///
/// # Errors
///
/// Returns an error if the timeline or a step file cannot be read, or if
/// fewer step files are supplied than the timeline spans.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run_nodes(args: NodeStatsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let set = read_timelines(&args.timeline)?;
    let max_step = set.max_step;
    let total_communities = set.timelines.len();

    if verbose {
        eprintln!(
            "Read {total_communities} dynamic community timelines spanning {max_step} steps from {}",
            args.timeline.display(),
        );
    }

    let supplied = args.steps.len();
    if supplied < max_step as usize {
        bail!("incorrect number of step files specified ({supplied} < {max_step})");
    } else if supplied > max_step as usize {
        warn!("some step files will be ignored ({supplied} > {max_step})");
    }

    // Union of each community's observed step cluster memberships
    let mut unions: Vec<Cluster> = vec![Cluster::new(); total_communities];
    let mut step: u32 = 0;
    for path in args.steps.iter().take(max_step as usize) {
        step += 1;
        let step_clustering = read_clustering(path, args.delimiter)?;
        if verbose {
            eprintln!(
                "Step {step}/{max_step} ({}): {} non-empty step communities",
                path.display(),
                step_clustering.len(),
            );
        }
        for (dyn_index, timeline) in set.timelines.iter().enumerate() {
            let Some(step_cluster_index) = timeline.cluster_at(step) else {
                continue;
            };
            let Some(step_cluster) = step_clustering.get(step_cluster_index) else {
                warn!(
                    "timeline {} references missing cluster {} at step {step}",
                    dyn_index + 1,
                    step_cluster_index + 1
                );
                continue;
            };
            unions[dyn_index].extend(step_cluster.iter().copied());
        }
    }

    let mut all_nodes = Cluster::new();
    for union in &unions {
        all_nodes.extend(union.iter().copied());
    }
    let total_nodes = all_nodes.len();

    // Walk cohorts from the longest consecutive run downwards, accumulating
    // so each row covers communities present in at least that many
    // consecutive steps.
    let mut assigned = Cluster::new();
    let mut communities_per_node: HashMap<Node, usize> = HashMap::new();
    let mut present = 0;
    let mut cohorts = Vec::new();
    for consecutive_steps in (1..=max_step as usize).rev() {
        for (dyn_index, timeline) in set.timelines.iter().enumerate() {
            if timeline.consecutive_length() == consecutive_steps {
                present += 1;
                for &node in &unions[dyn_index] {
                    assigned.insert(node);
                    *communities_per_node.entry(node).or_insert(0) += 1;
                }
            }
        }
        let max_per_node = communities_per_node.values().copied().max().unwrap_or(0);
        let mean_per_node = if communities_per_node.is_empty() {
            0.0
        } else {
            count_to_f64(communities_per_node.values().sum::<usize>())
                / count_to_f64(communities_per_node.len())
        };
        cohorts.push(NodeCohort {
            consecutive_steps,
            communities: present,
            community_percent: percent(present, total_communities),
            nodes: assigned.len(),
            node_percent: percent(assigned.len(), total_nodes),
            mean_communities_per_node: mean_per_node,
            max_communities_per_node: max_per_node,
        });
    }

    match format {
        OutputFormat::Text => {
            println!("Total nodes assigned: {total_nodes}");
            for c in &cohorts {
                println!(
                    "Present in at least {} consecutive step(s): {} communities ({:.1}%), {} nodes ({:.1}%)",
                    c.consecutive_steps, c.communities, c.community_percent, c.nodes, c.node_percent,
                );
                println!(
                    "  Communities per node: mean={:.2} max={}",
                    c.mean_communities_per_node, c.max_communities_per_node,
                );
            }
        }
        OutputFormat::Json => {
            let report = NodeStatsReport {
                total_nodes,
                cohorts,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct StepCoverage {
    step: usize,
    communities: usize,
    assigned: usize,
    percent: f64,
}

#[derive(Serialize)]
struct StepStatsReport {
    total_nodes: usize,
    steps: Vec<StepCoverage>,
}

/// Execute step-stats subcommand
///
/// # Errors
///
/// Returns an error if a step file cannot be read.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run_steps(args: StepStatsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut clusterings = Vec::with_capacity(args.steps.len());
    for path in &args.steps {
        let clustering = read_clustering(path, args.delimiter)?;
        if verbose {
            eprintln!(
                "Step {} ({}): {} non-empty step communities",
                clusterings.len() + 1,
                path.display(),
                clustering.len(),
            );
        }
        clusterings.push(clustering);
    }

    let mut all_nodes = std::collections::BTreeSet::new();
    for clustering in &clusterings {
        all_nodes.append(&mut assigned_nodes(clustering));
    }
    let total_nodes = all_nodes.len();

    let coverage: Vec<StepCoverage> = clusterings
        .iter()
        .enumerate()
        .map(|(i, clustering)| {
            let assigned = assigned_count(clustering);
            StepCoverage {
                step: i + 1,
                communities: clustering.len(),
                assigned,
                percent: percent(assigned, total_nodes),
            }
        })
        .collect();

    match format {
        OutputFormat::Text => {
            println!("Total nodes assigned: {total_nodes}");
            for c in &coverage {
                println!(
                    "Step {}: {}/{} nodes assigned ({:.1}%)",
                    c.step, c.assigned, total_nodes, c.percent,
                );
            }
        }
        OutputFormat::Json => {
            let report = StepStatsReport {
                total_nodes,
                steps: coverage,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
