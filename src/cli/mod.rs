//! Command-line interface for commtrack.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **track**: Link per-step community files into dynamic communities
//! - **aggregate**: Collapse a timeline into persistent communities
//! - **timeline-stats**: Report lifespan statistics for a timeline file
//! - **node-stats**: Report node coverage per consecutive-observation cohort
//! - **step-stats**: Report per-step node coverage for step files
//!
//! ## Usage
//!
//! ```text
//! # Track communities across four time steps
//! commtrack track step1.comm step2.comm step3.comm step4.comm
//!
//! # Overlap similarity with a stricter threshold
//! commtrack track --similarity overlap --threshold 0.3 step*.comm
//!
//! # Aggregate the resulting timeline into persistent communities
//! commtrack aggregate --timeline dynamic.timeline step*.comm
//!
//! # JSON output for scripting
//! commtrack timeline-stats dynamic.timeline --format json
//! ```

use clap::{Parser, Subcommand};

pub mod aggregate;
pub mod stats;
pub mod track;

#[derive(Parser)]
#[command(name = "commtrack")]
#[command(version)]
#[command(about = "Track communities in a dynamic network across time steps")]
#[command(
    long_about = "commtrack links communities detected at successive time steps into persistent dynamic communities.\n\nEach step's communities are matched against the tracked set by front similarity, resolving births, continuations, and splits. The resulting timelines can be aggregated into persistent node communities and summarized with the reporting commands."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Track dynamic communities across a sequence of step files
    Track(track::TrackArgs),

    /// Build persistent communities from a timeline and its step files
    Aggregate(aggregate::AggregateArgs),

    /// Summarize community lifespans from a timeline file
    TimelineStats(stats::TimelineStatsArgs),

    /// Summarize node coverage per consecutive-observation cohort
    NodeStats(stats::NodeStatsArgs),

    /// Summarize node coverage across step files
    StepStats(stats::StepStatsArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
