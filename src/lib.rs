//! # commtrack
//!
//! A library for tracking communities in a dynamic network across time.
//!
//! A community-finding algorithm run on successive snapshots of a network
//! produces an independent set of communities per time step, with no link
//! between a community at step 3 and "the same" community at step 4.
//! `commtrack` provides that link: it matches each step's communities
//! against the communities tracked so far and maintains a persistent
//! identity for each, recording births, continuations, splits, and deaths.
//!
//! ## Features
//!
//! - **Front matching**: Each tracked community is represented by its most
//!   recent membership, compared by Jaccard or overlap similarity
//! - **Two matchers**: A naive pairwise scan and an inverted-index variant
//!   with identical results
//! - **Timelines**: Each community carries its full observation history,
//!   persisted in a plain-text format
//! - **Aggregation**: Timelines collapse into persistent node communities
//!   by union or appearance frequency
//!
//! ## Example
//!
//! ```rust
//! use commtrack::{Cluster, DynamicTracker, TrackerConfig};
//!
//! let mut tracker = DynamicTracker::new(TrackerConfig::default()).unwrap();
//!
//! let step1: Vec<Cluster> = vec![[1, 2, 3].into_iter().collect()];
//! let step2: Vec<Cluster> = vec![[1, 2, 3, 4].into_iter().collect()];
//! tracker.add_clustering(&step1);
//! tracker.add_clustering(&step2);
//!
//! for community in tracker.clusters() {
//!     println!("{}", community.timeline());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Clusters, timelines, and dynamic communities
//! - [`tracking`]: The tracker and its match-finding strategies
//! - [`aggregate`]: Persistent community construction from timelines
//! - [`parsing`]: Readers and writers for step and timeline files
//! - [`cli`]: Command-line interface implementation

pub mod aggregate;
pub mod cli;
pub mod core;
pub mod parsing;
pub mod tracking;

// Re-export commonly used types for convenience
pub use crate::core::cluster::{Cluster, Clustering, Node};
pub use crate::core::dynamic::{count_dead, DynamicCluster, DynamicClustering};
pub use crate::core::timeline::Timeline;
pub use crate::tracking::{DynamicTracker, MatcherKind, Similarity, TrackerConfig, TrackerError};
