//! The matching/tracking engine.
//!
//! [`DynamicTracker`] consumes one [`crate::core::Clustering`] per step and
//! incrementally maintains the set of dynamic communities, resolving
//! births, continuations, and splits. Two interchangeable match-finding
//! strategies sit behind it, selected by [`MatcherKind`]: a naive pairwise
//! scan and an inverted-index variant with identical output.

pub mod engine;
mod matchers;
pub mod similarity;

pub use engine::{
    DynamicTracker, MatcherKind, TrackerConfig, TrackerError, DEFAULT_DEATH_AGE,
    DEFAULT_MIN_CLUSTER_SIZE, DEFAULT_THRESHOLD,
};
pub use similarity::Similarity;
