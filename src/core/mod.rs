//! Core data model for dynamic community tracking.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`Node`], [`Cluster`], [`Clustering`]: one time step's snapshot of
//!   communities, supplied pre-computed by an external community finder
//! - [`Timeline`]: the (step, cluster index) observation history of one
//!   tracked community
//! - [`DynamicCluster`]: a timeline plus the community's most recently
//!   observed membership (its "front"), the only state used for matching
//! - [`DynamicClustering`]: the ordered collection of tracked communities
//!
//! Steps are 1-based and strictly increasing within a timeline. Cluster
//! indices are step-local positions, 0-based in memory and shifted to
//! 1-based when persisted or displayed.

pub mod cluster;
pub mod dynamic;
pub mod timeline;

pub use cluster::{Cluster, Clustering, Node};
pub use dynamic::{count_dead, DynamicCluster, DynamicClustering};
pub use timeline::Timeline;
