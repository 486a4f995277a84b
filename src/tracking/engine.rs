use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::cluster::Clustering;
use crate::core::dynamic::{DynamicCluster, DynamicClustering};
use crate::tracking::matchers::{IndexedFinder, MatchFinder, NaiveFinder};
use crate::tracking::similarity::Similarity;

/// Step clusters below this size are never tracked, unless overridden.
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 3;

/// Default number of unobserved steps after which a community dies.
pub const DEFAULT_DEATH_AGE: i32 = 3;

/// Default matching threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("invalid matching threshold {0}: value should be between 0 and 1")]
    InvalidThreshold(f64),

    #[error("invalid minimum cluster size {0}: value should be at least 1")]
    InvalidMinClusterSize(usize),
}

/// Which match-finding algorithm the tracker runs. Both produce identical
/// results; they differ only in cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MatcherKind {
    /// Pairwise comparison of every step cluster against every live front.
    Naive,
    /// Node-to-community inverted index, rebuilt per step.
    #[default]
    Indexed,
}

/// Configuration for the tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Similarity must be strictly greater than this for a match.
    pub threshold: f64,
    /// Steps a community may go unobserved before it is considered dead;
    /// non-positive disables death.
    pub death_age: i32,
    /// Step clusters smaller than this are discarded, never tracked.
    pub min_cluster_size: usize,
    pub similarity: Similarity,
    pub matcher: MatcherKind,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            death_age: DEFAULT_DEATH_AGE,
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            similarity: Similarity::default(),
            matcher: MatcherKind::default(),
        }
    }
}

impl TrackerConfig {
    /// # Errors
    ///
    /// Returns a [`TrackerError`] if the threshold is outside [0, 1] or the
    /// minimum cluster size is zero.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(TrackerError::InvalidThreshold(self.threshold));
        }
        if self.min_cluster_size < 1 {
            return Err(TrackerError::InvalidMinClusterSize(self.min_cluster_size));
        }
        Ok(())
    }
}

/// Incrementally links per-step communities into persistent dynamic
/// communities.
///
/// Feed one [`Clustering`] per step, in step order. The first step
/// bootstraps the community set; each later step matches its clusters
/// against the live fronts and resolves births, continuations, and splits.
pub struct DynamicTracker {
    config: TrackerConfig,
    step: u32,
    dynamic: DynamicClustering,
}

impl DynamicTracker {
    /// # Errors
    ///
    /// Returns a [`TrackerError`] if the configuration is invalid.
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        config.validate()?;
        Ok(Self {
            config,
            step: 0,
            dynamic: Vec::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// The last step processed (0 before any call).
    #[must_use]
    pub fn step(&self) -> u32 {
        self.step
    }

    /// The current set of dynamic communities; valid mid-run or final.
    #[must_use]
    pub fn clusters(&self) -> &DynamicClustering {
        &self.dynamic
    }

    #[must_use]
    pub fn into_clusters(self) -> DynamicClustering {
        self.dynamic
    }

    /// Consume the next step's snapshot and update the community set.
    pub fn add_clustering(&mut self, step_clustering: &Clustering) {
        self.step += 1;
        if self.step == 1 {
            self.bootstrap(step_clustering);
            return;
        }

        let min_size = self.config.min_cluster_size;
        let mut births: Vec<usize> = Vec::new();
        let mut matched_pairs: Vec<(usize, usize)> = Vec::new();
        {
            // The finder (and the indexed variant's inverted index) lives
            // only for this step.
            let mut finder: Box<dyn MatchFinder + '_> = match self.config.matcher {
                MatcherKind::Naive => Box::new(NaiveFinder::new(
                    &self.dynamic,
                    self.step,
                    self.config.threshold,
                    self.config.death_age,
                    self.config.similarity,
                )),
                MatcherKind::Indexed => Box::new(IndexedFinder::build(
                    &self.dynamic,
                    self.step,
                    self.config.threshold,
                    self.config.death_age,
                    self.config.similarity,
                )),
            };

            for (step_cluster_index, step_cluster) in step_clustering.iter().enumerate() {
                if step_cluster.len() < min_size {
                    continue;
                }
                let matches = finder.find_matches(step_cluster);
                if matches.is_empty() {
                    debug!(
                        "T{}: birth from C{}",
                        self.step,
                        step_cluster_index + 1
                    );
                    births.push(step_cluster_index);
                } else {
                    matched_pairs.extend(matches.into_iter().map(|d| (step_cluster_index, d)));
                }
            }
        }

        // Stage births first, in step-cluster input order.
        let mut fresh: DynamicClustering = Vec::new();
        for &step_cluster_index in &births {
            let mut dc = DynamicCluster::new();
            dc.update(
                self.step,
                step_cluster_index,
                step_clustering[step_cluster_index].clone(),
            );
            fresh.push(dc);
        }

        // Resolve matched pairs in discovery order: the first pair touching
        // a community continues it in place, every later pair splits off a
        // new community from its already-updated state.
        let mut matched_dynamic: HashSet<usize> = HashSet::new();
        for &(step_cluster_index, dyn_index) in &matched_pairs {
            if matched_dynamic.contains(&dyn_index) {
                debug!(
                    "T{}: split: matched C{} to M{}, forking M{}",
                    self.step,
                    step_cluster_index + 1,
                    dyn_index + 1,
                    self.dynamic.len() + fresh.len() + 1
                );
                let dc = DynamicCluster::split_from(
                    &self.dynamic[dyn_index],
                    self.step,
                    step_cluster_index,
                    step_clustering[step_cluster_index].clone(),
                );
                fresh.push(dc);
            } else {
                debug!(
                    "T{}: continuation: matched C{} to M{}",
                    self.step,
                    step_cluster_index + 1,
                    dyn_index + 1
                );
                self.dynamic[dyn_index].update(
                    self.step,
                    step_cluster_index,
                    step_clustering[step_cluster_index].clone(),
                );
                matched_dynamic.insert(dyn_index);
            }
        }

        self.dynamic.append(&mut fresh);
    }

    fn bootstrap(&mut self, step_clustering: &Clustering) {
        self.dynamic.clear();
        for (step_cluster_index, step_cluster) in step_clustering.iter().enumerate() {
            if step_cluster.len() < self.config.min_cluster_size {
                continue;
            }
            let mut dc = DynamicCluster::new();
            dc.update(self.step, step_cluster_index, step_cluster.clone());
            self.dynamic.push(dc);
            debug!("T{}: birth: community M{}", self.step, self.dynamic.len());
        }
    }
}
