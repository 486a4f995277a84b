//! Build persistent node-communities from a finished timeline.
//!
//! Each surviving timeline is collapsed into a single node set drawn from
//! the step clusters it observed: either the plain union of their
//! memberships, or only the nodes present in enough of them (the
//! persistence threshold). Step clusterings are fed one step at a time, in
//! step order, mirroring the tracker.

use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::core::cluster::{count_to_f64, Cluster, Clustering, Node};
use crate::core::timeline::Timeline;

/// Configuration for [`TimelineAggregator`].
#[derive(Debug, Clone)]
pub struct AggregateConfig {
    /// Fraction of the step window a node must appear in to persist.
    /// Zero selects union mode (any appearance counts).
    pub persist_threshold: f64,
    /// Timelines with fewer observations than this are ignored.
    pub min_length: usize,
    /// Upper bound of the step window; later observations are ignored.
    pub max_step: u32,
}

/// Counts of timelines excluded from aggregation, for reporting.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterSummary {
    /// Fewer observations than the minimum persistent length.
    pub too_short: usize,
    /// First observed after the step window closed.
    pub inactive: usize,
}

pub struct TimelineAggregator {
    timelines: Vec<Timeline>,
    config: AggregateConfig,
    ignored: BTreeSet<usize>,
    filter_summary: FilterSummary,
    /// Per-timeline node appearance counts across observed step clusters.
    frequencies: Vec<HashMap<Node, usize>>,
    step: u32,
}

impl TimelineAggregator {
    #[must_use]
    pub fn new(timelines: Vec<Timeline>, config: AggregateConfig) -> Self {
        let mut ignored = BTreeSet::new();
        let mut filter_summary = FilterSummary::default();
        for (dyn_index, timeline) in timelines.iter().enumerate() {
            if timeline.size() < config.min_length {
                ignored.insert(dyn_index);
                filter_summary.too_short += 1;
            } else if timeline.first_observed().is_some_and(|f| f > config.max_step) {
                ignored.insert(dyn_index);
                filter_summary.inactive += 1;
            }
        }
        let frequencies = vec![HashMap::new(); timelines.len()];
        Self {
            timelines,
            config,
            ignored,
            filter_summary,
            frequencies,
            step: 0,
        }
    }

    #[must_use]
    pub fn filter_summary(&self) -> FilterSummary {
        self.filter_summary
    }

    /// Whether the timeline at this index was excluded from aggregation.
    #[must_use]
    pub fn is_ignored(&self, dyn_index: usize) -> bool {
        self.ignored.contains(&dyn_index)
    }

    /// Number of step clusters a node must appear in to persist:
    /// max(1, round(threshold × `max_step`)). Union mode yields 1.
    #[must_use]
    pub fn min_persist_steps(&self) -> usize {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rounded =
            (self.config.persist_threshold * count_to_f64(self.config.max_step as usize)).round()
                as usize;
        rounded.max(1)
    }

    /// Consume the next step's clustering and credit its memberships to
    /// the timelines that observed one of its clusters.
    pub fn add_step_clustering(&mut self, step_clustering: &Clustering) {
        self.step += 1;
        let step = self.step;
        if step > self.config.max_step {
            return;
        }
        for dyn_index in 0..self.timelines.len() {
            if self.ignored.contains(&dyn_index) {
                continue;
            }
            let Some(step_cluster_index) = self.timelines[dyn_index].cluster_at(step) else {
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
            let frequency = &mut self.frequencies[dyn_index];
            for &node in step_cluster {
                *frequency.entry(node).or_insert(0) += 1;
            }
        }
    }

    /// Produce one persistent cluster per timeline, index-aligned with the
    /// input timelines. Ignored timelines yield empty clusters; callers
    /// typically strip small and duplicate clusters afterwards.
    #[must_use]
    pub fn finish(self) -> Clustering {
        let min_steps = self.min_persist_steps();
        self.frequencies
            .into_iter()
            .map(|frequency| {
                frequency
                    .into_iter()
                    .filter(|&(_, count)| count >= min_steps)
                    .map(|(node, _)| node)
                    .collect::<Cluster>()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(nodes: &[Node]) -> Cluster {
        nodes.iter().copied().collect()
    }

    fn steps() -> Vec<Clustering> {
        vec![
            vec![cluster(&[1, 2, 3]), cluster(&[7, 8, 9])],
            vec![cluster(&[1, 2, 4]), cluster(&[7, 8])],
            vec![cluster(&[2, 4, 5])],
        ]
    }

    // Timeline A observes cluster 0 at every step; timeline B observes
    // cluster 1 at steps 1 and 2.
    fn timelines() -> Vec<Timeline> {
        vec![
            Timeline::from_history([(1, 0), (2, 0), (3, 0)]),
            Timeline::from_history([(1, 1), (2, 1)]),
        ]
    }

    fn run(config: AggregateConfig) -> Clustering {
        let mut aggregator = TimelineAggregator::new(timelines(), config);
        for step_clustering in steps() {
            aggregator.add_step_clustering(&step_clustering);
        }
        aggregator.finish()
    }

    #[test]
    fn test_union_mode() {
        let persist = run(AggregateConfig {
            persist_threshold: 0.0,
            min_length: 2,
            max_step: 3,
        });
        assert_eq!(persist.len(), 2);
        assert_eq!(persist[0], cluster(&[1, 2, 3, 4, 5]));
        assert_eq!(persist[1], cluster(&[7, 8, 9]));
    }

    #[test]
    fn test_frequency_mode() {
        // threshold 2/3 over 3 steps -> node must appear in >= 2 clusters
        let persist = run(AggregateConfig {
            persist_threshold: 0.66,
            min_length: 2,
            max_step: 3,
        });
        // For A: 1 appears 2x, 2 appears 3x, 4 appears 2x; 3 and 5 once
        assert_eq!(persist[0], cluster(&[1, 2, 4]));
        // For B: 7 and 8 twice, 9 once
        assert_eq!(persist[1], cluster(&[7, 8]));
    }

    #[test]
    fn test_short_timelines_ignored() {
        let persist = run(AggregateConfig {
            persist_threshold: 0.0,
            min_length: 3,
            max_step: 3,
        });
        // B has only two observations: slot stays empty but index-aligned
        assert_eq!(persist.len(), 2);
        assert!(!persist[0].is_empty());
        assert!(persist[1].is_empty());
    }

    #[test]
    fn test_inactive_timelines_ignored() {
        let timelines = vec![
            Timeline::from_history([(1, 0), (2, 0)]),
            Timeline::from_history([(3, 0), (4, 0)]),
        ];
        let aggregator = TimelineAggregator::new(
            timelines,
            AggregateConfig {
                persist_threshold: 0.0,
                min_length: 2,
                max_step: 2,
            },
        );
        let summary = aggregator.filter_summary();
        assert_eq!(summary.too_short, 0);
        assert_eq!(summary.inactive, 1);
        assert!(!aggregator.is_ignored(0));
        assert!(aggregator.is_ignored(1));
    }

    #[test]
    fn test_min_persist_steps_floor() {
        let aggregator = TimelineAggregator::new(
            Vec::new(),
            AggregateConfig {
                persist_threshold: 0.01,
                min_length: 2,
                max_step: 3,
            },
        );
        // round(0.03) = 0, floored to 1
        assert_eq!(aggregator.min_persist_steps(), 1);
    }
}
