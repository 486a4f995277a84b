use std::collections::HashMap;

use crate::core::cluster::{Cluster, Node};
use crate::core::dynamic::DynamicCluster;
use crate::tracking::similarity::{intersection_size, Similarity};

/// One capability, two implementations: find the live communities whose
/// front matches a step cluster with similarity strictly above the
/// threshold. Returned indices are always in ascending community order,
/// which fixes the continuation-vs-split tie-break downstream.
pub(crate) trait MatchFinder {
    fn find_matches(&mut self, step_cluster: &Cluster) -> Vec<usize>;
}

/// Pairwise matcher: scores the step cluster against every live front.
/// O(communities × step clusters) set intersections per step.
pub(crate) struct NaiveFinder<'a> {
    dynamic: &'a [DynamicCluster],
    step: u32,
    threshold: f64,
    death_age: i32,
    similarity: Similarity,
}

impl<'a> NaiveFinder<'a> {
    pub(crate) fn new(
        dynamic: &'a [DynamicCluster],
        step: u32,
        threshold: f64,
        death_age: i32,
        similarity: Similarity,
    ) -> Self {
        Self {
            dynamic,
            step,
            threshold,
            death_age,
            similarity,
        }
    }
}

impl MatchFinder for NaiveFinder<'_> {
    fn find_matches(&mut self, step_cluster: &Cluster) -> Vec<usize> {
        let mut matches = Vec::new();
        for (dyn_index, dc) in self.dynamic.iter().enumerate() {
            if dc.is_dead(self.step, self.death_age) {
                continue;
            }
            let front = dc.front();
            let inter = intersection_size(step_cluster, front);
            if inter == 0 {
                continue;
            }
            let sim = self.similarity.score(inter, step_cluster.len(), front.len());
            if sim > self.threshold {
                matches.push(dyn_index);
            }
        }
        matches
    }
}

/// Inverted-index matcher: one pass over the step cluster's nodes
/// accumulates per-community intersection tallies, so the per-step cost is
/// proportional to total cluster sizes rather than to the number of
/// community×cluster pairs.
///
/// The index is rebuilt for every step and owned by the call frame; nothing
/// survives into the next step.
pub(crate) struct IndexedFinder {
    node_to_dynamic: HashMap<Node, Vec<usize>>,
    /// Front size per community; 0 marks a community dead for this step.
    front_sizes: Vec<usize>,
    /// Scratch intersection tallies, reused across step clusters.
    tally: Vec<usize>,
    threshold: f64,
    similarity: Similarity,
}

impl IndexedFinder {
    pub(crate) fn build(
        dynamic: &[DynamicCluster],
        step: u32,
        threshold: f64,
        death_age: i32,
        similarity: Similarity,
    ) -> Self {
        let mut node_to_dynamic: HashMap<Node, Vec<usize>> = HashMap::new();
        let mut front_sizes = vec![0; dynamic.len()];
        for (dyn_index, dc) in dynamic.iter().enumerate() {
            if dc.is_dead(step, death_age) {
                continue;
            }
            let front = dc.front();
            front_sizes[dyn_index] = front.len();
            for &node in front {
                node_to_dynamic.entry(node).or_default().push(dyn_index);
            }
        }
        Self {
            node_to_dynamic,
            front_sizes,
            tally: vec![0; dynamic.len()],
            threshold,
            similarity,
        }
    }
}

impl MatchFinder for IndexedFinder {
    fn find_matches(&mut self, step_cluster: &Cluster) -> Vec<usize> {
        for count in &mut self.tally {
            *count = 0;
        }
        for node in step_cluster {
            if let Some(indices) = self.node_to_dynamic.get(node) {
                for &dyn_index in indices {
                    self.tally[dyn_index] += 1;
                }
            }
        }
        let mut matches = Vec::new();
        for (dyn_index, &inter) in self.tally.iter().enumerate() {
            let size_front = self.front_sizes[dyn_index];
            if size_front == 0 || inter == 0 {
                continue;
            }
            let sim = self.similarity.score(inter, step_cluster.len(), size_front);
            if sim > self.threshold {
                matches.push(dyn_index);
            }
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cluster::Node;

    fn cluster(nodes: &[Node]) -> Cluster {
        nodes.iter().copied().collect()
    }

    fn community(step: u32, nodes: &[Node]) -> DynamicCluster {
        let mut dc = DynamicCluster::new();
        dc.update(step, 0, cluster(nodes));
        dc
    }

    #[test]
    fn test_finders_agree() {
        let dynamic = vec![
            community(1, &[1, 2, 3, 4]),
            community(1, &[5, 6, 7]),
            community(1, &[8, 9, 10, 11]),
        ];
        let probes = [
            cluster(&[1, 2, 3]),
            cluster(&[3, 4, 5, 6]),
            cluster(&[20, 21, 22]),
            cluster(&[1, 5, 9]),
        ];
        for similarity in [Similarity::Jaccard, Similarity::Overlap] {
            let mut naive = NaiveFinder::new(&dynamic, 2, 0.2, 3, similarity);
            let mut indexed = IndexedFinder::build(&dynamic, 2, 0.2, 3, similarity);
            for probe in &probes {
                assert_eq!(naive.find_matches(probe), indexed.find_matches(probe));
            }
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        let dynamic = vec![community(1, &[1, 2, 3, 4])];
        let probe = cluster(&[1, 2]);
        // Jaccard = 2/4 = 0.5 exactly
        let mut at = NaiveFinder::new(&dynamic, 2, 0.5, 0, Similarity::Jaccard);
        assert!(at.find_matches(&probe).is_empty());
        let mut below = NaiveFinder::new(&dynamic, 2, 0.4999, 0, Similarity::Jaccard);
        assert_eq!(below.find_matches(&probe), vec![0]);

        let mut indexed_at = IndexedFinder::build(&dynamic, 2, 0.5, 0, Similarity::Jaccard);
        assert!(indexed_at.find_matches(&probe).is_empty());
    }

    #[test]
    fn test_dead_communities_excluded() {
        let dynamic = vec![community(1, &[1, 2, 3]), community(5, &[1, 2, 3])];
        // At step 6 with age 3, the first community is dead (6-1-1=4 >= 3)
        let probe = cluster(&[1, 2, 3]);
        let mut naive = NaiveFinder::new(&dynamic, 6, 0.1, 3, Similarity::Jaccard);
        assert_eq!(naive.find_matches(&probe), vec![1]);
        let mut indexed = IndexedFinder::build(&dynamic, 6, 0.1, 3, Similarity::Jaccard);
        assert_eq!(indexed.find_matches(&probe), vec![1]);
    }
}
