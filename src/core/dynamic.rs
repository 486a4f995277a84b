use crate::core::cluster::Cluster;
use crate::core::timeline::Timeline;

/// A community tracked across time: its observation [`Timeline`] plus the
/// node membership it was last observed with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicCluster {
    timeline: Timeline,
    front: Cluster,
}

/// The evolving collection of tracked communities. A community's position
/// is its identity for the duration of one run.
pub type DynamicClustering = Vec<DynamicCluster>;

impl DynamicCluster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fork a new community from a sibling at the current step.
    ///
    /// The new community inherits everything the sibling knew before its
    /// most recent observation, then diverges with the given observation.
    #[must_use]
    pub fn split_from(
        sibling: &DynamicCluster,
        step: u32,
        step_cluster_index: usize,
        membership: Cluster,
    ) -> Self {
        let mut timeline = sibling.timeline.clone();
        timeline.truncate_last();
        let mut cluster = Self {
            timeline,
            front: Cluster::new(),
        };
        cluster.update(step, step_cluster_index, membership);
        cluster
    }

    /// Append an observation and replace the front membership.
    ///
    /// Refuses (returns false, no mutation) if the step does not come
    /// strictly after the last observed step.
    pub fn update(&mut self, step: u32, step_cluster_index: usize, membership: Cluster) -> bool {
        if !self.timeline.record(step, step_cluster_index) {
            return false;
        }
        self.front = membership;
        true
    }

    /// The most recently observed node membership.
    #[must_use]
    pub fn front(&self) -> &Cluster {
        &self.front
    }

    /// The observation history.
    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    #[must_use]
    pub fn is_dead(&self, step: u32, death_age: i32) -> bool {
        self.timeline.is_dead(step, death_age)
    }
}

/// Number of communities dead at the given step for the given death age.
#[must_use]
pub fn count_dead(dynamic: &[DynamicCluster], current_step: u32, death_age: i32) -> usize {
    dynamic
        .iter()
        .filter(|dc| dc.is_dead(current_step, death_age))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cluster::Node;

    fn cluster(nodes: &[Node]) -> Cluster {
        nodes.iter().copied().collect()
    }

    #[test]
    fn test_update_replaces_front() {
        let mut dc = DynamicCluster::new();
        assert!(dc.update(1, 0, cluster(&[1, 2, 3])));
        assert_eq!(dc.front(), &cluster(&[1, 2, 3]));

        assert!(dc.update(2, 1, cluster(&[2, 3, 4])));
        assert_eq!(dc.front(), &cluster(&[2, 3, 4]));
        assert_eq!(dc.timeline().size(), 2);
        assert_eq!(dc.timeline().cluster_at(2), Some(1));
    }

    #[test]
    fn test_update_rejects_out_of_order() {
        let mut dc = DynamicCluster::new();
        dc.update(3, 0, cluster(&[1, 2]));
        assert!(!dc.update(3, 1, cluster(&[9])));
        assert!(!dc.update(2, 1, cluster(&[9])));
        // Front untouched by refused updates
        assert_eq!(dc.front(), &cluster(&[1, 2]));
        assert_eq!(dc.timeline().size(), 1);
    }

    #[test]
    fn test_split_inherits_prior_history() {
        let mut sibling = DynamicCluster::new();
        sibling.update(1, 2, cluster(&[1, 2, 3]));
        sibling.update(2, 0, cluster(&[1, 2, 3, 4]));
        sibling.update(3, 1, cluster(&[1, 2, 3]));

        let split = DynamicCluster::split_from(&sibling, 3, 4, cluster(&[2, 3, 4]));
        // History before the current step is shared
        assert_eq!(split.timeline().cluster_at(1), Some(2));
        assert_eq!(split.timeline().cluster_at(2), Some(0));
        // But the current step diverges
        assert_eq!(split.timeline().cluster_at(3), Some(4));
        assert_eq!(split.front(), &cluster(&[2, 3, 4]));
        assert_eq!(split.timeline().size(), 3);
    }

    #[test]
    fn test_split_from_single_observation() {
        let mut sibling = DynamicCluster::new();
        sibling.update(4, 0, cluster(&[1, 2, 3]));

        let split = DynamicCluster::split_from(&sibling, 4, 1, cluster(&[1, 2]));
        assert_eq!(split.timeline().size(), 1);
        assert_eq!(split.timeline().first_observed(), Some(4));
        assert_eq!(split.timeline().cluster_at(4), Some(1));
    }

    #[test]
    fn test_count_dead() {
        let mut a = DynamicCluster::new();
        a.update(1, 0, cluster(&[1, 2, 3]));
        let mut b = DynamicCluster::new();
        b.update(5, 0, cluster(&[4, 5, 6]));
        let dynamic = vec![a, b];

        assert_eq!(count_dead(&dynamic, 4, 3), 0);
        // a at step 6: 6-1-1=4 >= 3 dead; b: 6-5-1=0 alive
        assert_eq!(count_dead(&dynamic, 6, 3), 1);
        assert_eq!(count_dead(&dynamic, 9, 3), 2);
        // Death disabled
        assert_eq!(count_dead(&dynamic, 9, 0), 0);
    }
}
