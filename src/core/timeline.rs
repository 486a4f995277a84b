use tracing::warn;

/// Observation history of one tracked community.
///
/// Two parallel sequences record, in insertion order, the step at which the
/// community was observed and the step-local index of the cluster it was
/// observed as. Steps are 1-based and strictly increasing; cluster indices
/// are 0-based in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    steps: Vec<u32>,
    cluster_indices: Vec<usize>,
}

impl Timeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a timeline from parallel (step, cluster index) pairs.
    ///
    /// Entries are applied through [`Timeline::record`], so out-of-order
    /// steps are refused with a warning rather than stored.
    #[must_use]
    pub fn from_history(entries: impl IntoIterator<Item = (u32, usize)>) -> Self {
        let mut timeline = Self::new();
        for (step, cluster_index) in entries {
            timeline.record(step, cluster_index);
        }
        timeline
    }

    /// Append an observation. Refuses (returns false, no mutation) if the
    /// step does not come strictly after the last recorded step.
    pub fn record(&mut self, step: u32, cluster_index: usize) -> bool {
        if let Some(&last) = self.steps.last() {
            if step <= last {
                warn!("history out of sync: new step {step} <= last step {last}");
                return false;
            }
        }
        self.steps.push(step);
        self.cluster_indices.push(cluster_index);
        true
    }

    /// Drop the most recent observation, if any. Used when forking a
    /// timeline at the current step.
    pub(crate) fn truncate_last(&mut self) {
        self.steps.pop();
        self.cluster_indices.pop();
    }

    /// First step at which this community was observed.
    #[must_use]
    pub fn first_observed(&self) -> Option<u32> {
        self.steps.first().copied()
    }

    /// Last step at which this community was observed.
    ///
    /// # Panics
    ///
    /// Panics if the timeline is empty; callers must only ask this of a
    /// community with at least one observation.
    #[must_use]
    pub fn last_observed(&self) -> u32 {
        self.steps
            .last()
            .copied()
            .expect("last_observed on empty timeline")
    }

    /// Number of observations.
    #[must_use]
    pub fn size(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Length of the longest run of observations at consecutive steps.
    ///
    /// A gap of more than one step ends the current run; every observation
    /// starts a run of at least length 1.
    #[must_use]
    pub fn consecutive_length(&self) -> usize {
        let mut max_consec = 0;
        let mut cur_consec = 0;
        let mut last_step = 0;
        for (i, &step) in self.steps.iter().enumerate() {
            if i == 0 || step == last_step + 1 {
                cur_consec += 1;
            } else {
                max_consec = max_consec.max(cur_consec);
                cur_consec = 1;
            }
            last_step = step;
        }
        max_consec.max(cur_consec)
    }

    /// Was the community observed at exactly this step?
    #[must_use]
    pub fn is_observed(&self, step: u32) -> bool {
        self.steps.contains(&step)
    }

    /// A community is dead at `step` once it has gone unobserved for at
    /// least `death_age` whole steps. A non-positive `death_age` disables
    /// death entirely.
    #[must_use]
    pub fn is_dead(&self, step: u32, death_age: i32) -> bool {
        if death_age <= 0 {
            return false;
        }
        i64::from(step) - i64::from(self.last_observed()) - 1 >= i64::from(death_age)
    }

    /// Step-local cluster index observed at the given step, if any.
    ///
    /// Linear scan: histories are short relative to the number of steps.
    #[must_use]
    pub fn cluster_at(&self, step: u32) -> Option<usize> {
        self.steps
            .iter()
            .position(|&s| s == step)
            .map(|i| self.cluster_indices[i])
    }

    /// Iterate over (step, cluster index) observations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, usize)> + '_ {
        self.steps
            .iter()
            .copied()
            .zip(self.cluster_indices.iter().copied())
    }
}

/// Renders the persisted form: `step=index,...` with 1-based cluster
/// indices.
impl std::fmt::Display for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (step, cluster_index)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{step}={}", cluster_index + 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_monotonic() {
        let mut timeline = Timeline::new();
        assert!(timeline.record(1, 0));
        assert!(timeline.record(3, 2));
        // Equal and earlier steps are refused without mutation
        assert!(!timeline.record(3, 5));
        assert!(!timeline.record(2, 5));
        assert_eq!(timeline.size(), 2);
        assert_eq!(timeline.last_observed(), 3);
    }

    #[test]
    fn test_size_counts_accepted_records() {
        let mut timeline = Timeline::new();
        timeline.record(1, 0);
        timeline.record(2, 1);
        timeline.record(2, 2); // refused
        timeline.record(4, 3);
        assert_eq!(timeline.size(), 3);
        let steps: Vec<u32> = timeline.iter().map(|(s, _)| s).collect();
        assert!(steps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_first_and_last_observed() {
        let timeline = Timeline::from_history([(2, 0), (5, 1)]);
        assert_eq!(timeline.first_observed(), Some(2));
        assert_eq!(timeline.last_observed(), 5);
        assert_eq!(Timeline::new().first_observed(), None);
    }

    #[test]
    fn test_consecutive_length() {
        let timeline = Timeline::from_history([(1, 0), (2, 0), (3, 0), (5, 0), (6, 0)]);
        assert_eq!(timeline.consecutive_length(), 3);

        // The run after a gap starts at length 1, not 0
        let timeline = Timeline::from_history([(1, 0), (3, 0), (4, 0), (5, 0)]);
        assert_eq!(timeline.consecutive_length(), 3);

        assert_eq!(Timeline::new().consecutive_length(), 0);
        assert_eq!(Timeline::from_history([(7, 0)]).consecutive_length(), 1);
    }

    #[test]
    fn test_is_observed() {
        let timeline = Timeline::from_history([(1, 0), (4, 2)]);
        assert!(timeline.is_observed(1));
        assert!(timeline.is_observed(4));
        assert!(!timeline.is_observed(2));
    }

    #[test]
    fn test_is_dead() {
        let timeline = Timeline::from_history([(5, 0)]);
        // 7 - 5 - 1 = 1 < 3
        assert!(!timeline.is_dead(7, 3));
        // 9 - 5 - 1 = 3 >= 3
        assert!(timeline.is_dead(9, 3));
        // Death disabled
        assert!(!timeline.is_dead(100, 0));
        assert!(!timeline.is_dead(100, -1));
    }

    #[test]
    fn test_cluster_at() {
        let timeline = Timeline::from_history([(1, 4), (3, 0)]);
        assert_eq!(timeline.cluster_at(1), Some(4));
        assert_eq!(timeline.cluster_at(3), Some(0));
        assert_eq!(timeline.cluster_at(2), None);
    }

    #[test]
    #[should_panic(expected = "last_observed on empty timeline")]
    fn test_last_observed_empty_panics() {
        let _ = Timeline::new().last_observed();
    }

    #[test]
    fn test_display_shifts_cluster_indices() {
        let timeline = Timeline::from_history([(1, 0), (2, 2), (4, 1)]);
        assert_eq!(timeline.to_string(), "1=1,2=3,4=2");
        assert_eq!(Timeline::new().to_string(), "");
    }
}
