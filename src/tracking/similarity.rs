use serde::{Deserialize, Serialize};

use crate::core::cluster::{count_to_f64, Cluster};

/// Normalization applied to the intersection size when scoring a step
/// cluster against a community's front.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Similarity {
    /// |A ∩ B| / |A ∪ B|
    #[default]
    Jaccard,
    /// |A ∩ B| / min(|A|, |B|)
    Overlap,
}

impl Similarity {
    /// Score from a precomputed intersection size and the two set sizes.
    ///
    /// Returns 0.0 when either set is empty.
    #[must_use]
    pub fn score(self, intersection: usize, size_a: usize, size_b: usize) -> f64 {
        if size_a == 0 || size_b == 0 {
            return 0.0;
        }
        match self {
            Self::Jaccard => {
                count_to_f64(intersection) / count_to_f64(size_a + size_b - intersection)
            }
            Self::Overlap => count_to_f64(intersection) / count_to_f64(size_a.min(size_b)),
        }
    }

    /// Score two clusters directly.
    #[must_use]
    pub fn between(self, a: &Cluster, b: &Cluster) -> f64 {
        self.score(intersection_size(a, b), a.len(), b.len())
    }
}

/// |A ∩ B| without materializing the intersection.
#[must_use]
pub fn intersection_size(a: &Cluster, b: &Cluster) -> usize {
    // Probe the smaller set against the larger one
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().filter(|node| large.contains(node)).count()
}
