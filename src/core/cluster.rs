use std::collections::BTreeSet;

/// Identifier for a single node in the network.
///
/// Nodes are opaque: the tracker only relies on equality, never on the
/// numeric value itself.
pub type Node = i64;

/// A single community: the set of nodes assigned to it.
pub type Cluster = BTreeSet<Node>;

/// One time step's snapshot: an ordered sequence of communities.
///
/// The position of a cluster in the sequence is its step-local cluster
/// index (0-based in memory, 1-based on disk and in reports).
pub type Clustering = Vec<Cluster>;

/// Helper to convert usize counts to f64 for percentage calculations
#[inline]
pub(crate) fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Set of nodes assigned to at least one cluster.
#[must_use]
pub fn assigned_nodes(clustering: &Clustering) -> BTreeSet<Node> {
    let mut nodes = BTreeSet::new();
    for cluster in clustering {
        nodes.extend(cluster.iter().copied());
    }
    nodes
}

/// Number of nodes assigned to at least one cluster.
#[must_use]
pub fn assigned_count(clustering: &Clustering) -> usize {
    assigned_nodes(clustering).len()
}

/// Number of nodes assigned to more than one cluster.
#[must_use]
pub fn overlapping_count(clustering: &Clustering) -> usize {
    let mut seen = BTreeSet::new();
    let mut count = 0;
    for cluster in clustering {
        for &node in cluster {
            if !seen.insert(node) {
                count += 1;
            }
        }
    }
    count
}

/// Size of the largest cluster in the clustering.
#[must_use]
pub fn max_cluster_size(clustering: &Clustering) -> usize {
    clustering.iter().map(BTreeSet::len).max().unwrap_or(0)
}

/// Number of empty clusters in the clustering.
#[must_use]
pub fn count_empty_clusters(clustering: &Clustering) -> usize {
    clustering.iter().filter(|c| c.is_empty()).count()
}

/// Remove all clusters below the given size. Returns the number removed.
pub fn remove_small_clusters(clustering: &mut Clustering, min_size: usize) -> usize {
    let previous = clustering.len();
    clustering.retain(|c| c.len() >= min_size);
    previous - clustering.len()
}

/// Remove duplicate clusters, keeping one copy of each distinct node set.
/// Sorts the clustering as a side effect. Returns the number removed.
pub fn remove_duplicate_clusters(clustering: &mut Clustering) -> usize {
    let previous = clustering.len();
    clustering.sort();
    clustering.dedup();
    previous - clustering.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(nodes: &[Node]) -> Cluster {
        nodes.iter().copied().collect()
    }

    #[test]
    fn test_assigned_and_overlapping() {
        let clustering = vec![cluster(&[1, 2, 3]), cluster(&[3, 4]), cluster(&[4, 5])];
        assert_eq!(assigned_count(&clustering), 5);
        // 3 and 4 each appear twice
        assert_eq!(overlapping_count(&clustering), 2);
    }

    #[test]
    fn test_max_cluster_size() {
        let clustering = vec![cluster(&[1]), cluster(&[1, 2, 3]), cluster(&[4, 5])];
        assert_eq!(max_cluster_size(&clustering), 3);
        assert_eq!(max_cluster_size(&Vec::new()), 0);
    }

    #[test]
    fn test_remove_small_clusters() {
        let mut clustering = vec![cluster(&[1, 2, 3]), cluster(&[4]), cluster(&[5, 6])];
        let removed = remove_small_clusters(&mut clustering, 2);
        assert_eq!(removed, 1);
        assert_eq!(clustering.len(), 2);
    }

    #[test]
    fn test_remove_duplicate_clusters() {
        let mut clustering = vec![
            cluster(&[1, 2, 3]),
            cluster(&[4, 5]),
            cluster(&[3, 2, 1]),
            cluster(&[4, 5]),
        ];
        let removed = remove_duplicate_clusters(&mut clustering);
        assert_eq!(removed, 2);
        assert_eq!(clustering.len(), 2);
    }

    #[test]
    fn test_count_empty_clusters() {
        let clustering = vec![cluster(&[1, 2]), Cluster::new(), Cluster::new()];
        assert_eq!(count_empty_clusters(&clustering), 2);
    }
}
