use std::fmt::Write as _;
use std::path::Path;

use tracing::warn;

use crate::core::cluster::{Cluster, Clustering};
use crate::parsing::ParseError;

/// Default field separator for clustering files.
pub const DEFAULT_SEPARATOR: char = ' ';

/// Read a per-step clustering file, one cluster per line.
///
/// # Errors
///
/// Returns `ParseError::Io` with the offending path if the file cannot be
/// read. Malformed node tokens are not fatal: they are skipped with a
/// warning and the rest of the cluster is kept.
pub fn read_clustering(path: &Path, sep: char) -> Result<Clustering, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|e| ParseError::io(path, e))?;
    Ok(parse_clustering_text(&content, sep))
}

/// Parse clustering text, one cluster per line.
///
/// Empty clusters (blank lines, or lines whose every token was invalid)
/// are dropped entirely.
#[must_use]
pub fn parse_clustering_text(text: &str, sep: char) -> Clustering {
    let mut clustering = Clustering::new();
    for (i, line) in text.lines().enumerate() {
        let mut cluster = Cluster::new();
        for token in line.split(sep) {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            match token.parse() {
                Ok(node) => {
                    cluster.insert(node);
                }
                Err(_) => {
                    warn!("skipping invalid node id '{}' on line {}", token, i + 1);
                }
            }
        }
        if !cluster.is_empty() {
            clustering.push(cluster);
        }
    }
    clustering
}

/// Write a clustering to a file, one cluster per line.
///
/// # Errors
///
/// Returns `ParseError::Io` with the offending path if the file cannot be
/// written.
pub fn write_clustering(path: &Path, sep: char, clustering: &Clustering) -> Result<(), ParseError> {
    std::fs::write(path, format_clustering(clustering, sep)).map_err(|e| ParseError::io(path, e))
}

/// Render a clustering in the line-per-cluster form. Empty clusters are
/// skipped with a warning.
#[must_use]
pub fn format_clustering(clustering: &Clustering, sep: char) -> String {
    let mut out = String::new();
    for (cluster_index, cluster) in clustering.iter().enumerate() {
        if cluster.is_empty() {
            warn!("cluster {} is empty, ignoring", cluster_index + 1);
            continue;
        }
        for (pos, node) in cluster.iter().enumerate() {
            if pos > 0 {
                out.push(sep);
            }
            let _ = write!(out, "{node}");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cluster::Node;

    fn cluster(nodes: &[Node]) -> Cluster {
        nodes.iter().copied().collect()
    }

    #[test]
    fn test_parse_clustering_text() {
        let text = "1 2 3\n4 5\n\n6 7 8 9\n";
        let clustering = parse_clustering_text(text, ' ');
        assert_eq!(clustering.len(), 3);
        assert_eq!(clustering[0], cluster(&[1, 2, 3]));
        assert_eq!(clustering[1], cluster(&[4, 5]));
        assert_eq!(clustering[2], cluster(&[6, 7, 8, 9]));
    }

    #[test]
    fn test_parse_skips_invalid_tokens() {
        // The bad token is dropped, the rest of the cluster survives
        let clustering = parse_clustering_text("1 x 3\n", ' ');
        assert_eq!(clustering.len(), 1);
        assert_eq!(clustering[0], cluster(&[1, 3]));
    }

    #[test]
    fn test_parse_drops_all_invalid_line() {
        let clustering = parse_clustering_text("a b c\n1 2\n", ' ');
        assert_eq!(clustering.len(), 1);
        assert_eq!(clustering[0], cluster(&[1, 2]));
    }

    #[test]
    fn test_parse_other_separator() {
        let clustering = parse_clustering_text("10,20,30\n", ',');
        assert_eq!(clustering, vec![cluster(&[10, 20, 30])]);
    }

    #[test]
    fn test_format_clustering_skips_empty() {
        let clustering = vec![cluster(&[3, 1, 2]), Cluster::new(), cluster(&[5, 4])];
        // Nodes render in sorted order
        assert_eq!(format_clustering(&clustering, ' '), "1 2 3\n4 5\n");
    }

    #[test]
    fn test_text_round_trip() {
        let clustering = vec![cluster(&[1, 2, 3]), cluster(&[7, 8])];
        let text = format_clustering(&clustering, ' ');
        assert_eq!(parse_clustering_text(&text, ' '), clustering);
    }

    #[test]
    fn test_read_missing_file_reports_path() {
        let err = read_clustering(Path::new("/nonexistent/steps.comm"), ' ').unwrap_err();
        assert!(err.to_string().contains("/nonexistent/steps.comm"));
    }
}
