use std::fmt::Write as _;
use std::path::Path;

use crate::core::timeline::Timeline;
use crate::parsing::ParseError;

/// Timelines recovered from a persisted timeline file, plus the largest
/// step number seen anywhere in the file.
#[derive(Debug, Clone)]
pub struct TimelineSet {
    pub timelines: Vec<Timeline>,
    pub max_step: u32,
}

/// Read a timeline file.
///
/// # Errors
///
/// Returns `ParseError::Io` with the offending path if the file cannot be
/// read, or `ParseError::InvalidFormat` if an entry is malformed or the
/// file yields no timelines.
pub fn read_timelines(path: &Path) -> Result<TimelineSet, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|e| ParseError::io(path, e))?;
    parse_timelines_text(&content)
}

/// Parse timeline text, one community per line: `E<k>:<step>=<index>,...`
///
/// The prefix before `:` is discarded; lines without a `:` are skipped.
/// Steps and cluster indices are 1-based on disk; indices are shifted to
/// 0-based in memory.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` on an entry that does not parse as
/// two integers >= 1, or if no timelines are found.
pub fn parse_timelines_text(text: &str) -> Result<TimelineSet, ParseError> {
    let mut timelines = Vec::new();
    let mut max_step: u32 = 0;
    for (i, line) in text.lines().enumerate() {
        let line_num = i + 1;
        let Some((_, entries)) = line.split_once(':') else {
            continue;
        };
        let mut history: Vec<(u32, usize)> = Vec::new();
        for token in entries.split(',') {
            let token = token.trim();
            let Some((step_str, index_str)) = token.split_once('=') else {
                return Err(ParseError::InvalidFormat(format!(
                    "unexpected timeline entry '{token}' on line {line_num}"
                )));
            };
            let step: u32 = step_str.trim().parse().ok().filter(|&s| s >= 1).ok_or_else(|| {
                ParseError::InvalidFormat(format!(
                    "invalid step '{step_str}' on line {line_num}"
                ))
            })?;
            let cluster_index: usize =
                index_str.trim().parse().ok().filter(|&c| c >= 1).ok_or_else(|| {
                    ParseError::InvalidFormat(format!(
                        "invalid cluster index '{index_str}' on line {line_num}"
                    ))
                })?;
            history.push((step, cluster_index - 1));
            max_step = max_step.max(step);
        }
        if !history.is_empty() {
            timelines.push(Timeline::from_history(history));
        }
    }
    if timelines.is_empty() {
        return Err(ParseError::InvalidFormat(
            "file contained no valid timelines".to_string(),
        ));
    }
    Ok(TimelineSet {
        timelines,
        max_step,
    })
}

/// Write timelines to a file, one community per line.
///
/// # Errors
///
/// Returns `ParseError::Io` with the offending path if the file cannot be
/// written.
pub fn write_timelines<'a>(
    path: &Path,
    timelines: impl IntoIterator<Item = &'a Timeline>,
) -> Result<(), ParseError> {
    std::fs::write(path, format_timelines(timelines)).map_err(|e| ParseError::io(path, e))
}

/// Render timelines in the persisted form. The `E<k>` prefix is the
/// community's 1-based position at write time.
#[must_use]
pub fn format_timelines<'a>(timelines: impl IntoIterator<Item = &'a Timeline>) -> String {
    let mut out = String::new();
    for (i, timeline) in timelines.into_iter().enumerate() {
        let _ = writeln!(out, "E{}:{timeline}", i + 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timelines_text() {
        let set = parse_timelines_text("E1:1=1,2=3\nE2:2=2\n").unwrap();
        assert_eq!(set.timelines.len(), 2);
        assert_eq!(set.max_step, 2);
        // Cluster indices shift to 0-based
        assert_eq!(set.timelines[0].cluster_at(1), Some(0));
        assert_eq!(set.timelines[0].cluster_at(2), Some(2));
        assert_eq!(set.timelines[1].cluster_at(2), Some(1));
    }

    #[test]
    fn test_prefix_is_discarded_not_validated() {
        let set = parse_timelines_text("whatever:3=1\n").unwrap();
        assert_eq!(set.timelines.len(), 1);
        assert_eq!(set.max_step, 3);
    }

    #[test]
    fn test_lines_without_separator_skipped() {
        let set = parse_timelines_text("# comment\nE1:1=1\n").unwrap();
        assert_eq!(set.timelines.len(), 1);
    }

    #[test]
    fn test_malformed_entries_fail() {
        assert!(parse_timelines_text("E1:1-1\n").is_err());
        assert!(parse_timelines_text("E1:x=1\n").is_err());
        assert!(parse_timelines_text("E1:1=y\n").is_err());
        // Zero is out of range: both halves must be >= 1
        assert!(parse_timelines_text("E1:0=1\n").is_err());
        assert!(parse_timelines_text("E1:1=0\n").is_err());
    }

    #[test]
    fn test_empty_entries_fail() {
        // Every comma-separated token must parse, including empty ones
        assert!(parse_timelines_text("E1:1=1,,2=2\n").is_err());
        assert!(parse_timelines_text("E1:1=1,\n").is_err());
    }

    #[test]
    fn test_empty_file_fails() {
        assert!(parse_timelines_text("").is_err());
        assert!(parse_timelines_text("no separator here\n").is_err());
    }

    #[test]
    fn test_format_timelines() {
        let timelines = vec![
            Timeline::from_history([(1, 0), (2, 1)]),
            Timeline::from_history([(3, 4)]),
        ];
        assert_eq!(format_timelines(&timelines), "E1:1=1,2=2\nE2:3=5\n");
    }

    #[test]
    fn test_round_trip() {
        let original = vec![
            Timeline::from_history([(1, 2), (2, 0), (4, 1)]),
            Timeline::from_history([(2, 3)]),
            Timeline::from_history([(1, 0), (3, 0), (5, 6)]),
        ];
        let text = format_timelines(&original);
        let set = parse_timelines_text(&text).unwrap();
        assert_eq!(set.timelines, original);
        assert_eq!(set.max_step, 5);
    }
}
