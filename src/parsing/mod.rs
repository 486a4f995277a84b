//! Readers and writers for the two plain-text formats:
//!
//! - **Step clustering files**: one cluster per line, separator-delimited
//!   node ids. Unparsable tokens are recoverable (warn and skip).
//! - **Timeline files**: one tracked community per line,
//!   `E<k>:<step>=<index>,...` with 1-based steps and cluster indices.
//!   Malformed entries abort the read.

pub mod clustering;
pub mod timeline;

use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

impl ParseError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

pub use clustering::{read_clustering, write_clustering};
pub use timeline::{read_timelines, write_timelines, TimelineSet};
