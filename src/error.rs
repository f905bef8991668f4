use std::path::PathBuf;

use thiserror::Error;

/// Failures that prevent a dataset from being built at all.
///
/// Anything finer grained (a bad cell, a skipped row, an unmatched review)
/// is absorbed by the pipeline and never surfaces here.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} has no `{column}` column", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
}
