// src/error.rs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort a request.
///
/// Data-quality gaps (missing columns, unparsable cells, too few points) are not
/// errors: they surface as zero counts, sentinel titles or the placeholder chart.
#[derive(Error, Debug)]
pub enum Error {
    /// Fetching the source document failed (non-2xx, timeout, DNS).
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The document has no table we know how to read.
    #[error("extraction error: {0}")]
    Extraction(String),

    /// The task text matches no known question set.
    #[error("unsupported task: {0}")]
    UnsupportedTask(String),

    /// The task names a known question set that this service deliberately does not answer.
    #[error("task recognised but not served: {0}")]
    TaskNotServed(String),

    /// Drawing or encoding a chart failed.
    #[error("render error: {0}")]
    Render(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}
