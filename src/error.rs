use std::io;

use thiserror::Error;

/// Errors surfaced by logger construction and flush.
///
/// Log calls themselves never fail; per-record write errors are swallowed by the
/// drain (fire-and-forget).
#[derive(Debug, Error)]
pub enum LogError {
    /// Invalid configuration: empty service name, empty sink list, unknown level
    /// name, unknown sink scheme, or a duplicate scheme registration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A sink could not be opened during construction.
    #[error("cannot open sink {uri}: {source}")]
    SinkOpen {
        uri: String,
        #[source]
        source: io::Error,
    },

    /// A sink failed while flushing buffered records.
    #[error("flush failed: {0}")]
    Flush(#[source] io::Error),
}
