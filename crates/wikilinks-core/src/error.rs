use std::path::PathBuf;

/// Failures of operations that write notes.
#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    /// Missing-note creation was asked for under the relative-path convention
    #[error("creating missing notes on go-to-definition only works with namingConvention = \"uniqueFilenames\"")]
    RequiresUniqueBasename,

    #[error("cannot derive a file name from {0:?}")]
    EmptyTitle(String),

    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request cancelled")]
    Cancelled,
}
