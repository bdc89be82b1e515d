use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::io::sheets::Sheet;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// There were no rows to export.
    #[snafu(display("No data to export"))]
    Empty { backtrace: Backtrace },

    /// An error occurred while trying to write a sheet to its destination.
    #[snafu(display("Failed to write sheet {sheet}: {message}"))]
    Write {
        sheet: String,
        message: String,
        backtrace: Backtrace,
    },

    /// A sheet could not be encoded into the destination format.
    #[snafu(display("Failed to encode sheet {sheet}: {source}"))]
    Encode {
        sheet: String,
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// A generic I/O error.
    #[snafu(display("I/O error: {source}"))]
    Io {
        source: std::io::Error,
        backtrace: Backtrace,
    },
}

#[async_trait]
pub trait TabularSink {
    /// The type of output returned after a successful write operation.
    ///
    /// A file sink returns the paths it created; an in-memory sink might
    /// return the number of rows it kept.
    type Output;

    /// Writes every sheet to the destination.
    async fn write(&self, sheets: &[Sheet]) -> Result<Self::Output, SinkError>;
}
