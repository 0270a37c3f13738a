//! Error types shared by the poller, the inventory fetcher and the HTTP server.

use crate::ip::AnalyzerError;

/// Boxed source error from the cloud SDK
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that abort a poll cycle or stop the exporter
#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    #[error("AWS {operation} call failed: {message}")]
    Transport {
        operation: &'static str,
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("Subnet {subnet_id} has malformed data")]
    InvalidSubnet {
        subnet_id: String,
        #[source]
        source: AnalyzerError,
    },

    #[error("{resource} is missing field {field}")]
    MissingField {
        resource: &'static str,
        field: &'static str,
    },

    #[error("Failed to encode metrics")]
    Encode(#[from] prometheus::Error),

    #[error("Failed to register metric")]
    Register(#[source] prometheus::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExporterError {
    /// Wrap an SDK failure, keeping the full context chain in the message.
    pub fn transport<E>(operation: &'static str, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let message = aws_sdk_ec2::error::DisplayErrorContext(&err).to_string();
        Self::Transport {
            operation,
            message,
            source: Box::new(err),
        }
    }
}
