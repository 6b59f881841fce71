use thiserror::Error;

/// Errors that can occur while composing or sending a stat line.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// A metric value or argument that cannot be expressed on the wire.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The transport failed to send a datagram.
    ///
    /// This variant never reaches callers of the metric methods: it is
    /// logged and dropped inside the client.
    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),
}

impl MetricsError {
    pub(crate) fn invalid_value(type_name: &str) -> Self {
        Self::InvalidArgument(format!("value must be an integer or absent, got {type_name}"))
    }
}
