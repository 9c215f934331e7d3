//! Station catalog error types.

/// Errors that can occur when talking to the station catalog service.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status.
    #[error("catalog returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// Response body was not a valid station envelope.
    #[error("JSON parse error: {message}")]
    Json {
        /// Parser error description.
        message: String,
    },
}
