//! Error types for the collection providers.

/// Errors raised while fetching trait counts or rover metadata.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("collection request failed: {0}")]
    Http(String),

    /// The API answered with a non-success status.
    #[error("collection API returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },

    /// No rover exists with this token id.
    #[error("rover #{token} not found")]
    NotFound {
        /// The token id that was requested.
        token: String,
    },

    /// The API kept rate limiting after every retry.
    #[error("rate limited by the collection API after {attempts} attempts")]
    RateLimited {
        /// Number of attempts made.
        attempts: u32,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected collection response: {0}")]
    Parse(String),

    /// Configuration is invalid or missing.
    #[error("collection config error: {0}")]
    Config(String),
}
