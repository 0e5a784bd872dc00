use thiserror::Error;

/// Errors that can occur when talking to the Chapa gateway.
#[derive(Debug, Error)]
pub enum ChapaError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway answered but refused the operation
    #[error("Chapa gateway error: {0}")]
    Gateway(String),

    /// Gateway answered with a body we could not interpret
    #[error("Malformed gateway response: {0}")]
    MalformedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing required environment variable
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}
