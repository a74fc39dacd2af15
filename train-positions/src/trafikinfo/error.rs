//! Trafikinfo client error types.

/// Errors talking to the Trafikinfo API or reading its replies.
#[derive(Debug, thiserror::Error)]
pub enum TrafikinfoError {
    /// HTTP request failed (connection, DNS, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid or missing authentication key
    #[error("unauthorized: check TT_TRV_KEY")]
    Unauthorized,

    /// Rate limited by the API
    #[error("rate limited by Trafikinfo API")]
    RateLimited,

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Reply body is not the JSON shape we expect
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// The service accepted the request but reported an error in the reply
    #[error("service error from {origin}: {message}")]
    Service { origin: String, message: String },
}
