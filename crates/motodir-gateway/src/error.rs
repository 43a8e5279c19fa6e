use thiserror::Error;

/// Errors returned by the backend gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A row or response body did not match the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backend rejected the request.
    #[error("backend error {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Row-level security or a missing/invalid key.
    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("not found: {context}")]
    NotFound { context: String },

    #[error("not signed in")]
    NotSignedIn,

    #[error("pagination limit reached for {table}: exceeded {max_pages} pages")]
    PaginationLimit { table: String, max_pages: usize },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("email not confirmed")]
    EmailNotConfirmed,

    #[error("invalid login credentials")]
    InvalidCredentials,
}
