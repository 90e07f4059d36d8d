/// Errors reported by a [`JenkinsClient`](crate::JenkinsClient).
///
/// # Examples
///
/// ```rust
/// use oxci_jenkins::error::ClientError;
///
/// let err = ClientError::HttpError { status: 401, body: "Unauthorized".to_string() };
/// assert!(err.to_string().contains("401"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Non-2xx status code from the Jenkins API.
    #[error("Jenkins API HTTP error: status={status}, body={body}")]
    HttpError { status: u16, body: String },

    /// An underlying HTTP transport error from `reqwest`.
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON API payload could not be decoded.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// `config.xml` payload could not be decoded.
    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::DeError),

    /// Base URL could not be parsed or extended with a path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Input configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Convenience type alias so callers can write `error::Result<T>`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// The single error kind a collection cycle surfaces to its caller.
///
/// Every failure collapses into [`CollectError::UpstreamFetch`], whether the
/// server was unreachable or answered with something unusable. It is fatal to
/// the current cycle only.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("upstream fetch failed ({what}): {source}")]
    UpstreamFetch {
        what: String,
        #[source]
        source: ClientError,
    },
}

impl CollectError {
    pub(crate) fn upstream(what: impl Into<String>) -> impl FnOnce(ClientError) -> Self {
        let what = what.into();
        move |source| CollectError::UpstreamFetch { what, source }
    }
}
