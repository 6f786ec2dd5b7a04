use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid endpoint url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request never produced a response (connection refused, timeout, ...)
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The body was not JSON or did not match the expected shape
    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}
