use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {source}")]
    BuildClient {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to resolve endpoint '{endpoint}' against base URL: {source}")]
    JoinEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
}
