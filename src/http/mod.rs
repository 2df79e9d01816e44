//! HTTP client construction and search-request issuance.
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::HttpError;

/// A configured client bound to one search endpoint.
#[derive(Debug)]
pub struct SearchClient {
    client: Client,
    endpoint: Url,
}

/// Outcome of a single search request, before classification against the
/// expected status code.
#[derive(Debug)]
pub enum SearchStatus {
    /// A response arrived; its status code and drained body length.
    Responded { status: u16, body_bytes: usize },
    /// No usable response: connect, timeout, or mid-body transport failure.
    Failed(reqwest::Error),
}

impl SearchClient {
    /// Build a client for the given base URL and endpoint path.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint path cannot be resolved against
    /// the base URL or the underlying client cannot be constructed.
    pub fn new(
        base_url: &Url,
        endpoint: &str,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, HttpError> {
        let endpoint_url = base_url
            .join(endpoint)
            .map_err(|err| HttpError::JoinEndpoint {
                endpoint: endpoint.to_owned(),
                source: err,
            })?;
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|err| HttpError::BuildClient { source: err })?;
        Ok(Self {
            client,
            endpoint: endpoint_url,
        })
    }

    /// Issue one search GET and drain the response body. Timing is the
    /// caller's responsibility so that it brackets the full exchange.
    pub async fn search(&self, key: &str, page: u64) -> SearchStatus {
        let page_value = page.to_string();
        let request = self
            .client
            .get(self.endpoint.clone())
            .query(&[("query", key), ("page", page_value.as_str())]);
        match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.bytes().await {
                    Ok(body) => SearchStatus::Responded {
                        status,
                        body_bytes: body.len(),
                    },
                    Err(err) => SearchStatus::Failed(err),
                }
            }
            Err(err) => SearchStatus::Failed(err),
        }
    }
}
