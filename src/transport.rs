use std::time::Duration;
use url::Url;

use crate::envelope::PollEnvelope;

/// A failed poll attempt. Both variants are transient: the poller logs them
/// and retries until its attempt budget runs out.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response body: {0}")]
    Malformed(String),
}

/// The "fetch one envelope" capability the poller is built against.
///
/// Production uses [`HttpTransport`]; tests supply scripted transports that
/// replay canned envelope sequences without touching the network.
pub trait Transport {
    fn fetch(&mut self) -> impl std::future::Future<Output = Result<PollEnvelope, FetchError>> + Send;
}

/// Fetches envelopes from the tester's HTTP status endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: Url, request_timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(HttpTransport { client, endpoint })
    }
}

impl Transport for HttpTransport {
    async fn fetch(&mut self) -> Result<PollEnvelope, FetchError> {
        let resp = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FetchError::Network(format!(
                "unexpected HTTP status {}",
                resp.status()
            )));
        }

        resp.json::<PollEnvelope>()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }
}
