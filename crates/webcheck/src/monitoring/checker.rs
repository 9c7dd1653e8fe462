use std::time::Duration;
use tracing::debug;

use super::types::FetchOutcome;
use super::validation::validate_url;

/// Transport used to retrieve monitored resources
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Issue one GET for `url`, bounded by `timeout`. Never retries.
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchOutcome;
}

/// HTTP/HTTPS fetcher
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("webcheck/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Use a preconfigured client, e.g. one without proxy resolution
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn classify(err: reqwest::Error) -> FetchOutcome {
    if err.is_timeout() {
        FetchOutcome::Timeout
    } else if err.is_builder() {
        FetchOutcome::MalformedUrl { reason: err.to_string() }
    } else {
        let reason = match std::error::Error::source(&err) {
            Some(source) => format!("{}: {}", err, source),
            None => err.to_string(),
        };
        FetchOutcome::ConnectionFailed { reason }
    }
}

/// The `charset` parameter of a `Content-Type` value, e.g.
/// `text/html; charset="ISO-8859-1"`
fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchOutcome {
        let url = match validate_url(url) {
            Ok(url) => url,
            Err(reason) => return FetchOutcome::MalformedUrl { reason },
        };

        let response = match self.client.get(url.clone()).timeout(timeout).send().await {
            Ok(response) => response,
            Err(e) => return classify(e),
        };

        let status = response.status().as_u16();
        let charset = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset_param);

        match response.bytes().await {
            Ok(body) => {
                debug!(url = %url, status, bytes = body.len(), charset = ?charset, "Fetched resource");
                FetchOutcome::Response { status, body: body.to_vec(), charset }
            }
            Err(e) => classify(e),
        }
    }
}
