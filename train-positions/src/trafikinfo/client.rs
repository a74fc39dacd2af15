//! Trafikinfo HTTP client.
//!
//! Submits one serialized query per call and hands back the raw reply body.
//! There is no retry: a failed exchange is reported to the caller as is.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;

use super::error::TrafikinfoError;

/// Default endpoint for JSON replies.
pub const DEFAULT_ENDPOINT: &str = "https://api.trafikinfo.trafikverket.se/v2/data.json";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the Trafikinfo client.
#[derive(Debug, Clone)]
pub struct TrafikinfoConfig {
    /// Endpoint the query is POSTed to
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Value of the User-Agent header
    pub user_agent: String,
}

impl TrafikinfoConfig {
    /// Create a config pointing at the production endpoint.
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/v", env!("CARGO_PKG_VERSION"))
                .to_string(),
        }
    }

    /// Set a custom endpoint (for testing).
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for TrafikinfoConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Trafikinfo API client.
#[derive(Debug, Clone)]
pub struct TrafikinfoClient {
    http: reqwest::Client,
    endpoint: String,
}

impl TrafikinfoClient {
    /// Create a new client with the given configuration.
    pub fn new(config: TrafikinfoConfig) -> Result<Self, TrafikinfoError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/xml"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST a serialized query and return the reply body.
    ///
    /// Non-success statuses are errors; the body of an error reply is kept
    /// in the message.
    pub async fn post_query(&self, query_xml: String) -> Result<String, TrafikinfoError> {
        debug!(endpoint = %self.endpoint, bytes = query_xml.len(), "posting query");

        let response = self.http.post(&self.endpoint).body(query_xml).send().await?;

        let status = response.status();
        debug!(status = status.as_u16(), "received reply");

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(TrafikinfoError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TrafikinfoError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrafikinfoError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::super::stub::StubServer;
    use super::*;

    #[test]
    fn config_builder() {
        let config = TrafikinfoConfig::new()
            .with_endpoint("http://localhost:8080/data.json")
            .with_timeout(5);

        assert_eq!(config.endpoint, "http://localhost:8080/data.json");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn config_defaults() {
        let config = TrafikinfoConfig::default();

        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.user_agent.starts_with("train-positions/v"));
    }

    #[test]
    fn client_creation() {
        let client = TrafikinfoClient::new(TrafikinfoConfig::new()).unwrap();
        assert_eq!(client.endpoint(), DEFAULT_ENDPOINT);
    }

    #[tokio::test]
    async fn posts_query_with_headers() {
        let stub = StubServer::spawn(StatusCode::OK, r#"{"RESPONSE":{"RESULT":[]}}"#).await;
        let client =
            TrafikinfoClient::new(TrafikinfoConfig::new().with_endpoint(stub.url())).unwrap();

        let body = client.post_query("<request/>".to_string()).await.unwrap();
        assert_eq!(body, r#"{"RESPONSE":{"RESULT":[]}}"#);

        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.body, "<request/>");
        assert_eq!(request.header("content-type"), Some("application/xml"));
        assert_eq!(request.header("accept"), Some("application/json"));
        assert!(
            request
                .header("user-agent")
                .unwrap()
                .starts_with("train-positions/v")
        );
    }

    #[tokio::test]
    async fn unauthorized_status() {
        let stub = StubServer::spawn(StatusCode::UNAUTHORIZED, "denied").await;
        let client =
            TrafikinfoClient::new(TrafikinfoConfig::new().with_endpoint(stub.url())).unwrap();

        let result = client.post_query(String::new()).await;
        assert!(matches!(result, Err(TrafikinfoError::Unauthorized)));
    }

    #[tokio::test]
    async fn rate_limited_status() {
        let stub = StubServer::spawn(StatusCode::TOO_MANY_REQUESTS, "slow down").await;
        let client =
            TrafikinfoClient::new(TrafikinfoConfig::new().with_endpoint(stub.url())).unwrap();

        let result = client.post_query(String::new()).await;
        assert!(matches!(result, Err(TrafikinfoError::RateLimited)));
        assert_eq!(stub.requests().len(), 1);
    }

    #[tokio::test]
    async fn server_error_keeps_body() {
        let stub = StubServer::spawn(StatusCode::BAD_GATEWAY, "upstream down").await;
        let client =
            TrafikinfoClient::new(TrafikinfoConfig::new().with_endpoint(stub.url())).unwrap();

        match client.post_query(String::new()).await {
            Err(TrafikinfoError::Api { status, message }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        // Accept the connection and hold it open without ever answering
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            std::future::pending::<()>().await;
        });

        let client = TrafikinfoClient::new(
            TrafikinfoConfig::new()
                .with_endpoint(format!("http://{addr}/data.json"))
                .with_timeout(1),
        )
        .unwrap();

        match client.post_query(String::new()).await {
            Err(TrafikinfoError::Http(e)) => assert!(e.is_timeout(), "not a timeout: {e}"),
            other => panic!("expected a timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connection_failure() {
        // Bind then drop a listener so the port is known to be closed
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let client = TrafikinfoClient::new(
            TrafikinfoConfig::new()
                .with_endpoint(format!("http://{addr}/data.json"))
                .with_timeout(2),
        )
        .unwrap();

        let result = client.post_query(String::new()).await;
        assert!(matches!(result, Err(TrafikinfoError::Http(_))));
    }
}
