//! REST Countries HTTP client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::Value;

use super::{parse_country_names, CountryLookup, LookupError};

pub const DEFAULT_BASE_URL: &str = "https://restcountries.com/v3.1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the country lookup client
#[derive(Clone, Debug)]
pub struct LookupConfig {
    /// Service root; `/name/{query}` is appended to it
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,

    pub user_agent: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("regform/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl LookupConfig {
    /// Defaults overridden by `REGFORM_COUNTRY_API` and `REGFORM_LOOKUP_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var("REGFORM_COUNTRY_API") {
            if !base_url.trim().is_empty() {
                config.base_url = base_url.trim().to_string();
            }
        }
        if let Ok(raw) = std::env::var("REGFORM_LOOKUP_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.timeout = Duration::from_secs(secs),
                Err(e) => log::warn!("Ignoring REGFORM_LOOKUP_TIMEOUT_SECS={:?}: {}", raw, e),
            }
        }
        config
    }
}

/// Looks up countries by name against a REST Countries compatible service
pub struct RestCountriesClient {
    client: reqwest::Client,
    base_url: Url,
}

impl RestCountriesClient {
    pub fn new(config: LookupConfig) -> Result<Self, LookupError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| LookupError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(LookupError::InvalidUrl(config.base_url));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// `{base}/name/{query}?fields=name`, with the query percent-encoded.
    pub fn search_url(&self, query: &str) -> Result<Url, LookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LookupError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("name")
            .push(query);
        url.query_pairs_mut().append_pair("fields", "name");
        Ok(url)
    }
}

#[async_trait]
impl CountryLookup for RestCountriesClient {
    async fn search(&self, query: &str) -> Result<Vec<String>, LookupError> {
        let url = self.search_url(query)?;
        log::debug!("Fetching country suggestions from {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        // The service answers 404 when nothing matches.
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| LookupError::Decode(e.to_string()))?;
        Ok(parse_country_names(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve a single canned response and hand back the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });

        (format!("http://{}", addr), handle)
    }

    fn client_for(base_url: String) -> RestCountriesClient {
        RestCountriesClient::new(LookupConfig {
            base_url,
            timeout: Duration::from_secs(5),
            ..LookupConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_search_url_encodes_query() {
        let client = client_for("https://example.test/v3.1/".to_string());
        let url = client.search_url("united k").unwrap();
        assert_eq!(url.as_str(), "https://example.test/v3.1/name/united%20k?fields=name");

        let url = client.search_url("a/b").unwrap();
        assert_eq!(url.path(), "/v3.1/name/a%2Fb");
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        let result = RestCountriesClient::new(LookupConfig {
            base_url: "not a url".to_string(),
            ..LookupConfig::default()
        });
        assert!(matches!(result, Err(LookupError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_search_reads_common_names() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"[{"name":{"common":"India"}},{"name":{"common":"British Indian Ocean Territory"}}]"#,
        )
        .await;

        let names = client_for(base_url).search("ind").await.unwrap();
        assert_eq!(names, vec!["India", "British Indian Ocean Territory"]);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /name/ind?fields=name "), "got {}", request);
    }

    #[tokio::test]
    async fn test_not_found_means_no_results() {
        let (base_url, _server) =
            serve_once("404 Not Found", r#"{"status":404,"message":"Not Found"}"#).await;
        let names = client_for(base_url).search("zzz").await.unwrap();
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_reported_then_swallowed() {
        let (base_url, _server) = serve_once("500 Internal Server Error", "{}").await;
        let client = client_for(base_url);
        assert!(matches!(
            client.search("ind").await,
            Err(LookupError::Status(status)) if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_yields_empty_suggestions() {
        let (base_url, _server) = serve_once("200 OK", "this is not json").await;
        assert!(client_for(base_url).suggest("ind").await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_service_yields_empty_suggestions() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{}", addr));
        assert!(client.suggest("ind").await.is_empty());
    }
}
