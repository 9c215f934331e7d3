//! HTTP client for the station catalog service.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tracing::debug;

use super::{error::CatalogError, StationCatalog};
use crate::{
    config::CatalogConfig,
    models::{Station, StationsResponse},
    search::StationQuery,
};

/// Path of the station collection on the catalog host.
const STATION_PATH: &str = "/api/station";

/// Client for the station catalog service.
///
/// Requests are sent as-is: no retry, no authentication and no timeout
/// beyond what the transport applies by default.
#[derive(Debug, Clone)]
pub struct StationClient {
    http: reqwest::Client,
    base_url: String,
}

impl StationClient {
    /// Create a client talking to `base_url` (scheme, host and port).
    pub fn new(base_url: impl Into<String>) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client for the host selected by the configured platform.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        Self::new(config.base_url())
    }

    /// Base URL this client sends requests to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the full catalog or a name-filtered subset.
    pub async fn fetch_stations(&self, query: &StationQuery) -> Result<Vec<Station>, CatalogError> {
        let url = format!("{}{}", self.base_url, STATION_PATH);
        let mut request = self.http.get(&url);
        if let StationQuery::ByName(name) = query {
            request = request.query(&[("name", name.as_str())]);
        }

        debug!(%url, ?query, "Requesting stations");
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        parse_stations(&body)
    }
}

impl StationCatalog for StationClient {
    async fn fetch(&self, query: &StationQuery) -> Result<Vec<Station>, CatalogError> {
        self.fetch_stations(query).await
    }
}

fn parse_stations(body: &str) -> Result<Vec<Station>, CatalogError> {
    let envelope: StationsResponse =
        serde_json::from_str(body).map_err(|e| CatalogError::Json {
            message: e.to_string(),
        })?;
    Ok(envelope.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    /// Serve a single canned response and hand back the raw request head.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut chunk = [0_u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let read = socket.read(&mut chunk).await.unwrap();
                if read == 0 {
                    break;
                }
                head.extend_from_slice(&chunk[..read]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&head).to_string()
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = StationClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[test]
    fn malformed_payload_is_a_json_error() {
        let err = parse_stations(r#"{"stations": []}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Json { .. }));
    }

    #[tokio::test]
    async fn full_catalog_has_no_query_string() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"data":[{"id":"1","name":"Main St"},{"id":"2","name":"Oak Ave"}]}"#,
        )
        .await;
        let client = StationClient::new(base).unwrap();

        let stations = client.fetch_stations(&StationQuery::All).await.unwrap();
        assert_eq!(
            stations,
            vec![Station::new("1", "Main St"), Station::new("2", "Oak Ave")]
        );

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /api/station HTTP/1.1\r\n"), "{head}");
        assert!(head.to_lowercase().contains("content-type: application/json"));
    }

    #[tokio::test]
    async fn name_query_is_passed_through() {
        let (base, server) = serve_once("200 OK", r#"{"data":[{"id":"2","name":"Oak Ave"}]}"#).await;
        let client = StationClient::new(base).unwrap();

        let stations = client
            .fetch_stations(&StationQuery::ByName("Oak".to_string()))
            .await
            .unwrap();
        assert_eq!(stations, vec![Station::new("2", "Oak Ave")]);

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /api/station?name=Oak HTTP/1.1\r\n"), "{head}");
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let (base, server) = serve_once("503 Service Unavailable", "maintenance").await;
        let client = StationClient::new(base).unwrap();

        let err = client.fetch(&StationQuery::All).await.unwrap_err();
        match err {
            CatalogError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other}"),
        }
        server.await.unwrap();
    }
}
