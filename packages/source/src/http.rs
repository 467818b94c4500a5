//! HTTP-backed document source.
//!
//! Issues a single `GET <base_url>/<collection>` per collection. There is
//! no pagination and no retry: a failed request fails the run.

use async_trait::async_trait;

use crate::{DocumentSource, SourceError, extract_documents};

/// User-Agent sent with collection requests.
const USER_AGENT: &str = "wio-map/0.1 (+https://github.com/BSteffaniak/wio-map)";

/// Fetches collections from a JSON-over-HTTP document API.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    /// Creates a source for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Creates a source using an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns the request URL for `collection`.
    #[must_use]
    pub fn collection_url(&self, collection: &str) -> String {
        format!("{}/{collection}", self.base_url)
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    async fn fetch_collection(
        &self,
        collection: &str,
    ) -> Result<Vec<serde_json::Value>, SourceError> {
        let url = self.collection_url(collection);
        log::debug!("GET {url}");

        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(SourceError::Conversion {
                message: format!("{collection} request failed with status {}", resp.status()),
            });
        }
        let body = resp.text().await?;

        let json: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| SourceError::Conversion {
                message: format!("Failed to parse {collection} response: {e}"),
            })?;
        let docs = extract_documents(json, &url)?;

        log::info!("{collection}: fetched {} documents", docs.len());
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
    use tokio::net::TcpListener;

    /// Serves `response` to the first connection and returns the base URL.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0_u8; 4096];
            let _ = stream.read(&mut buf).await;
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        });
        format!("http://{addr}")
    }

    #[test]
    fn collection_url_strips_trailing_slash() {
        let client = reqwest::Client::new();
        let source = HttpSource::with_client(client, "https://api.example.org/v1/");
        assert_eq!(
            source.collection_url("pds_grids"),
            "https://api.example.org/v1/pds_grids"
        );
    }

    #[tokio::test]
    async fn fetches_collection_array() {
        let base_url = serve_once(
            "HTTP/1.1 200 OK\r\n\
             content-type: application/json\r\n\
             content-length: 28\r\n\
             connection: close\r\n\r\n\
             [{\"lat\": -4.0, \"lng\": 39.5}]",
        )
        .await;
        let source = HttpSource::new(&base_url).unwrap();

        let docs = source.fetch_collection("pds_grids").await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["lng"], serde_json::json!(39.5));
    }

    #[tokio::test]
    async fn error_status_fails_the_fetch() {
        let base_url = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\n\
             content-length: 0\r\n\
             connection: close\r\n\r\n",
        )
        .await;
        let source = HttpSource::new(&base_url).unwrap();

        let err = source.fetch_collection("pds_grids").await.unwrap_err();
        assert!(matches!(err, SourceError::Conversion { .. }));
        assert!(err.to_string().contains("503"));
    }
}
