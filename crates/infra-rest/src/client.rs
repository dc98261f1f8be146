//! REST Document Server Client

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, warn};

use cspress_core::domain::{DocumentId, DocumentInfo};
use cspress_core::port::{DocumentServer, ServerError};

use crate::error::RestSetupError;

const ROUTE_PREFIX: &str = "rest/1/contentspec";

/// HTTP client for the content spec server
///
/// # Example
///
/// ```no_run
/// use cspress_infra_rest::RestDocumentServer;
/// use cspress_core::port::DocumentServer;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let server = RestDocumentServer::new("http://localhost:8080/TopicIndex", Duration::from_secs(30))?;
/// let text = server.get_text(42).await?;
/// println!("{}", text);
/// # Ok(())
/// # }
/// ```
pub struct RestDocumentServer {
    client: Client,
    base_url: String,
}

impl RestDocumentServer {
    /// Create a client for `base_url`
    ///
    /// # Arguments
    ///
    /// * `base_url` - Server root (e.g., `http://localhost:8080/TopicIndex`)
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self, RestSetupError> {
        let base_url = base_url.as_ref().trim_end_matches('/').to_string();

        let parsed = Url::parse(&base_url).map_err(|e| RestSetupError::InvalidUrl {
            url: base_url.clone(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RestSetupError::InvalidUrl {
                url: base_url,
                message: "scheme must be http or https".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RestSetupError::Client(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn route(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, ROUTE_PREFIX, path)
    }

    /// Send a request and return the body of a 2xx response
    async fn send_text(&self, request: RequestBuilder, id: Option<DocumentId>) -> Result<String, ServerError> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Server request failed");
            ServerError::Transport(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServerError::Transport(e.to_string()))?;

        debug!(status = %status, bytes = body.len(), "Server responded");
        check_status(status, body, id)
    }
}

/// Map a non-2xx status to the matching `ServerError`
fn check_status(status: StatusCode, body: String, id: Option<DocumentId>) -> Result<String, ServerError> {
    if status.is_success() {
        return Ok(body);
    }

    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => Err(ServerError::NotFound(id)),
        (StatusCode::BAD_REQUEST, _) => Err(ServerError::Rejected(body.trim().to_string())),
        _ => Err(ServerError::Status {
            status: status.as_u16(),
            message: body.trim().to_string(),
        }),
    }
}

#[async_trait]
impl DocumentServer for RestDocumentServer {
    async fn get_text(&self, id: DocumentId) -> Result<String, ServerError> {
        let request = self.client.get(self.route(&format!("get/text/{}", id)));
        self.send_text(request, Some(id)).await
    }

    async fn get_info(&self, id: DocumentId) -> Result<DocumentInfo, ServerError> {
        let request = self
            .client
            .get(self.route(&format!("get/json/{}", id)))
            .header(header::ACCEPT, "application/json");
        let body = self.send_text(request, Some(id)).await?;

        serde_json::from_str(&body).map_err(|e| ServerError::Decode(e.to_string()))
    }

    async fn update_text(&self, id: DocumentId, text: &str) -> Result<String, ServerError> {
        let request = self
            .client
            .put(self.route(&format!("update/text/{}", id)))
            .header(header::CONTENT_TYPE, "text/plain")
            .body(text.to_string());
        self.send_text(request, Some(id)).await
    }

    async fn create_text(&self, text: &str) -> Result<String, ServerError> {
        let request = self
            .client
            .post(self.route("create/text"))
            .header(header::CONTENT_TYPE, "text/plain")
            .body(text.to_string());
        self.send_text(request, None).await
    }
}
