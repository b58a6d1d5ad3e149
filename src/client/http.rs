use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::client::{
    ComposeRequest, ComposeResponse, ConfirmRequest, ConfirmResponse, HealthResponse, Orchestrator,
    RecomposeResponse, RemoteStatus, StatusResponse,
};
use crate::config::OrchestratorSettings;
use crate::error::NetworkError;
use crate::lifecycle::trigger::RecompositionTrigger;

/// REST client for the orchestrator service.
#[derive(Debug, Clone)]
pub struct HttpOrchestrator {
    client: Client,
    base_url: Url,
}

impl HttpOrchestrator {
    pub fn new(settings: &OrchestratorSettings) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| NetworkError::transport(format!("Failed to build HTTP client: {}", e)))?;
        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| NetworkError::transport(format!("Invalid orchestrator url {}: {}", settings.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(NetworkError::transport(format!(
                "Invalid orchestrator url {}",
                settings.base_url
            )));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Appends path segments to the base url, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, NetworkError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| NetworkError::transport(format!("Invalid orchestrator url {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, segments: &[&str], body: &B) -> Result<T, NetworkError> {
        let url = self.url(segments)?;
        debug!(%url, "POST");
        let response = self.client.post(url).json(body).send().await.map_err(transport_error)?;
        decode(response).await
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, NetworkError> {
        let url = self.url(segments)?;
        debug!(%url, "GET");
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        decode(response).await
    }
}

fn transport_error(e: reqwest::Error) -> NetworkError {
    if e.is_timeout() {
        NetworkError::transport(format!("Request timed out: {}", e))
    } else {
        NetworkError::transport(e.to_string())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, NetworkError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(transport_error)?;

    if !status.is_success() {
        let body = serde_json::from_slice::<Value>(&bytes).ok();
        warn!(status = status.as_u16(), "Orchestrator returned an error response");
        return Err(NetworkError::response(
            status.as_u16(),
            format!("Unexpected status {}", status),
            body,
        ));
    }

    serde_json::from_slice(&bytes).map_err(|e| {
        NetworkError::response(
            status.as_u16(),
            format!("Malformed response body: {}", e),
            serde_json::from_slice::<Value>(&bytes).ok(),
        )
    })
}

#[async_trait]
impl Orchestrator for HttpOrchestrator {
    async fn compose(&self, request: &ComposeRequest) -> Result<ComposeResponse, NetworkError> {
        let response: ComposeResponse = self.post(&["api", "v1", "compose"], request).await?;
        if response.blueprints.is_empty() {
            return Err(NetworkError::response(
                StatusCode::OK.as_u16(),
                "Compose returned no alternatives",
                None,
            ));
        }
        Ok(response)
    }

    async fn confirm(&self, composition_id: &str, request: &ConfirmRequest) -> Result<ConfirmResponse, NetworkError> {
        self.post(&["api", "v1", "compositions", composition_id, "confirm"], request)
            .await
    }

    async fn status(&self, composition_id: &str) -> Result<RemoteStatus, NetworkError> {
        match self
            .get::<StatusResponse>(&["api", "v1", "compositions", composition_id, "status"])
            .await
        {
            Ok(s) if s.status == "not_found" => Ok(RemoteStatus::NotFound),
            Ok(s) => Ok(RemoteStatus::Found(s)),
            Err(e) if e.status == StatusCode::NOT_FOUND.as_u16() => Ok(RemoteStatus::NotFound),
            Err(e) => Err(e),
        }
    }

    async fn recompose(&self, trigger: &RecompositionTrigger) -> Result<RecomposeResponse, NetworkError> {
        self.post(&["api", "v1", "recompose"], trigger).await
    }

    async fn health(&self) -> Result<HealthResponse, NetworkError> {
        self.get(&["api", "v1", "health"]).await
    }
}
