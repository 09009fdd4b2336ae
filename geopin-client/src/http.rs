//! HTTP transport for the markers endpoint

use crate::{ClientConfig, ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::{CreateMarkerForm, CreateMarkerResponse, MarkersQuery, MarkersResponse};

/// Markers endpoint operations the map core depends on
#[async_trait]
pub trait MarkerApi: Send + Sync {
    /// `GET` listing or search
    async fn fetch_markers(&self, query: &MarkersQuery) -> ClientResult<MarkersResponse>;

    /// `POST` a new marker
    async fn create_marker(&self, form: &CreateMarkerForm) -> ClientResult<CreateMarkerResponse>;
}

/// Network client for the markers endpoint
#[derive(Debug, Clone)]
pub struct NetworkMarkerApi {
    client: Client,
    endpoint: String,
}

impl NetworkMarkerApi {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Unauthorized),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    Err(ClientError::Validation(text))
                }
                _ => Err(ClientError::Internal(format!("{status}: {text}"))),
            };
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }
}

#[async_trait]
impl MarkerApi for NetworkMarkerApi {
    async fn fetch_markers(&self, query: &MarkersQuery) -> ClientResult<MarkersResponse> {
        tracing::debug!(endpoint = %self.endpoint, ?query, "GET markers");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&query.to_pairs())
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn create_marker(&self, form: &CreateMarkerForm) -> ClientResult<CreateMarkerResponse> {
        tracing::debug!(endpoint = %self.endpoint, name = %form.name, "POST marker");
        let response = self.client.post(&self.endpoint).form(form).send().await?;
        let body: CreateMarkerResponse = Self::handle_response(response).await?;
        if !body.is_success() {
            return Err(ClientError::Rejected(body.result));
        }
        Ok(body)
    }
}
