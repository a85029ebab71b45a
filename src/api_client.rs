//! # Blend API Client Module
//!
//! Thin REST client for the external roastery server. Business rules
//! (stock, valuation, ratio storage) live on the server; this module only
//! moves blend records, payloads and list rows over HTTP. Each call is a
//! single attempt; failures are returned to the caller unchanged.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::ApiConfig;
use crate::errors::ApiError;
use crate::recipe_model::{BeanSummary, BlendPayload, BlendRecord, BlendSummary};

/// Operations the editor and CLI need from the external server
#[async_trait]
pub trait BlendApi: Send + Sync {
    /// List all blends
    async fn list_blends(&self) -> Result<Vec<BlendSummary>, ApiError>;

    /// Fetch one blend by id
    async fn get_blend(&self, id: i64) -> Result<BlendRecord, ApiError>;

    /// Create a new blend; returns the stored record when the server echoes it
    async fn create_blend(&self, payload: &BlendPayload) -> Result<Option<BlendRecord>, ApiError>;

    /// Replace the recipe and fields of an existing blend
    async fn update_blend(
        &self,
        id: i64,
        payload: &BlendPayload,
    ) -> Result<Option<BlendRecord>, ApiError>;

    /// List the bean catalog used to pick ingredients
    async fn list_beans(&self) -> Result<Vec<BeanSummary>, ApiError>;
}

/// [`BlendApi`] over HTTP with `reqwest`
#[derive(Debug, Clone)]
pub struct HttpBlendApi {
    client: Client,
    base_url: String,
}

impl HttpBlendApi {
    /// Build a client from configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roastery::api_client::HttpBlendApi;
    /// use roastery::config::ApiConfig;
    ///
    /// let api = HttpBlendApi::new(&ApiConfig::default()).unwrap();
    /// assert_eq!(api.endpoint("blends/3"), "http://localhost:8000/api/blends/3");
    /// ```
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Use an already configured `reqwest` client
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URL for a path relative to the API base
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Turn non-success statuses into [`ApiError::Status`] with the body text
    async fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), body = %body, "API request failed");
        Err(ApiError::Status {
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let response = Self::check_status(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Like [`Self::read_json`] but an empty body is not an error
    async fn read_optional_json<T: DeserializeOwned>(response: Response) -> Result<Option<T>, ApiError> {
        let response = Self::check_status(response).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl BlendApi for HttpBlendApi {
    async fn list_blends(&self) -> Result<Vec<BlendSummary>, ApiError> {
        let url = self.endpoint("blends");
        debug!(url = %url, "Fetching blend list");
        let response = self.client.get(&url).send().await?;
        Self::read_json(response).await
    }

    async fn get_blend(&self, id: i64) -> Result<BlendRecord, ApiError> {
        let url = self.endpoint(&format!("blends/{id}"));
        debug!(url = %url, "Fetching blend");
        let response = self.client.get(&url).send().await?;
        Self::read_json(response).await
    }

    async fn create_blend(&self, payload: &BlendPayload) -> Result<Option<BlendRecord>, ApiError> {
        let url = self.endpoint("blends");
        info!(url = %url, components = payload.recipe.len(), "Creating blend");
        let response = self.client.post(&url).json(payload).send().await?;
        Self::read_optional_json(response).await
    }

    async fn update_blend(
        &self,
        id: i64,
        payload: &BlendPayload,
    ) -> Result<Option<BlendRecord>, ApiError> {
        let url = self.endpoint(&format!("blends/{id}"));
        info!(url = %url, components = payload.recipe.len(), "Updating blend");
        let response = self.client.put(&url).json(payload).send().await?;
        Self::read_optional_json(response).await
    }

    async fn list_beans(&self) -> Result<Vec<BeanSummary>, ApiError> {
        let url = self.endpoint("beans");
        debug!(url = %url, "Fetching bean catalog");
        let response = self.client.get(&url).send().await?;
        Self::read_json(response).await
    }
}
