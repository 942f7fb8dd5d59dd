use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::{
    Assessment, AssessmentService, Charger, ChargerDirectory, InsightResponse, InsightSource,
    NodeControl, ServiceError,
};
use crate::domain::ScenarioParams;

/// REST client for the grid backend.
#[derive(Clone)]
pub struct HttpBackend {
    base_url: Url,
    client: Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ServiceError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::InvalidUrl(base_url.to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("grid-dashboard/0.2"));
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base url, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn check(resp: Response) -> Result<Response, ServiceError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ServiceError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ServiceError> {
        let body = Self::check(resp).await?.text().await?;
        serde_json::from_str(&body).map_err(|e| ServiceError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl InsightSource for HttpBackend {
    async fn fetch_insight(&self) -> Result<InsightResponse, ServiceError> {
        let url = self.endpoint(&["ai-insight"])?;
        debug!(%url, "fetching grid insight");
        let resp = self.client.get(url).send().await?;
        Self::decode(resp).await
    }
}

#[async_trait]
impl NodeControl for HttpBackend {
    async fn toggle_node(&self, node_id: &str) -> Result<(), ServiceError> {
        let url = self.endpoint(&["control", "toggle", node_id])?;
        debug!(%url, node_id, "toggling node");
        let resp = self.client.post(url).send().await?;
        Self::check(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl ChargerDirectory for HttpBackend {
    async fn fetch_chargers(&self) -> Result<Vec<Charger>, ServiceError> {
        let url = self.endpoint(&["chargers"])?;
        debug!(%url, "fetching charger list");
        let resp = self.client.get(url).send().await?;
        Self::decode(resp).await
    }
}

#[async_trait]
impl AssessmentService for HttpBackend {
    async fn analyze(&self, params: &ScenarioParams) -> Result<Assessment, ServiceError> {
        let url = self.endpoint(&["simulation", "analyze"])?;
        debug!(%url, ?params, "requesting scenario assessment");
        let resp = self.client.post(url).json(params).send().await?;
        Self::decode(resp).await
    }
}
