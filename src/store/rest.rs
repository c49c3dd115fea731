//! Entity store backed by a remote content API.
//!
//! Entities are fetched one at a time from `{base}/{collection}/{id}`.

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::EntityRepository;
use crate::entity::{File, Node, Paragraph};

#[derive(Clone)]
pub struct RestRepository {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl RestRepository {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid content API URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Content API URL cannot be a base: {}", base_url);
        }

        Ok(Self {
            client: Client::new(),
            base_url,
            token,
        })
    }

    fn entity_url(&self, collection: &str, id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(collection).push(id);
        }
        url
    }

    /// GET one entity. 404 maps to `None`.
    async fn get_json<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<Option<T>> {
        let url = self.entity_url(collection, id);
        debug!("Fetching {}", url);

        let mut request = self.client.get(url.clone()).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let resp = request.send().await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Content API GET {} failed: {} - {}", url, status, text));
        }

        let entity = resp
            .json()
            .await
            .with_context(|| format!("Failed to decode {} {} from content API", collection, id))?;
        Ok(Some(entity))
    }
}

#[async_trait::async_trait]
impl EntityRepository for RestRepository {
    async fn load_node(&self, id: &str) -> Result<Option<Node>> {
        self.get_json("nodes", id).await
    }

    async fn load_paragraph(&self, id: &str) -> Result<Option<Paragraph>> {
        self.get_json("paragraphs", id).await
    }

    async fn load_file(&self, id: &str) -> Result<Option<File>> {
        self.get_json("files", id).await
    }
}
