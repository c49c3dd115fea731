//! Node detail lookup: a published node plus its card paragraphs.

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::entity::{EntityRef, Paragraph, Record};
use crate::file_url::FileUrlGenerator;
use crate::store::EntityRepository;

/// Node field holding references to card paragraphs.
pub const FIELD_CARD: &str = "field_card";
/// Paragraph field holding references to card images.
pub const FIELD_CARD_IMAGE: &str = "field_card_image";

#[derive(Debug, Error)]
pub enum NodeDetailError {
    #[error("Node with ID {0} was not found.")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct NodeDetail {
    pub node: Record,
    pub paragraphs: Vec<Record>,
}

pub struct NodeDetailService {
    repo: Arc<dyn EntityRepository>,
    urls: Arc<dyn FileUrlGenerator>,
}

impl NodeDetailService {
    pub fn new(repo: Arc<dyn EntityRepository>, urls: Arc<dyn FileUrlGenerator>) -> Self {
        Self { repo, urls }
    }

    /// Load a published node and its card paragraphs, each enriched with
    /// `image_url` when it references card images.
    pub async fn get_node_detail(&self, node_id: &str) -> Result<NodeDetail, NodeDetailError> {
        let node = match self.repo.load_node(node_id).await? {
            Some(node) if node.published => node,
            Some(_) => {
                debug!("Node {} is unpublished", node_id);
                return Err(NodeDetailError::NotFound(node_id.to_string()));
            }
            None => return Err(NodeDetailError::NotFound(node_id.to_string())),
        };

        let mut paragraphs = Vec::new();
        if node.has_field(FIELD_CARD) {
            for reference in node.referenced(FIELD_CARD) {
                let Some(paragraph) = self.load_paragraph(reference).await? else {
                    continue;
                };

                let mut record = paragraph.to_record();
                if let Some(image_url) = self.card_image_url(&paragraph).await? {
                    record.insert("image_url".to_string(), image_url.into());
                }
                paragraphs.push(record);
            }
        }

        info!(
            "Node {} resolved with {} card paragraphs",
            node_id,
            paragraphs.len()
        );

        Ok(NodeDetail {
            node: node.to_record(),
            paragraphs,
        })
    }

    /// Unloadable or non-paragraph references are dropped, as the content
    /// store does when listing referenced entities.
    async fn load_paragraph(&self, reference: &EntityRef) -> anyhow::Result<Option<Paragraph>> {
        if !reference.is_type("paragraph") {
            warn!(
                "Skipping {} reference to {} {}",
                FIELD_CARD, reference.target_type, reference.target_id
            );
            return Ok(None);
        }

        let paragraph = self.repo.load_paragraph(&reference.target_id.key()).await?;
        if paragraph.is_none() {
            warn!("Referenced paragraph {} not found", reference.target_id);
        }
        Ok(paragraph)
    }

    /// URL of the last referenced card image. `None` when the paragraph
    /// references no images at all.
    async fn card_image_url(&self, paragraph: &Paragraph) -> anyhow::Result<Option<String>> {
        if !paragraph.has_field(FIELD_CARD_IMAGE) {
            return Ok(None);
        }

        let mut image_url = None;
        for reference in paragraph.referenced(FIELD_CARD_IMAGE) {
            image_url = Some(self.file_url(reference).await?);
        }
        Ok(image_url)
    }

    /// Empty string for anything that does not resolve to a file URL.
    async fn file_url(&self, reference: &EntityRef) -> anyhow::Result<String> {
        if !reference.is_type("file") {
            warn!(
                "Card image reference to {} {} is not a file",
                reference.target_type, reference.target_id
            );
            return Ok(String::new());
        }

        let Some(file) = self.repo.load_file(&reference.target_id.key()).await? else {
            warn!("Referenced file {} not found", reference.target_id);
            return Ok(String::new());
        };

        match self.urls.generate_absolute_string(&file.uri) {
            Ok(url) => Ok(url),
            Err(e) => {
                warn!("Failed to generate URL for file {}: {}", file.id, e);
                Ok(String::new())
            }
        }
    }
}
