//! In-memory entity store seeded from JSON fixture files.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use super::EntityRepository;
use crate::entity::{File, Node, Paragraph};

/// Contents of one fixture file. Every list is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ContentBundle {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
    #[serde(default)]
    pub files: Vec<File>,
}

#[derive(Debug, Default)]
struct Entities {
    nodes: HashMap<String, Node>,
    paragraphs: HashMap<String, Paragraph>,
    files: HashMap<String, File>,
}

/// Entity store held in memory. Clones share the same entities.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    inner: Arc<RwLock<Entities>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` bundle in `dir`. Later files override earlier
    /// entities with the same id.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        if !dir.exists() {
            anyhow::bail!("Content directory does not exist: {:?}", dir);
        }

        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        paths.retain(|p| p.extension().map(|e| e == "json").unwrap_or(false));
        paths.sort();

        let repo = Self::new();
        for path in paths {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read content file: {:?}", path))?;
            let bundle: ContentBundle = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse content file: {:?}", path))?;

            info!(
                "Loaded {} nodes, {} paragraphs, {} files from {:?}",
                bundle.nodes.len(),
                bundle.paragraphs.len(),
                bundle.files.len(),
                path
            );
            repo.extend(bundle);
        }

        Ok(repo)
    }

    pub fn extend(&self, bundle: ContentBundle) {
        for node in bundle.nodes {
            self.insert_node(node);
        }
        for paragraph in bundle.paragraphs {
            self.insert_paragraph(paragraph);
        }
        for file in bundle.files {
            self.insert_file(file);
        }
    }

    pub fn insert_node(&self, node: Node) {
        let mut entities = self.inner.write().unwrap();
        debug!("InMemoryRepository: stored node '{}'", node.id);
        entities.nodes.insert(node.id.key(), node);
    }

    pub fn insert_paragraph(&self, paragraph: Paragraph) {
        let mut entities = self.inner.write().unwrap();
        entities.paragraphs.insert(paragraph.id.key(), paragraph);
    }

    pub fn insert_file(&self, file: File) {
        let mut entities = self.inner.write().unwrap();
        entities.files.insert(file.id.key(), file);
    }

    /// Number of stored nodes.
    pub fn node_count(&self) -> usize {
        self.inner.read().unwrap().nodes.len()
    }
}

#[async_trait::async_trait]
impl EntityRepository for InMemoryRepository {
    async fn load_node(&self, id: &str) -> Result<Option<Node>> {
        Ok(self.inner.read().unwrap().nodes.get(id).cloned())
    }

    async fn load_paragraph(&self, id: &str) -> Result<Option<Paragraph>> {
        Ok(self.inner.read().unwrap().paragraphs.get(id).cloned())
    }

    async fn load_file(&self, id: &str) -> Result<Option<File>> {
        Ok(self.inner.read().unwrap().files.get(id).cloned())
    }
}
