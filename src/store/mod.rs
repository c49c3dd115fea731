//! Entity repository abstraction.
//!
//! Defines the [`EntityRepository`] trait so the content backend (fixture
//! files in memory, a remote content API) can be swapped at startup.

pub mod memory;
pub mod rest;

use crate::entity::{File, Node, Paragraph};

/// Read access to the external content store.
///
/// `Ok(None)` means the entity does not exist; `Err` means the store failed.
#[async_trait::async_trait]
pub trait EntityRepository: Send + Sync {
    async fn load_node(&self, id: &str) -> anyhow::Result<Option<Node>>;
    async fn load_paragraph(&self, id: &str) -> anyhow::Result<Option<Paragraph>>;
    async fn load_file(&self, id: &str) -> anyhow::Result<Option<File>>;
}
