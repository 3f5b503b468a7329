//! Card read model and catalog lookup trait.
//!
//! The engine never creates, edits, or validates cards; it only reads them
//! through [`CardCatalog`] for deck assembly and existence checks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Read-only card reference as seen by the engine.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CardRef {
    pub id: String,
    pub title: String,
    /// Category tag used for deck filtering, if any.
    #[serde(default)]
    pub tag: Option<String>,
    /// Inactive cards are excluded from new decks but keep their history.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl CardRef {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            tag: None,
            is_active: true,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// An abstract, tenant-scoped card lookup.
///
/// This trait decouples the engine from wherever cards actually live
/// (database, remote API, in-memory fixture). Card lifecycle management
/// belongs to that owning system.
#[async_trait]
pub trait CardCatalog: Send + Sync {
    /// Finds a card by its ID within a tenant.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(CardRef))`: Card found
    /// - `Ok(None)`: Card not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn get(&self, tenant_id: &str, card_id: &str) -> Result<Option<CardRef>>;

    /// Lists the tenant's active cards, optionally restricted to a tag.
    async fn list_active(&self, tenant_id: &str, tag: Option<&str>) -> Result<Vec<CardRef>>;
}
