//! In-memory card catalog.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use rankdeck_core::card::{CardCatalog, CardRef};
use rankdeck_core::error::Result;

type CardKey = (String, String);

/// Seedable catalog for embeddings, demos, and tests.
///
/// Production deployments adapt their real card store behind `CardCatalog`;
/// this implementation holds the fixture set in memory.
#[derive(Default)]
pub struct MemoryCardCatalog {
    cards: RwLock<HashMap<CardKey, CardRef>>,
}

impl MemoryCardCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds cards to a tenant, replacing any with matching ids.
    pub async fn seed(&self, tenant_id: &str, cards: Vec<CardRef>) {
        let mut map = self.cards.write().await;
        for card in cards {
            map.insert((tenant_id.to_string(), card.id.clone()), card);
        }
    }
}

#[async_trait]
impl CardCatalog for MemoryCardCatalog {
    async fn get(&self, tenant_id: &str, card_id: &str) -> Result<Option<CardRef>> {
        let cards = self.cards.read().await;
        Ok(cards
            .get(&(tenant_id.to_string(), card_id.to_string()))
            .cloned())
    }

    async fn list_active(&self, tenant_id: &str, tag: Option<&str>) -> Result<Vec<CardRef>> {
        let cards = self.cards.read().await;
        Ok(cards
            .iter()
            .filter(|((tenant, _), card)| {
                tenant == tenant_id
                    && card.is_active
                    && tag.map_or(true, |t| card.tag.as_deref() == Some(t))
            })
            .map(|(_, card)| card.clone())
            .collect())
    }
}
