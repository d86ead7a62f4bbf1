//! Card store trait definitions

use crate::error::StorageResult;
use async_trait::async_trait;
use cardex_core::{
    Ability, Attack, Card, CardQuery, CardSummary, RelatedCardSummary, RelatedEdge, SetOption,
};

/// Trait for card store implementations
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Health check
    async fn health_check(&self) -> StorageResult<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Catalog Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Run a catalog query; returns the requested page of cards plus the
    /// total count of matching cards computed over the same filters.
    async fn list_cards(&self, query: &CardQuery) -> StorageResult<(Vec<Card>, usize)>;

    /// Fetch a single card by id, regardless of format legality.
    async fn get_card(&self, id: &str) -> StorageResult<Option<Card>>;

    /// Attacks for a card, in printed order.
    async fn attacks_for(&self, card_id: &str) -> StorageResult<Vec<Attack>>;

    /// Abilities for a card.
    async fn abilities_for(&self, card_id: &str) -> StorageResult<Vec<Ability>>;

    /// Strongest related-card edges for a card, highest relevance first.
    async fn related_for(
        &self,
        card_id: &str,
        limit: usize,
    ) -> StorageResult<Vec<RelatedCardSummary>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Autocomplete and Filter Metadata
    // ─────────────────────────────────────────────────────────────────────────

    /// Compact rows for every format-legal card, ordered by name.
    async fn autocomplete_candidates(&self) -> StorageResult<Vec<CardSummary>>;

    /// Distinct type tags present in the catalog.
    async fn distinct_types(&self) -> StorageResult<Vec<String>>;

    /// Distinct rarity labels present in the catalog.
    async fn distinct_rarities(&self) -> StorageResult<Vec<String>>;

    /// Distinct sets with at least one format-legal card.
    async fn distinct_sets(&self) -> StorageResult<Vec<SetOption>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Relationship Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Format-legal cards whose name exactly matches one of the given
    /// names, with type tags populated.
    async fn legal_cards_by_names(&self, names: &[String]) -> StorageResult<Vec<Card>>;

    /// Format-legal cards related to any card whose name contains the
    /// fragment, paired with the edge relevance, strongest edges first.
    async fn related_by_source_name(
        &self,
        fragment: &str,
        limit: usize,
    ) -> StorageResult<Vec<(Card, i32)>>;

    /// Names of the top-rated format-legal cards, best tier first.
    async fn top_rated_names(&self, limit: usize) -> StorageResult<Vec<String>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Import Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert or update a card. The stored type tags are replaced with the
    /// card's tags; `created_at` survives updates.
    async fn upsert_card(&self, card: &Card) -> StorageResult<()>;

    /// Replace all attacks for a card.
    async fn replace_attacks(&self, card_id: &str, attacks: &[Attack]) -> StorageResult<()>;

    /// Replace all abilities for a card.
    async fn replace_abilities(&self, card_id: &str, abilities: &[Ability])
        -> StorageResult<()>;

    /// Insert or update a related-card edge.
    async fn add_related(&self, edge: &RelatedEdge) -> StorageResult<()>;
}
