//! Relationship resolution
//!
//! Answers "what plays well with this card" by consulting curated knowledge
//! first and persisted edges second, tagging every hit with a relationship
//! category and the source that produced the answer.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use cardex_core::limits::EDGE_LOOKUP_LIMIT;
use cardex_core::{Card, CompetitiveTier, Rarity};
use cardex_storage::CardStore;

use crate::error::SynergyResult;
use crate::knowledge::SynergyKnowledge;

/// How a related card connects to the card it was looked up from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipCategory {
    Search,
    Disruption,
    Stadium,
    Energy,
    DrawSupport,
    TrainerSupport,
    AlternateAttacker,
    Synergy,
}

/// Which resolution stage produced a relationship answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationSource {
    Curated,
    Database,
    None,
}

/// One related card with its catalog fields and relationship metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedCard {
    pub id: String,
    pub name: String,
    pub set_name: String,
    pub card_number: String,
    pub image_url: Option<String>,
    pub competitive_rating: Option<CompetitiveTier>,
    pub rarity: Option<Rarity>,
    pub types: Vec<String>,
    pub relevance_score: i64,
    pub relationship_type: RelationshipCategory,
}

/// Full relationship answer for one card name. An empty `related_cards`
/// with `source: "none"` is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipBundle {
    pub card_name: String,
    pub related_cards: Vec<RelatedCard>,
    pub deck_archetype: Option<String>,
    pub source: RelationSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Resolves related cards for a card name against a store.
pub struct SynergyResolver {
    knowledge: Arc<SynergyKnowledge>,
}

impl SynergyResolver {
    pub fn new(knowledge: Arc<SynergyKnowledge>) -> Self {
        Self { knowledge }
    }

    /// The knowledge snapshot this resolver consults.
    pub fn knowledge(&self) -> &SynergyKnowledge {
        &self.knowledge
    }

    /// Resolve related cards for `card_name`.
    ///
    /// A curated entry wins whenever the name has one, even over persisted
    /// edges and even when none of its partners are in the catalog. Without
    /// a curated entry, edges from any source card whose name contains
    /// `card_name` are used, capped at [`EDGE_LOOKUP_LIMIT`].
    pub async fn relationships(
        &self,
        store: &dyn CardStore,
        card_name: &str,
    ) -> SynergyResult<RelationshipBundle> {
        let curated = self
            .knowledge
            .synergies_for(card_name)
            .filter(|list| !list.is_empty());
        if let Some(curated) = curated {
            let related = self.curated_related(store, card_name, curated).await?;
            return Ok(RelationshipBundle {
                card_name: card_name.to_string(),
                related_cards: related,
                deck_archetype: self.archetype_label(card_name),
                source: RelationSource::Curated,
                message: None,
            });
        }

        let edges = store
            .related_by_source_name(card_name, EDGE_LOOKUP_LIMIT)
            .await?;
        if !edges.is_empty() {
            let related = edges
                .iter()
                .map(|(card, relevance)| {
                    let category = categorize(card_name, card, &self.knowledge);
                    related_card(card, i64::from(*relevance), category)
                })
                .collect();
            return Ok(RelationshipBundle {
                card_name: card_name.to_string(),
                related_cards: related,
                deck_archetype: self.archetype_label(card_name),
                source: RelationSource::Database,
                message: None,
            });
        }

        Ok(RelationshipBundle {
            card_name: card_name.to_string(),
            related_cards: Vec::new(),
            deck_archetype: None,
            source: RelationSource::None,
            message: Some("No specific relationships found for this card".to_string()),
        })
    }

    /// Fetch the legal printings of every curated partner and score them by
    /// list position: the score drops by one every two positions.
    async fn curated_related(
        &self,
        store: &dyn CardStore,
        card_name: &str,
        curated: &[String],
    ) -> SynergyResult<Vec<RelatedCard>> {
        let rows = store.legal_cards_by_names(curated).await?;
        let mut by_name: HashMap<&str, Vec<&Card>> = HashMap::new();
        for card in &rows {
            by_name.entry(card.name.as_str()).or_default().push(card);
        }

        let mut related = Vec::new();
        for (position, name) in curated.iter().enumerate() {
            let Some(printings) = by_name.get(name.as_str()) else {
                continue;
            };
            let score = 10 - position as i64 / 2;
            for card in printings {
                let category = categorize(card_name, card, &self.knowledge);
                related.push(related_card(card, score, category));
            }
        }
        Ok(related)
    }

    fn archetype_label(&self, card_name: &str) -> Option<String> {
        self.knowledge
            .archetype_for(card_name)
            .map(|a| a.label.clone())
    }
}

/// Tag a related card with a category. Rules run in a fixed priority order
/// and the first match wins; the target's tags and name decide, except for
/// the attacker rule which also looks at the source name.
fn categorize(
    source_name: &str,
    target: &Card,
    knowledge: &SynergyKnowledge,
) -> RelationshipCategory {
    let trainer = target.has_type("trainer");
    if trainer && target.name.contains("Ball") {
        return RelationshipCategory::Search;
    }
    if trainer && knowledge.is_disruption(&target.name) {
        return RelationshipCategory::Disruption;
    }
    if trainer && target.name.contains("Stadium") {
        return RelationshipCategory::Stadium;
    }
    if target.has_type("energy") {
        return RelationshipCategory::Energy;
    }
    if knowledge.is_draw_support(&target.name) {
        return RelationshipCategory::DrawSupport;
    }
    if trainer {
        return RelationshipCategory::TrainerSupport;
    }
    if source_name.ends_with(" ex") && target.name.ends_with(" ex") {
        return RelationshipCategory::AlternateAttacker;
    }
    RelationshipCategory::Synergy
}

fn related_card(card: &Card, score: i64, category: RelationshipCategory) -> RelatedCard {
    RelatedCard {
        id: card.id.clone(),
        name: card.name.clone(),
        set_name: card.set_name.clone(),
        card_number: card.card_number.clone(),
        image_url: card.image_url.clone(),
        competitive_rating: card.competitive_tier,
        rarity: card.rarity,
        types: card.types.clone(),
        relevance_score: score,
        relationship_type: category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardex_core::RelatedEdge;
    use cardex_storage::MemoryStore;

    fn resolver() -> SynergyResolver {
        SynergyResolver::new(Arc::new(SynergyKnowledge::builtin()))
    }

    async fn seed_card(store: &MemoryStore, card: Card) {
        store.upsert_card(&card).await.unwrap();
    }

    fn trainer(id: &str, name: &str) -> Card {
        Card::new(id, name, "sv1", "Scarlet & Violet", "1").with_types(["trainer"])
    }

    #[tokio::test]
    async fn test_curated_scores_decay_by_list_position() {
        let store = MemoryStore::new();
        seed_card(
            &store,
            Card::new("sv3-164", "Pidgeot ex", "sv3", "Obsidian Flames", "164")
                .with_types(["colorless"])
                .with_tier(CompetitiveTier::Competitive),
        )
        .await;
        seed_card(&store, trainer("sv1-172", "Boss's Orders")).await;
        seed_card(&store, trainer("sv1-196", "Ultra Ball")).await;
        seed_card(&store, trainer("sv2-188", "Super Rod")).await;
        // Illegal printings never make it into curated results.
        seed_card(
            &store,
            Card::new("swsh6-28", "Arcanine ex", "swsh6", "Chilling Reign", "28")
                .with_types(["fire"])
                .with_format_legal(false),
        )
        .await;

        let bundle = resolver()
            .relationships(&store, "Charizard ex")
            .await
            .unwrap();

        assert_eq!(bundle.source, RelationSource::Curated);
        assert_eq!(bundle.deck_archetype.as_deref(), Some("Charizard ex"));
        assert!(bundle.message.is_none());

        let names: Vec<&str> = bundle.related_cards.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Pidgeot ex", "Boss's Orders", "Ultra Ball", "Super Rod"]);

        let scores: Vec<i64> = bundle
            .related_cards
            .iter()
            .map(|r| r.relevance_score)
            .collect();
        assert_eq!(scores, [10, 7, 6, 6]);

        let categories: Vec<RelationshipCategory> = bundle
            .related_cards
            .iter()
            .map(|r| r.relationship_type)
            .collect();
        assert_eq!(
            categories,
            [
                RelationshipCategory::DrawSupport,
                RelationshipCategory::Disruption,
                RelationshipCategory::Search,
                RelationshipCategory::TrainerSupport,
            ]
        );

        let pidgeot = names.iter().position(|n| *n == "Pidgeot ex").unwrap();
        let super_rod = names.iter().position(|n| *n == "Super Rod").unwrap();
        assert!(pidgeot < super_rod);
    }

    #[tokio::test]
    async fn test_curated_includes_every_legal_printing() {
        let store = MemoryStore::new();
        seed_card(&store, trainer("sv1-191", "Rare Candy")).await;
        seed_card(&store, trainer("sv4-130", "Rare Candy")).await;
        seed_card(&store, trainer("sv1-181", "Nest Ball")).await;

        let bundle = resolver().relationships(&store, "Arven").await.unwrap();

        assert_eq!(bundle.source, RelationSource::Curated);
        // Arven has a curated entry but belongs to no archetype.
        assert!(bundle.deck_archetype.is_none());

        let rows: Vec<(&str, i64)> = bundle
            .related_cards
            .iter()
            .map(|r| (r.id.as_str(), r.relevance_score))
            .collect();
        assert_eq!(
            rows,
            [("sv1-191", 10), ("sv4-130", 10), ("sv1-181", 8)]
        );
    }

    #[tokio::test]
    async fn test_category_rules_apply_in_priority_order() {
        let store = MemoryStore::new();
        seed_card(
            &store,
            Card::new("sv4-124", "Roaring Moon ex", "sv4", "Paradox Rift", "124")
                .with_types(["darkness"]),
        )
        .await;

        let targets = [
            ("t-1", "Ancient Ball", vec!["trainer"], 9),
            ("t-2", "Cross Switcher", vec!["trainer"], 8),
            ("t-3", "Crystal Stadium", vec!["trainer"], 7),
            ("t-4", "Dark Energy", vec!["energy"], 6),
            ("t-5", "Radiant Greninja", vec!["water"], 5),
            ("t-6", "Choice Belt", vec!["trainer"], 4),
            ("t-7", "Iron Hands ex", vec!["lightning"], 3),
            ("t-8", "Sableye", vec!["darkness"], 2),
        ];
        for (id, name, types, relevance) in &targets {
            seed_card(
                &store,
                Card::new(*id, *name, "sv4", "Paradox Rift", "1").with_types(types.clone()),
            )
            .await;
            store
                .add_related(&RelatedEdge::new("sv4-124", *id, *relevance))
                .await
                .unwrap();
        }

        let bundle = resolver()
            .relationships(&store, "Roaring Moon ex")
            .await
            .unwrap();

        assert_eq!(bundle.source, RelationSource::Database);
        assert!(bundle.deck_archetype.is_none());
        assert_eq!(bundle.related_cards[0].relevance_score, 9);

        let categories: Vec<RelationshipCategory> = bundle
            .related_cards
            .iter()
            .map(|r| r.relationship_type)
            .collect();
        assert_eq!(
            categories,
            [
                RelationshipCategory::Search,
                RelationshipCategory::Disruption,
                RelationshipCategory::Stadium,
                RelationshipCategory::Energy,
                RelationshipCategory::DrawSupport,
                RelationshipCategory::TrainerSupport,
                RelationshipCategory::AlternateAttacker,
                RelationshipCategory::Synergy,
            ]
        );
    }

    #[tokio::test]
    async fn test_curated_entry_wins_over_edges_even_when_empty() {
        let store = MemoryStore::new();
        seed_card(
            &store,
            Card::new("sv2-79", "Comfey", "sv2", "Paldea Evolved", "79")
                .with_types(["psychic"]),
        )
        .await;
        seed_card(
            &store,
            Card::new("sv3-180", "Snorlax", "sv3", "Obsidian Flames", "180")
                .with_types(["colorless"]),
        )
        .await;
        store
            .add_related(&RelatedEdge::new("sv2-79", "sv3-180", 9))
            .await
            .unwrap();

        let bundle = resolver().relationships(&store, "Comfey").await.unwrap();

        // Snorlax is not a curated partner, so the edge never surfaces.
        assert_eq!(bundle.source, RelationSource::Curated);
        assert!(bundle.related_cards.is_empty());
        assert_eq!(bundle.deck_archetype.as_deref(), Some("Lost Box"));
    }

    #[tokio::test]
    async fn test_database_path_reports_archetype() {
        let store = MemoryStore::new();
        seed_card(
            &store,
            Card::new("sv1-98", "Sableye", "sv1", "Scarlet & Violet", "98")
                .with_types(["darkness"]),
        )
        .await;
        seed_card(
            &store,
            Card::new("sv2-79", "Comfey", "sv2", "Paldea Evolved", "79")
                .with_types(["psychic"]),
        )
        .await;
        store
            .add_related(&RelatedEdge::new("sv1-98", "sv2-79", 7))
            .await
            .unwrap();

        let bundle = resolver().relationships(&store, "Sableye").await.unwrap();

        assert_eq!(bundle.source, RelationSource::Database);
        assert_eq!(bundle.deck_archetype.as_deref(), Some("Lost Box"));
        assert_eq!(bundle.related_cards.len(), 1);
        assert_eq!(bundle.related_cards[0].name, "Comfey");
    }

    #[tokio::test]
    async fn test_unknown_name_yields_none_bundle() {
        let store = MemoryStore::new();

        let bundle = resolver().relationships(&store, "Mewtwo").await.unwrap();

        assert_eq!(bundle.source, RelationSource::None);
        assert!(bundle.related_cards.is_empty());
        assert!(bundle.deck_archetype.is_none());
        assert_eq!(
            bundle.message.as_deref(),
            Some("No specific relationships found for this card")
        );
    }

    #[test]
    fn test_wire_shape_uses_snake_case_tags() {
        let card = Card::new("sv1-196", "Ultra Ball", "sv1", "Scarlet & Violet", "196")
            .with_types(["trainer"]);
        let related = related_card(&card, 10, RelationshipCategory::DrawSupport);
        let value = serde_json::to_value(&related).unwrap();
        assert_eq!(value["relationship_type"], "draw_support");
        assert_eq!(value["relevance_score"], 10);

        let bundle = RelationshipBundle {
            card_name: "Ultra Ball".to_string(),
            related_cards: vec![],
            deck_archetype: None,
            source: RelationSource::None,
            message: None,
        };
        let value = serde_json::to_value(&bundle).unwrap();
        assert_eq!(value["source"], "none");
        assert!(value.get("message").is_none());
        assert!(value["deck_archetype"].is_null());
    }
}
