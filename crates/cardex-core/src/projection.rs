//! Card projection into the externally documented shape

use crate::card::{Ability, Attack, Card, CompetitiveTier, Rarity};
use serde::{Deserialize, Serialize};

/// Image references. The store tracks one canonical URL which fans out to
/// both sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardImages {
    pub small: Option<String>,
    pub large: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legalities {
    pub standard: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetView {
    pub id: String,
    pub name: String,
    pub legalities: Legalities,
}

/// The externally documented card shape.
///
/// Base columns keep their stored names; the `images`/`set` blocks and
/// `competitiveRating` are derived from those base fields, which is what
/// makes the projection idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardView {
    pub id: String,
    pub name: String,
    pub set_id: String,
    pub set_name: String,
    pub card_number: String,
    pub rarity: Option<Rarity>,
    /// Always present, possibly empty.
    pub types: Vec<String>,
    pub hp: Option<i32>,
    pub retreat_cost: Option<i32>,
    pub format_legal: bool,
    pub competitive_tier: Option<CompetitiveTier>,
    pub image_url: Option<String>,
    /// Star rating for clients: competitive 3, playable 2, anything else 1.
    #[serde(rename = "competitiveRating")]
    pub competitive_rating: u8,
    pub images: CardImages,
    pub set: SetView,
}

impl CardView {
    /// Recompute the derived blocks from the retained base fields.
    /// `view.reproject() == view` holds for any projected card.
    pub fn reproject(&self) -> CardView {
        CardView {
            competitive_rating: CompetitiveTier::stars(self.competitive_tier),
            images: CardImages {
                small: self.image_url.clone(),
                large: self.image_url.clone(),
            },
            set: SetView {
                id: self.set_id.clone(),
                name: self.set_name.clone(),
                legalities: Legalities {
                    standard: legality_label(self.format_legal),
                },
            },
            ..self.clone()
        }
    }
}

/// Project a stored card into the external shape.
pub fn project(card: &Card) -> CardView {
    CardView {
        id: card.id.clone(),
        name: card.name.clone(),
        set_id: card.set_id.clone(),
        set_name: card.set_name.clone(),
        card_number: card.card_number.clone(),
        rarity: card.rarity,
        types: card.types.clone(),
        hp: card.hp,
        retreat_cost: card.retreat_cost,
        format_legal: card.format_legal,
        competitive_tier: card.competitive_tier,
        image_url: card.image_url.clone(),
        competitive_rating: CompetitiveTier::stars(card.competitive_tier),
        images: CardImages {
            small: card.image_url.clone(),
            large: card.image_url.clone(),
        },
        set: SetView {
            id: card.set_id.clone(),
            name: card.set_name.clone(),
            legalities: Legalities {
                standard: legality_label(card.format_legal),
            },
        },
    }
}

fn legality_label(format_legal: bool) -> String {
    if format_legal { "Legal" } else { "Not Legal" }.to_string()
}

/// Compact related-card row shown on the detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedCardSummary {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub relevance_score: i32,
}

/// Card detail payload: the projected card enriched with its sub-entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDetail {
    #[serde(flatten)]
    pub card: CardView,
    /// Ordered by print position.
    pub attacks: Vec<Attack>,
    pub abilities: Vec<Ability>,
    /// Up to five edges, highest stored relevance first.
    pub related_cards: Vec<RelatedCardSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_card() -> Card {
        Card::new("sv3-125", "Charizard ex", "sv3", "Obsidian Flames", "125")
            .with_rarity(Rarity::RareUltra)
            .with_types(["fire", "darkness"])
            .with_hp(330)
            .with_retreat_cost(2)
            .with_tier(CompetitiveTier::Competitive)
            .with_image("https://img.example/sv3-125.png")
    }

    #[test]
    fn test_projection_is_idempotent() {
        let view = project(&sample_card());
        assert_eq!(view.reproject(), view);

        let unrated = project(&Card::new("sv1-1", "Sprigatito", "sv1", "Scarlet & Violet", "1"));
        assert_eq!(unrated.reproject(), unrated);
    }

    #[test]
    fn test_derived_blocks() {
        let view = project(&sample_card());
        assert_eq!(view.competitive_rating, 3);
        assert_eq!(view.images.small, view.images.large);
        assert_eq!(view.set.id, "sv3");
        assert_eq!(view.set.legalities.standard, "Legal");

        let banned = project(&sample_card().with_format_legal(false));
        assert_eq!(banned.set.legalities.standard, "Not Legal");
    }

    #[test]
    fn test_types_is_always_an_array() {
        let no_types = project(&Card::new("sv1-2", "Floragato", "sv1", "Scarlet & Violet", "2"));
        let json = serde_json::to_value(&no_types).unwrap();
        assert_eq!(json["types"], serde_json::json!([]));
    }

    #[test]
    fn test_rating_rename_on_the_wire() {
        let json = serde_json::to_value(project(&sample_card())).unwrap();
        assert_eq!(json["competitiveRating"], serde_json::json!(3));
        assert!(json.get("competitive_rating").is_none());
    }
}
