//! Deck-building suggestions
//!
//! Turns archetype membership and staple tables into a prioritized,
//! deduplicated suggestion list for a card the user is building around.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use cardex_core::limits::{MAX_SUGGESTIONS, STANDARD_DECK_SIZE};
use cardex_core::Card;

use crate::knowledge::{Archetype, SynergyKnowledge};

/// Where a suggested card slots into the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionCategory {
    Core,
    Support,
    Tech,
    Staple,
}

impl SuggestionCategory {
    fn priority(self) -> SuggestionPriority {
        match self {
            Self::Core => SuggestionPriority::High,
            Self::Support => SuggestionPriority::Medium,
            Self::Tech | Self::Staple => SuggestionPriority::Low,
        }
    }
}

/// How urgently a suggestion should be picked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionPriority {
    High,
    Medium,
    Low,
}

/// One suggested addition to a deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckSuggestion {
    pub card_name: String,
    pub category: SuggestionCategory,
    pub priority: SuggestionPriority,
}

/// Suggestion response for one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionBundle {
    pub card: String,
    pub archetype: Option<String>,
    pub suggestions: Vec<DeckSuggestion>,
    pub deck_building_tips: Vec<String>,
}

/// Build deck suggestions for `card`.
///
/// Archetype tiers come first (core, then support, then tech while the deck
/// is still under [`STANDARD_DECK_SIZE`]), followed by staples for the
/// card's first type and the universal staples. Names already in `existing`
/// are dropped, duplicates keep their first occurrence, and the final list
/// is capped at [`MAX_SUGGESTIONS`].
pub fn suggest_for_card(
    knowledge: &SynergyKnowledge,
    card: &Card,
    existing: &[String],
    deck_size: i64,
) -> SuggestionBundle {
    let archetype = knowledge.archetype_for(&card.name);

    let mut candidates: Vec<(&str, SuggestionCategory)> = Vec::new();
    if let Some(archetype) = archetype {
        push_tier(&mut candidates, &archetype.core, SuggestionCategory::Core);
        push_tier(&mut candidates, &archetype.support, SuggestionCategory::Support);
        if deck_size < STANDARD_DECK_SIZE {
            push_tier(&mut candidates, &archetype.tech, SuggestionCategory::Tech);
        }
    }
    if let Some(first_type) = card.types.first() {
        push_tier(
            &mut candidates,
            knowledge.staples_for_type(first_type),
            SuggestionCategory::Staple,
        );
    }
    push_tier(
        &mut candidates,
        knowledge.universal_staples(),
        SuggestionCategory::Staple,
    );

    let mut seen = HashSet::new();
    let mut suggestions = Vec::new();
    for (name, category) in candidates {
        if existing.iter().any(|e| e == name) || !seen.insert(name) {
            continue;
        }
        suggestions.push(DeckSuggestion {
            card_name: name.to_string(),
            category,
            priority: category.priority(),
        });
        if suggestions.len() == MAX_SUGGESTIONS {
            break;
        }
    }

    SuggestionBundle {
        card: card.name.clone(),
        archetype: archetype.map(|a| a.label.clone()),
        suggestions,
        deck_building_tips: deck_building_tips(&card.name, archetype),
    }
}

fn push_tier<'a>(
    out: &mut Vec<(&'a str, SuggestionCategory)>,
    names: &'a [String],
    category: SuggestionCategory,
) {
    out.extend(names.iter().map(|n| (n.as_str(), category)));
}

fn deck_building_tips(card_name: &str, archetype: Option<&Archetype>) -> Vec<String> {
    let mut tips = Vec::new();
    if let Some(archetype) = archetype {
        tips.push(format!(
            "This card is a key part of the {} archetype",
            archetype.label
        ));
        tips.push("Focus on consistency with 4 copies of core cards".to_string());
    }
    if card_name.ends_with(" ex") || card_name.ends_with(" VSTAR") {
        tips.push("Consider including healing and protection cards".to_string());
        tips.push("Balance between attackers and support Pokemon".to_string());
    }
    tips.push("Include 10-15 draw/search trainers for consistency".to_string());
    tips.push("Add 2-4 switching cards for mobility".to_string());
    tips
}
