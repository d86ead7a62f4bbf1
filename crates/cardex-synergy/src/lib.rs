//! Cardex Synergy - curated relationship and deck-building intelligence
//!
//! Resolves related cards from a curated knowledge base with a
//! persisted-edge fallback, and generates prioritized deck-building
//! suggestions from archetype and staple tables.

pub mod error;
pub mod knowledge;
pub mod resolver;
pub mod suggest;

pub use error::{SynergyError, SynergyResult};
pub use knowledge::{Archetype, SynergyKnowledge};
pub use resolver::{
    RelatedCard, RelationSource, RelationshipBundle, RelationshipCategory, SynergyResolver,
};
pub use suggest::{
    suggest_for_card, DeckSuggestion, SuggestionBundle, SuggestionCategory, SuggestionPriority,
};
