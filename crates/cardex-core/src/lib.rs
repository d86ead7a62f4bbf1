//! Cardex Core - domain model for the card catalog
//!
//! This crate provides the card data types, the filter/sort query model,
//! pagination math, and the external card projection shared by the rest of
//! the Cardex services.

pub mod card;
pub mod error;
pub mod filters;
pub mod limits;
pub mod pagination;
pub mod projection;
pub mod query;

pub use card::{
    canonical_type, Ability, Attack, Card, CardSummary, CompetitiveTier, Rarity, RelatedEdge,
    TYPE_TAGS,
};
pub use error::{Error, Result};
pub use filters::{display_type, FilterOptions, SetOption};
pub use pagination::{PageMeta, PageRequest};
pub use projection::{
    project, CardDetail, CardImages, CardView, Legalities, RelatedCardSummary, SetView,
};
pub use query::{CardQuery, Field, Predicate, Scalar, SortDir, SortKey, TextScope};
