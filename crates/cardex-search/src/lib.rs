//! Cardex Search - autocomplete ranking for the card catalog
//!
//! Ranks pre-fetched catalog candidates for the type-ahead endpoint:
//! prefix matches, then substring matches, then fuzzy matches (nucleo,
//! behind the default `fuzzy` feature).

pub mod autocomplete;

pub use autocomplete::{AutocompleteEngine, Suggestion};
