//! Shared limits for result windows and suggestion caps

/// Default page size on the browse/list surface
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Default page size on the relevance-search surface
pub const DEFAULT_SEARCH_LIMIT: usize = 60;

/// Hard ceiling on any requested page size
pub const MAX_PAGE_SIZE: usize = 250;

/// Minimum query length before autocomplete consults storage
pub const MIN_AUTOCOMPLETE_LEN: usize = 2;

/// Default autocomplete suggestion count
pub const DEFAULT_AUTOCOMPLETE_LIMIT: usize = 10;

/// Ceiling on autocomplete suggestion count
pub const MAX_AUTOCOMPLETE_LIMIT: usize = 50;

/// Related cards attached to a card detail response
pub const DETAIL_RELATED_LIMIT: usize = 5;

/// Cap on persisted-edge relationship lookups
pub const EDGE_LOOKUP_LIMIT: usize = 20;

/// Cap on deck-building suggestions per request
pub const MAX_SUGGESTIONS: usize = 15;

/// Deck size at which tech-card suggestions stop
pub const STANDARD_DECK_SIZE: i64 = 40;
