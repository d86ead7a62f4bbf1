//! Query parameter parsing
//!
//! Every parameter deserializes as an optional string and is parsed
//! permissively afterwards: malformed numbers and unknown labels are
//! treated as absent instead of rejecting the request.

use serde::{Deserialize, Serialize};

use cardex_core::limits::{DEFAULT_LIST_LIMIT, DEFAULT_SEARCH_LIMIT};
use cardex_core::{CardQuery, CompetitiveTier, PageRequest, Rarity, SortDir, SortKey, TextScope};

/// Parse an integer, treating junk as absent.
pub(crate) fn parse_i64(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse::<i64>().ok())
}

/// True only for an explicit `true` flag.
pub(crate) fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Split a comma-separated list, dropping blanks.
pub(crate) fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// A singular parameter merged with its comma-separated plural form.
fn merged(single: Option<&str>, plural: Option<&str>) -> Vec<String> {
    let mut values = split_list(single);
    values.extend(split_list(plural));
    values
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parameters for the browse/list surface (`/api/cards/search`).
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub r#type: Option<String>,
    pub types: Option<String>,
    pub rarity: Option<String>,
    pub rarities: Option<String>,
    pub set: Option<String>,
    pub sets: Option<String>,
    pub hp_min: Option<String>,
    pub hp_max: Option<String>,
    pub retreat_max: Option<String>,
    pub competitive_rating: Option<String>,
    pub has_ability: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListParams {
    /// Compile into a catalog query. Name-only text matching, name-ascending
    /// default sort, page/limit windowing.
    pub fn to_query(&self) -> CardQuery {
        let mut query = CardQuery::new().with_text_scope(TextScope::Name);

        if let Some(text) = trimmed(self.search.as_deref()) {
            query = query.with_text(text);
        }
        for tag in merged(self.r#type.as_deref(), self.types.as_deref()) {
            query = query.with_type(tag);
        }
        for label in merged(self.rarity.as_deref(), self.rarities.as_deref()) {
            if let Ok(rarity) = label.parse::<Rarity>() {
                query = query.with_rarity(rarity);
            }
        }
        for set_id in merged(self.set.as_deref(), self.sets.as_deref()) {
            query = query.with_set(set_id);
        }
        if let Some(hp) = parse_i64(self.hp_min.as_deref()) {
            query = query.with_hp_min(hp);
        }
        if let Some(hp) = parse_i64(self.hp_max.as_deref()) {
            query = query.with_hp_max(hp);
        }
        if let Some(cost) = parse_i64(self.retreat_max.as_deref()) {
            query = query.with_retreat_max(cost);
        }
        if let Some(tier) = self
            .competitive_rating
            .as_deref()
            .and_then(|t| t.trim().parse::<CompetitiveTier>().ok())
        {
            query = query.with_tier(tier);
        }
        if parse_flag(self.has_ability.as_deref()) {
            query = query.require_ability();
        }

        let sort = self
            .sort_by
            .as_deref()
            .and_then(SortKey::parse)
            .unwrap_or(SortKey::Name);
        let dir = self
            .sort_order
            .as_deref()
            .and_then(SortDir::parse)
            .unwrap_or(SortDir::Asc);

        let page = parse_i64(self.page.as_deref()).unwrap_or(1);
        let limit = parse_i64(self.limit.as_deref()).unwrap_or(0);

        query
            .sort_by(sort, dir)
            .with_page(PageRequest::from_page(page, limit, DEFAULT_LIST_LIMIT))
    }
}

/// Parameters for the relevance-search surface (`/api/search/advanced`).
#[derive(Debug, Default, Deserialize)]
pub struct AdvancedParams {
    pub name: Option<String>,
    pub text: Option<String>,
    pub hp_min: Option<String>,
    pub hp_max: Option<String>,
    pub retreat_max: Option<String>,
    pub set: Option<String>,
    pub r#type: Option<String>,
    pub rarity: Option<String>,
    pub competitive_rating: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl AdvancedParams {
    /// Compile into a catalog query. Text reaches attack and ability text,
    /// relevance-descending default sort, offset/limit windowing.
    pub fn to_query(&self) -> CardQuery {
        let mut query = CardQuery::new().with_text_scope(TextScope::Full);

        let text = trimmed(self.name.as_deref()).or(trimmed(self.text.as_deref()));
        if let Some(text) = text {
            query = query.with_text(text);
        }
        if let Some(tag) = trimmed(self.r#type.as_deref()) {
            query = query.with_type(tag);
        }
        if let Some(rarity) = self
            .rarity
            .as_deref()
            .and_then(|r| r.trim().parse::<Rarity>().ok())
        {
            query = query.with_rarity(rarity);
        }
        if let Some(set_id) = trimmed(self.set.as_deref()) {
            query = query.with_set(set_id);
        }
        if let Some(hp) = parse_i64(self.hp_min.as_deref()) {
            query = query.with_hp_min(hp);
        }
        if let Some(hp) = parse_i64(self.hp_max.as_deref()) {
            query = query.with_hp_max(hp);
        }
        if let Some(cost) = parse_i64(self.retreat_max.as_deref()) {
            query = query.with_retreat_max(cost);
        }
        if let Some(tier) = self
            .competitive_rating
            .as_deref()
            .and_then(|t| t.trim().parse::<CompetitiveTier>().ok())
        {
            query = query.with_tier(tier);
        }

        let sort = self
            .sort
            .as_deref()
            .and_then(SortKey::parse)
            .unwrap_or(SortKey::Relevance);
        let dir = self
            .order
            .as_deref()
            .and_then(SortDir::parse)
            .unwrap_or(SortDir::Desc);

        let offset = parse_i64(self.offset.as_deref()).unwrap_or(0);
        let limit = parse_i64(self.limit.as_deref()).unwrap_or(0);

        query
            .sort_by(sort, dir)
            .with_page(PageRequest::from_offset(offset, limit, DEFAULT_SEARCH_LIMIT))
    }

    /// Echo of the given criteria, absent parameters omitted.
    pub fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            name: self.name.clone(),
            text: self.text.clone(),
            hp_min: self.hp_min.clone(),
            hp_max: self.hp_max.clone(),
            retreat_max: self.retreat_max.clone(),
            set: self.set.clone(),
            r#type: self.r#type.clone(),
            rarity: self.rarity.clone(),
            competitive_rating: self.competitive_rating.clone(),
        }
    }
}

/// Raw criteria echoed back on the advanced-search response.
#[derive(Debug, Clone, Serialize)]
pub struct SearchCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hp_min: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hp_max: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retreat_max: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitive_rating: Option<String>,
}

/// Parameters for `/api/search/autocomplete`.
#[derive(Debug, Default, Deserialize)]
pub struct AutocompleteParams {
    pub q: Option<String>,
    pub limit: Option<String>,
}

/// Parameters for `/api/relationships/suggest/:cardId`.
#[derive(Debug, Default, Deserialize)]
pub struct SuggestParams {
    pub existing_cards: Option<String>,
    pub deck_size: Option<String>,
}
