//! Shared catalog listing pipeline
//!
//! Browse and advanced search are two parameter dialects over the same
//! operation: compile a [`CardQuery`], run it against the store, project
//! the rows. Only the response envelope differs.

use serde::Serialize;

use cardex_core::{project, CardQuery, CardView, PageMeta};
use cardex_storage::{CardStore, StorageResult};

use crate::params::SearchCriteria;

/// One projected result window plus the metadata for the full set.
#[derive(Debug)]
pub struct CatalogPage {
    pub cards: Vec<CardView>,
    pub meta: PageMeta,
}

/// Run a compiled query and project the rows. The count and the rows come
/// from the same predicate set, so `meta.total` always agrees with what a
/// wider window would return.
pub async fn run_catalog_query(
    store: &dyn CardStore,
    query: &CardQuery,
) -> StorageResult<CatalogPage> {
    let (cards, total) = store.list_cards(query).await?;
    Ok(CatalogPage {
        cards: cards.iter().map(project).collect(),
        meta: PageMeta::new(total, query.page),
    })
}

/// Browse envelope: 1-based page number and page size.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub cards: Vec<CardView>,
    #[serde(rename = "totalCount")]
    pub total_count: usize,
    pub page: usize,
    #[serde(rename = "pageSize")]
    pub page_size: usize,
}

impl From<CatalogPage> for ListResponse {
    fn from(page: CatalogPage) -> Self {
        Self {
            total_count: page.meta.total,
            page: page.meta.page(),
            page_size: page.meta.limit,
            cards: page.cards,
        }
    }
}

/// Search envelope: offset-based pagination block plus an echo of the
/// criteria as given.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub cards: Vec<CardView>,
    pub pagination: PageMeta,
    pub search_criteria: SearchCriteria,
}
