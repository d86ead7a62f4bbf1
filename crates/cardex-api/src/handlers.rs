//! HTTP endpoint handlers
//!
//! Thin adapters from route parameters to the catalog, search, and synergy
//! layers. Degradation policy varies by endpoint: filter options and search
//! suggestions always answer with static fallbacks, everything else maps
//! storage failures to a 500 with a route-specific message.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use cardex_core::limits::{
    DEFAULT_AUTOCOMPLETE_LIMIT, DETAIL_RELATED_LIMIT, MAX_AUTOCOMPLETE_LIMIT,
    MIN_AUTOCOMPLETE_LEN,
};
use cardex_core::{display_type, project, CardDetail, FilterOptions};
use cardex_search::Suggestion;
use cardex_storage::{CardStore, StorageResult};
use cardex_synergy::{suggest_for_card, RelationshipBundle, SuggestionBundle};

use crate::catalog::{run_catalog_query, ListResponse, SearchResponse};
use crate::error::ApiError;
use crate::params::{
    parse_i64, split_list, AdvancedParams, AutocompleteParams, ListParams, SuggestParams,
};
use crate::server::AppState;

/// How many top-rated card names the suggestions endpoint surfaces.
const TOP_RATED_LIMIT: usize = 20;

/// Names users search for most, served regardless of catalog contents.
const POPULAR_SEARCHES: [&str; 10] = [
    "Charizard ex",
    "Pidgeot ex",
    "Gardevoir ex",
    "Lost City",
    "Iono",
    "Professor's Research",
    "Boss's Orders",
    "Ultra Ball",
    "Rare Candy",
    "Battle VIP Pass",
];

// ─────────────────────────────────────────────────────────────────────────
// Health
// ─────────────────────────────────────────────────────────────────────────

fn health_payload(healthy: bool) -> serde_json::Value {
    serde_json::json!({
        "status": if healthy { "ok" } else { "unavailable" },
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })
}

/// `GET /api/health`
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let healthy = matches!(state.store.health_check().await, Ok(true));
    if healthy {
        Json(health_payload(true)).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(health_payload(false))).into_response()
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────

/// `GET /api/cards/search` - browse the catalog with filters and paging.
pub async fn list_cards(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let query = params.to_query();
    let page = run_catalog_query(state.store.as_ref(), &query)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch cards", e))?;
    Ok(Json(page.into()))
}

/// `GET /api/cards/:id` - full card detail with attacks, abilities, and
/// the strongest related cards.
pub async fn card_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CardDetail>, ApiError> {
    let fetch_failed = |e| ApiError::internal("Failed to fetch card", e);

    let card = state
        .store
        .get_card(&id)
        .await
        .map_err(fetch_failed)?
        .ok_or_else(|| ApiError::not_found("Card not found"))?;

    let attacks = state.store.attacks_for(&id).await.map_err(fetch_failed)?;
    let abilities = state.store.abilities_for(&id).await.map_err(fetch_failed)?;
    let related_cards = state
        .store
        .related_for(&id, DETAIL_RELATED_LIMIT)
        .await
        .map_err(fetch_failed)?;

    Ok(Json(CardDetail {
        card: project(&card),
        attacks,
        abilities,
        related_cards,
    }))
}

async fn load_filter_options(store: &dyn CardStore) -> StorageResult<FilterOptions> {
    Ok(FilterOptions {
        types: store
            .distinct_types()
            .await?
            .iter()
            .map(|t| display_type(t))
            .collect(),
        rarities: store.distinct_rarities().await?,
        sets: store.distinct_sets().await?,
    })
}

/// `GET /api/cards/filters` - available filter choices. Never fails: the
/// static fallback keeps the filter sidebar usable without storage.
pub async fn filter_options(State(state): State<Arc<AppState>>) -> Json<FilterOptions> {
    match load_filter_options(state.store.as_ref()).await {
        Ok(options) => Json(options),
        Err(e) => {
            tracing::warn!(error = %e, "Filter options unavailable, serving fallback");
            Json(FilterOptions::fallback())
        }
    }
}

/// `GET /api/cards/meta/types`
pub async fn meta_types(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    let types = state
        .store
        .distinct_types()
        .await
        .map_err(|e| ApiError::internal("Failed to fetch card types", e))?;
    Ok(Json(types))
}

/// `GET /api/cards/meta/rarities`
pub async fn meta_rarities(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    let rarities = state
        .store
        .distinct_rarities()
        .await
        .map_err(|e| ApiError::internal("Failed to fetch rarities", e))?;
    Ok(Json(rarities))
}

/// Set row on the meta endpoint; keeps the stored column names.
#[derive(Debug, Serialize)]
pub struct MetaSet {
    pub set_id: String,
    pub set_name: String,
}

/// `GET /api/cards/meta/sets`
pub async fn meta_sets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MetaSet>>, ApiError> {
    let sets = state
        .store
        .distinct_sets()
        .await
        .map_err(|e| ApiError::internal("Failed to fetch sets", e))?;
    Ok(Json(
        sets.into_iter()
            .map(|s| MetaSet {
                set_id: s.id,
                set_name: s.name,
            })
            .collect(),
    ))
}

// ─────────────────────────────────────────────────────────────────────────
// Search
// ─────────────────────────────────────────────────────────────────────────

/// Autocomplete envelope. The echoed query is omitted when the input was
/// too short to rank.
#[derive(Debug, Serialize)]
pub struct AutocompleteResponse {
    pub suggestions: Vec<Suggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// `GET /api/search/autocomplete` - type-ahead over card names.
pub async fn autocomplete(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AutocompleteParams>,
) -> Result<Json<AutocompleteResponse>, ApiError> {
    let q = params.q.as_deref().unwrap_or("");
    if q.chars().count() < MIN_AUTOCOMPLETE_LEN {
        return Ok(Json(AutocompleteResponse {
            suggestions: Vec::new(),
            query: None,
        }));
    }

    let limit = parse_i64(params.limit.as_deref())
        .filter(|l| *l > 0)
        .map(|l| l as usize)
        .unwrap_or(DEFAULT_AUTOCOMPLETE_LIMIT)
        .min(MAX_AUTOCOMPLETE_LIMIT);

    let candidates = state
        .store
        .autocomplete_candidates()
        .await
        .map_err(|e| ApiError::internal("Search service unavailable", e))?;
    let suggestions = state.engine.suggest(q, &candidates, limit);

    Ok(Json(AutocompleteResponse {
        suggestions,
        query: Some(q.to_string()),
    }))
}

/// `GET /api/search/advanced` - multi-criteria search ranked by relevance.
pub async fn advanced_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AdvancedParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params.to_query();
    let page = run_catalog_query(state.store.as_ref(), &query)
        .await
        .map_err(|e| ApiError::internal("Search failed", e))?;
    Ok(Json(SearchResponse {
        cards: page.cards,
        pagination: page.meta,
        search_criteria: params.criteria(),
    }))
}

/// `GET /api/search/suggestions` - discovery payload for an empty search
/// box. Never fails: a static payload stands in when storage is down.
pub async fn search_suggestions(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    match state.store.top_rated_names(TOP_RATED_LIMIT).await {
        Ok(competitive) => Json(serde_json::json!({
            "popular": POPULAR_SEARCHES,
            "competitive": competitive,
            "recent_sets": ["Obsidian Flames", "Paldea Evolved", "Scarlet & Violet"],
            "card_types": ["Pokemon", "Trainer", "Energy"],
            "search_tips": [
                "Search by card name (e.g., \"Charizard\")",
                "Search by ability text (e.g., \"draw cards\")",
                "Filter by HP range (e.g., \"130+ HP\")",
                "Find cards by type (e.g., \"Fire type\")",
            ],
        })),
        Err(e) => {
            tracing::warn!(error = %e, "Search suggestions degraded to static payload");
            Json(serde_json::json!({
                "popular": ["Charizard ex", "Pidgeot ex", "Iono"],
                "competitive": [],
                "recent_sets": ["Obsidian Flames", "Paldea Evolved"],
                "card_types": ["Pokemon", "Trainer", "Energy"],
                "search_tips": ["Search by card name or text"],
            }))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Relationships
// ─────────────────────────────────────────────────────────────────────────

/// `GET /api/relationships/:cardName` - curated or cataloged partner cards.
pub async fn relationships(
    State(state): State<Arc<AppState>>,
    Path(card_name): Path<String>,
) -> Result<Json<RelationshipBundle>, ApiError> {
    let bundle = state
        .resolver
        .relationships(state.store.as_ref(), &card_name)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch card relationships", e))?;
    Ok(Json(bundle))
}

/// `GET /api/relationships/suggest/:cardId` - deck-building suggestions
/// for a card, filtered against the deck under construction.
pub async fn deck_suggestions(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<String>,
    Query(params): Query<SuggestParams>,
) -> Result<Json<SuggestionBundle>, ApiError> {
    let card = state
        .store
        .get_card(&card_id)
        .await
        .map_err(|e| ApiError::internal("Failed to generate suggestions", e))?
        .ok_or_else(|| ApiError::not_found("Card not found"))?;

    let existing = split_list(params.existing_cards.as_deref());
    let deck_size = parse_i64(params.deck_size.as_deref()).unwrap_or(0);

    Ok(Json(suggest_for_card(
        state.resolver.knowledge(),
        &card,
        &existing,
        deck_size,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cardex_core::{
        Ability, Attack, Card, CardQuery, CardSummary, CompetitiveTier, RelatedCardSummary,
        RelatedEdge, SetOption,
    };
    use cardex_storage::{MemoryStore, StorageError};
    use cardex_synergy::SynergyKnowledge;

    struct FailingStore;

    fn down<T>() -> StorageResult<T> {
        Err(StorageError::Database("connection refused".to_string()))
    }

    #[async_trait]
    impl CardStore for FailingStore {
        async fn health_check(&self) -> StorageResult<bool> {
            down()
        }
        async fn list_cards(&self, _query: &CardQuery) -> StorageResult<(Vec<Card>, usize)> {
            down()
        }
        async fn get_card(&self, _id: &str) -> StorageResult<Option<Card>> {
            down()
        }
        async fn attacks_for(&self, _card_id: &str) -> StorageResult<Vec<Attack>> {
            down()
        }
        async fn abilities_for(&self, _card_id: &str) -> StorageResult<Vec<Ability>> {
            down()
        }
        async fn related_for(
            &self,
            _card_id: &str,
            _limit: usize,
        ) -> StorageResult<Vec<RelatedCardSummary>> {
            down()
        }
        async fn autocomplete_candidates(&self) -> StorageResult<Vec<CardSummary>> {
            down()
        }
        async fn distinct_types(&self) -> StorageResult<Vec<String>> {
            down()
        }
        async fn distinct_rarities(&self) -> StorageResult<Vec<String>> {
            down()
        }
        async fn distinct_sets(&self) -> StorageResult<Vec<SetOption>> {
            down()
        }
        async fn legal_cards_by_names(&self, _names: &[String]) -> StorageResult<Vec<Card>> {
            down()
        }
        async fn related_by_source_name(
            &self,
            _fragment: &str,
            _limit: usize,
        ) -> StorageResult<Vec<(Card, i32)>> {
            down()
        }
        async fn top_rated_names(&self, _limit: usize) -> StorageResult<Vec<String>> {
            down()
        }
        async fn upsert_card(&self, _card: &Card) -> StorageResult<()> {
            down()
        }
        async fn replace_attacks(
            &self,
            _card_id: &str,
            _attacks: &[Attack],
        ) -> StorageResult<()> {
            down()
        }
        async fn replace_abilities(
            &self,
            _card_id: &str,
            _abilities: &[Ability],
        ) -> StorageResult<()> {
            down()
        }
        async fn add_related(&self, _edge: &RelatedEdge) -> StorageResult<()> {
            down()
        }
    }

    fn state_with(store: Arc<dyn CardStore>) -> Arc<AppState> {
        Arc::new(AppState::new(
            store,
            Arc::new(SynergyKnowledge::builtin()),
        ))
    }

    async fn seeded_state() -> Arc<AppState> {
        let store = MemoryStore::new();

        let fire_hp = [330, 230, 180, 120, 60, 30];
        for (i, hp) in fire_hp.iter().enumerate() {
            let card = Card::new(
                format!("sv3-{}", i + 1),
                format!("Fire Pokemon {}", i + 1),
                "sv3",
                "Obsidian Flames",
                format!("{}", i + 1),
            )
            .with_types(["fire"])
            .with_hp(*hp);
            store.upsert_card(&card).await.unwrap();
        }
        store
            .upsert_card(
                &Card::new("sv3-90", "Rotated Flame", "sv3", "Obsidian Flames", "90")
                    .with_types(["fire"])
                    .with_hp(300)
                    .with_format_legal(false),
            )
            .await
            .unwrap();
        store
            .upsert_card(
                &Card::new("sv1-50", "Water Pokemon", "sv1", "Scarlet & Violet", "50")
                    .with_types(["water"])
                    .with_hp(120),
            )
            .await
            .unwrap();
        store
            .upsert_card(
                &Card::new("sv3-125", "Charizard ex", "sv3", "Obsidian Flames", "125")
                    .with_types(["fire"])
                    .with_hp(330)
                    .with_tier(CompetitiveTier::Competitive),
            )
            .await
            .unwrap();

        store
            .replace_attacks(
                "sv3-125",
                &[Attack::new("sv3-125", 0, "Burning Darkness")
                    .with_cost(["fire", "fire"])
                    .with_damage("180+")],
            )
            .await
            .unwrap();
        store
            .replace_abilities(
                "sv3-125",
                &[Ability::new("sv3-125", "Infernal Reign")
                    .with_effect("Attach up to 3 Basic Fire Energy")],
            )
            .await
            .unwrap();
        store
            .add_related(&RelatedEdge::new("sv3-125", "sv3-1", 9))
            .await
            .unwrap();
        store
            .add_related(&RelatedEdge::new("sv3-125", "sv3-2", 7))
            .await
            .unwrap();

        state_with(Arc::new(store))
    }

    #[tokio::test]
    async fn test_health_reports_status() {
        let response = health(State(seeded_state().await)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = health(State(state_with(Arc::new(FailingStore)))).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_health_payload_shape() {
        let payload = health_payload(true);
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["version"], env!("CARGO_PKG_VERSION"));
        assert!(chrono::DateTime::parse_from_rfc3339(
            payload["timestamp"].as_str().unwrap()
        )
        .is_ok());

        assert_eq!(health_payload(false)["status"], "unavailable");
    }

    #[tokio::test]
    async fn test_list_cards_filters_sorts_and_pages() {
        let state = seeded_state().await;
        let params = ListParams {
            r#type: Some("fire".to_string()),
            sort_by: Some("hp".to_string()),
            sort_order: Some("desc".to_string()),
            limit: Some("5".to_string()),
            ..Default::default()
        };

        let Json(response) = list_cards(State(state), Query(params)).await.unwrap();
        // Six legal fire cards plus Charizard ex; the rotated printing is
        // invisible.
        assert_eq!(response.total_count, 7);
        assert_eq!(response.page, 1);
        assert_eq!(response.page_size, 5);
        assert_eq!(response.cards.len(), 5);
        let hp: Vec<_> = response.cards.iter().map(|c| c.hp.unwrap()).collect();
        assert_eq!(hp, [330, 330, 230, 180, 120]);
        assert!(response.cards.iter().all(|c| c.format_legal));
    }

    #[tokio::test]
    async fn test_card_detail_includes_sub_entities() {
        let state = seeded_state().await;
        let Json(detail) = card_detail(State(state), Path("sv3-125".to_string()))
            .await
            .unwrap();

        assert_eq!(detail.card.name, "Charizard ex");
        assert_eq!(detail.attacks.len(), 1);
        assert_eq!(detail.attacks[0].name, "Burning Darkness");
        assert_eq!(detail.abilities[0].name, "Infernal Reign");
        let scores: Vec<_> = detail
            .related_cards
            .iter()
            .map(|r| r.relevance_score)
            .collect();
        assert_eq!(scores, [9, 7]);

        // The detail payload flattens the card fields.
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["id"], "sv3-125");
        assert_eq!(value["competitiveRating"], 3);
        assert_eq!(value["attacks"][0]["damage"], "180+");
    }

    #[tokio::test]
    async fn test_card_detail_unknown_id_is_404() {
        let state = seeded_state().await;
        let err = card_detail(State(state), Path("sv9-999".to_string()))
            .await
            .unwrap_err();
        match err {
            ApiError::NotFound { message } => assert_eq!(message, "Card not found"),
            other => panic!("expected 404, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_filter_options_fall_back_when_storage_is_down() {
        let Json(options) = filter_options(State(state_with(Arc::new(FailingStore)))).await;
        assert_eq!(options, FilterOptions::fallback());

        let Json(live) = filter_options(State(seeded_state().await)).await;
        assert!(live.types.contains(&"Fire".to_string()));
        assert!(live.sets.iter().any(|s| s.id == "sv3"));
    }

    #[tokio::test]
    async fn test_meta_sets_wire_shape() {
        let state = seeded_state().await;
        let Json(sets) = meta_sets(State(state)).await.unwrap();
        let value = serde_json::to_value(&sets).unwrap();
        let row = value
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["set_id"] == "sv3")
            .unwrap()
            .clone();
        assert_eq!(row["set_name"], "Obsidian Flames");

        let err = meta_sets(State(state_with(Arc::new(FailingStore))))
            .await
            .unwrap_err();
        match err {
            ApiError::Internal { message, .. } => assert_eq!(message, "Failed to fetch sets"),
            other => panic!("expected 500, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_autocomplete_gates_short_queries() {
        let state = seeded_state().await;
        let short = AutocompleteParams {
            q: Some("c".to_string()),
            limit: None,
        };
        let Json(response) = autocomplete(State(state.clone()), Query(short))
            .await
            .unwrap();
        assert!(response.suggestions.is_empty());
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("query").is_none());

        let params = AutocompleteParams {
            q: Some("chari".to_string()),
            limit: Some("junk".to_string()),
        };
        let Json(response) = autocomplete(State(state), Query(params)).await.unwrap();
        assert_eq!(response.query.as_deref(), Some("chari"));
        assert_eq!(response.suggestions[0].name, "Charizard ex");
    }

    #[tokio::test]
    async fn test_autocomplete_storage_failure_is_500() {
        let params = AutocompleteParams {
            q: Some("chari".to_string()),
            limit: None,
        };
        let err = autocomplete(State(state_with(Arc::new(FailingStore))), Query(params))
            .await
            .unwrap_err();
        match err {
            ApiError::Internal { message, .. } => {
                assert_eq!(message, "Search service unavailable");
            }
            other => panic!("expected 500, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_advanced_search_echoes_criteria() {
        let state = seeded_state().await;
        let params = AdvancedParams {
            name: Some("Charizard".to_string()),
            hp_min: Some("300".to_string()),
            ..Default::default()
        };

        let Json(response) = advanced_search(State(state), Query(params)).await.unwrap();
        assert_eq!(response.cards.len(), 1);
        assert_eq!(response.cards[0].name, "Charizard ex");
        assert_eq!(response.pagination.total, 1);

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["search_criteria"]["name"], "Charizard");
        assert_eq!(value["search_criteria"]["hp_min"], "300");
        assert!(value["search_criteria"].get("text").is_none());
    }

    #[tokio::test]
    async fn test_search_suggestions_degrade_statically() {
        let Json(live) = search_suggestions(State(seeded_state().await)).await;
        assert_eq!(live["popular"].as_array().unwrap().len(), 10);
        assert_eq!(live["competitive"][0], "Charizard ex");
        assert_eq!(
            live["card_types"],
            serde_json::json!(["Pokemon", "Trainer", "Energy"])
        );

        let Json(degraded) = search_suggestions(State(state_with(Arc::new(FailingStore)))).await;
        assert_eq!(
            degraded["popular"],
            serde_json::json!(["Charizard ex", "Pidgeot ex", "Iono"])
        );
        assert_eq!(degraded["competitive"], serde_json::json!([]));
        assert_eq!(
            degraded["search_tips"],
            serde_json::json!(["Search by card name or text"])
        );
    }

    #[tokio::test]
    async fn test_relationships_unknown_name_is_not_an_error() {
        let state = seeded_state().await;
        let Json(bundle) = relationships(State(state), Path("Snorlax".to_string()))
            .await
            .unwrap();
        assert!(bundle.related_cards.is_empty());
        assert_eq!(
            bundle.message.as_deref(),
            Some("No specific relationships found for this card")
        );
    }

    #[tokio::test]
    async fn test_deck_suggestions_respect_deck_state() {
        let state = seeded_state().await;

        let err = deck_suggestions(
            State(state.clone()),
            Path("sv9-999".to_string()),
            Query(SuggestParams::default()),
        )
        .await
        .unwrap_err();
        match err {
            ApiError::NotFound { message } => assert_eq!(message, "Card not found"),
            other => panic!("expected 404, got {other:?}"),
        }

        let params = SuggestParams {
            existing_cards: Some("Pidgeot ex, Rare Candy".to_string()),
            deck_size: Some("40".to_string()),
        };
        let Json(bundle) =
            deck_suggestions(State(state), Path("sv3-125".to_string()), Query(params))
                .await
                .unwrap();
        assert_eq!(bundle.card, "Charizard ex");
        assert_eq!(bundle.archetype.as_deref(), Some("Charizard ex"));
        let names: Vec<_> = bundle
            .suggestions
            .iter()
            .map(|s| s.card_name.as_str())
            .collect();
        assert!(!names.contains(&"Pidgeot ex"));
        assert!(!names.contains(&"Rare Candy"));
        // A full deck drops the tech tier entirely.
        assert!(!names.contains(&"Lost Vacuum"));
    }
}
