//! In-memory card store for testing

use crate::error::{StorageError, StorageResult};
use crate::traits::CardStore;
use async_trait::async_trait;
use cardex_core::{
    Ability, Attack, Card, CardQuery, CardSummary, CompetitiveTier, Field, Predicate,
    RelatedCardSummary, RelatedEdge, Scalar, SetOption, SortDir, SortKey,
};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

/// In-memory card store
///
/// Evaluates the same predicate list the SQLite backend renders to SQL,
/// which makes it the reference implementation for query semantics in
/// tests, and a zero-setup backend for demos.
pub struct MemoryStore {
    cards: RwLock<HashMap<String, Card>>,
    attacks: RwLock<HashMap<String, Vec<Attack>>>,
    abilities: RwLock<HashMap<String, Vec<Ability>>>,
    edges: RwLock<Vec<RelatedEdge>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            cards: RwLock::new(HashMap::new()),
            attacks: RwLock::new(HashMap::new()),
            abilities: RwLock::new(HashMap::new()),
            edges: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Leading-digits integer, the way SQLite casts text card numbers.
fn leading_int(s: &str) -> i64 {
    let digits: String = s.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

fn relevance_of(card: &Card, attacks: &[Attack], abilities: &[Ability], text: &str) -> i64 {
    let mut score = 0;
    if contains_ci(&card.name, text) {
        score += 10;
    }
    if attacks
        .iter()
        .any(|a| a.effect.as_deref().is_some_and(|e| contains_ci(e, text)))
    {
        score += 5;
    }
    if abilities
        .iter()
        .any(|a| a.effect.as_deref().is_some_and(|e| contains_ci(e, text)))
    {
        score += 5;
    }
    score
}

fn eval(pred: &Predicate, card: &Card, attacks: &[Attack], abilities: &[Ability]) -> bool {
    match pred {
        Predicate::Eq(Field::FormatLegal, Scalar::Bool(legal)) => card.format_legal == *legal,
        Predicate::Eq(Field::CompetitiveTier, Scalar::Text(tier)) => card
            .competitive_tier
            .is_some_and(|t| t.as_str() == tier.as_str()),
        Predicate::Eq(..) => false,
        Predicate::InSet(Field::Rarity, values) => card.rarity.is_some_and(|r| {
            values
                .iter()
                .any(|v| matches!(v, Scalar::Text(label) if label == r.as_str()))
        }),
        Predicate::InSet(Field::SetId, values) => values
            .iter()
            .any(|v| matches!(v, Scalar::Text(id) if *id == card.set_id)),
        Predicate::InSet(..) => false,
        Predicate::Range { field, min, max } => {
            let value = match field {
                Field::Hp => card.hp,
                Field::RetreatCost => card.retreat_cost,
                _ => None,
            };
            // A missing value never satisfies a bounded range.
            match value {
                Some(v) => {
                    let v = i64::from(v);
                    min.map_or(true, |m| v >= m) && max.map_or(true, |m| v <= m)
                }
                None => false,
            }
        }
        Predicate::ContainsText(Field::Name, text) => contains_ci(&card.name, text),
        Predicate::ContainsText(..) => false,
        Predicate::MatchesAnyText(text) => relevance_of(card, attacks, abilities, text) > 0,
        Predicate::HasAbility => !abilities.is_empty(),
        Predicate::HasAnyType(tags) => card.types.iter().any(|t| tags.contains(t)),
    }
}

fn rarity_rank(card: &Card) -> i64 {
    card.rarity.map(|r| r.sort_rank()).unwrap_or(9)
}

fn name_key(card: &Card) -> String {
    card.name.to_lowercase()
}

fn directed(ordering: Ordering, dir: SortDir) -> Ordering {
    match dir {
        SortDir::Asc => ordering,
        SortDir::Desc => ordering.reverse(),
    }
}

/// Ordering mirror of the SQL sort table: rank sorts keep an ascending
/// name tiebreak, nullable numerics sort missing values last, and
/// relevance ordering is fixed regardless of the requested direction.
fn compare(a: &(Card, i64), b: &(Card, i64), sort: SortKey, dir: SortDir) -> Ordering {
    let (card_a, rel_a) = a;
    let (card_b, rel_b) = b;
    match sort {
        SortKey::Name => directed(name_key(card_a).cmp(&name_key(card_b)), dir),
        SortKey::CardNumber => directed(
            leading_int(&card_a.card_number).cmp(&leading_int(&card_b.card_number)),
            dir,
        ),
        SortKey::Rarity => directed(rarity_rank(card_a).cmp(&rarity_rank(card_b)), dir)
            .then_with(|| name_key(card_a).cmp(&name_key(card_b))),
        SortKey::CompetitiveRating => directed(
            CompetitiveTier::rank_or_unrated(card_a.competitive_tier)
                .cmp(&CompetitiveTier::rank_or_unrated(card_b.competitive_tier)),
            dir,
        )
        .then_with(|| name_key(card_a).cmp(&name_key(card_b))),
        SortKey::Hp => nulls_last(card_a.hp, card_b.hp, dir),
        SortKey::RetreatCost => nulls_last(card_a.retreat_cost, card_b.retreat_cost, dir),
        SortKey::Set => directed(card_a.set_id.cmp(&card_b.set_id), dir).then_with(|| {
            directed(
                leading_int(&card_a.card_number).cmp(&leading_int(&card_b.card_number)),
                dir,
            )
        }),
        SortKey::Newest => directed(card_a.created_at.cmp(&card_b.created_at), dir),
        SortKey::Relevance => rel_b
            .cmp(rel_a)
            .then_with(|| {
                CompetitiveTier::rank_or_unrated(card_a.competitive_tier)
                    .cmp(&CompetitiveTier::rank_or_unrated(card_b.competitive_tier))
            })
            .then_with(|| name_key(card_a).cmp(&name_key(card_b))),
    }
}

fn nulls_last(a: Option<i32>, b: Option<i32>, dir: SortDir) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => directed(a.cmp(&b), dir),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl CardStore for MemoryStore {
    async fn health_check(&self) -> StorageResult<bool> {
        Ok(true)
    }

    // Catalog operations

    async fn list_cards(&self, query: &CardQuery) -> StorageResult<(Vec<Card>, usize)> {
        let cards = self
            .cards
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        let attacks = self
            .attacks
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        let abilities = self
            .abilities
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;

        let preds = query.predicates();
        let search_text = preds.iter().find_map(|p| match p {
            Predicate::MatchesAnyText(text) => Some(text.clone()),
            _ => None,
        });

        let mut matched: Vec<(Card, i64)> = cards
            .values()
            .filter(|card| {
                let card_attacks = attacks.get(&card.id).map(Vec::as_slice).unwrap_or(&[]);
                let card_abilities = abilities.get(&card.id).map(Vec::as_slice).unwrap_or(&[]);
                preds
                    .iter()
                    .all(|p| eval(p, card, card_attacks, card_abilities))
            })
            .map(|card| {
                let rel = search_text
                    .as_deref()
                    .map(|text| {
                        relevance_of(
                            card,
                            attacks.get(&card.id).map(Vec::as_slice).unwrap_or(&[]),
                            abilities.get(&card.id).map(Vec::as_slice).unwrap_or(&[]),
                            text,
                        )
                    })
                    .unwrap_or(0);
                (card.clone(), rel)
            })
            .collect();

        matched.sort_by(|a, b| compare(a, b, query.sort, query.dir));

        let total = matched.len();
        let window = matched
            .into_iter()
            .skip(query.page.offset)
            .take(query.page.limit)
            .map(|(card, _)| card)
            .collect();

        Ok((window, total))
    }

    async fn get_card(&self, id: &str) -> StorageResult<Option<Card>> {
        let cards = self
            .cards
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        Ok(cards.get(id).cloned())
    }

    async fn attacks_for(&self, card_id: &str) -> StorageResult<Vec<Attack>> {
        let attacks = self
            .attacks
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        let mut rows = attacks.get(card_id).cloned().unwrap_or_default();
        rows.sort_by_key(|a| a.position);
        Ok(rows)
    }

    async fn abilities_for(&self, card_id: &str) -> StorageResult<Vec<Ability>> {
        let abilities = self
            .abilities
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        Ok(abilities.get(card_id).cloned().unwrap_or_default())
    }

    async fn related_for(
        &self,
        card_id: &str,
        limit: usize,
    ) -> StorageResult<Vec<RelatedCardSummary>> {
        let cards = self
            .cards
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        let edges = self
            .edges
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;

        let mut related: Vec<RelatedCardSummary> = edges
            .iter()
            .filter(|e| e.card_id == card_id)
            .filter_map(|e| {
                cards.get(&e.related_card_id).map(|target| RelatedCardSummary {
                    id: target.id.clone(),
                    name: target.name.clone(),
                    image_url: target.image_url.clone(),
                    relevance_score: e.relevance,
                })
            })
            .collect();
        related.sort_by(|a, b| {
            b.relevance_score
                .cmp(&a.relevance_score)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        related.truncate(limit);
        Ok(related)
    }

    // Autocomplete and filter metadata

    async fn autocomplete_candidates(&self) -> StorageResult<Vec<CardSummary>> {
        let cards = self
            .cards
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        let mut candidates: Vec<CardSummary> = cards
            .values()
            .filter(|c| c.format_legal)
            .map(CardSummary::from)
            .collect();
        candidates.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(candidates)
    }

    async fn distinct_types(&self) -> StorageResult<Vec<String>> {
        let cards = self
            .cards
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        let types: BTreeSet<String> = cards
            .values()
            .flat_map(|c| c.types.iter().cloned())
            .collect();
        Ok(types.into_iter().collect())
    }

    async fn distinct_rarities(&self) -> StorageResult<Vec<String>> {
        let cards = self
            .cards
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        let rarities: BTreeSet<String> = cards
            .values()
            .filter_map(|c| c.rarity.map(|r| r.as_str().to_string()))
            .collect();
        Ok(rarities.into_iter().collect())
    }

    async fn distinct_sets(&self) -> StorageResult<Vec<SetOption>> {
        let cards = self
            .cards
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        let mut by_id: HashMap<String, String> = HashMap::new();
        for card in cards.values().filter(|c| c.format_legal) {
            by_id
                .entry(card.set_id.clone())
                .or_insert_with(|| card.set_name.clone());
        }
        let mut sets: Vec<SetOption> = by_id
            .into_iter()
            .map(|(id, name)| SetOption { id, name })
            .collect();
        sets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sets)
    }

    // Relationship operations

    async fn legal_cards_by_names(&self, names: &[String]) -> StorageResult<Vec<Card>> {
        let cards = self
            .cards
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        let mut found: Vec<Card> = cards
            .values()
            .filter(|c| c.format_legal && names.contains(&c.name))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(found)
    }

    async fn related_by_source_name(
        &self,
        fragment: &str,
        limit: usize,
    ) -> StorageResult<Vec<(Card, i32)>> {
        let cards = self
            .cards
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        let edges = self
            .edges
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;

        // Each target appears once, under its strongest matching edge.
        let mut best: HashMap<String, i32> = HashMap::new();
        for edge in edges.iter() {
            let source_matches = cards
                .get(&edge.card_id)
                .is_some_and(|source| contains_ci(&source.name, fragment));
            if !source_matches {
                continue;
            }
            let target_legal = cards
                .get(&edge.related_card_id)
                .is_some_and(|target| target.format_legal);
            if !target_legal {
                continue;
            }
            let entry = best.entry(edge.related_card_id.clone()).or_insert(edge.relevance);
            if edge.relevance > *entry {
                *entry = edge.relevance;
            }
        }

        let mut related: Vec<(Card, i32)> = best
            .into_iter()
            .filter_map(|(id, relevance)| cards.get(&id).cloned().map(|c| (c, relevance)))
            .collect();
        related.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| a.0.name.to_lowercase().cmp(&b.0.name.to_lowercase()))
        });
        related.truncate(limit);
        Ok(related)
    }

    async fn top_rated_names(&self, limit: usize) -> StorageResult<Vec<String>> {
        let cards = self
            .cards
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        let mut rated: Vec<&Card> = cards
            .values()
            .filter(|c| {
                c.format_legal
                    && matches!(
                        c.competitive_tier,
                        Some(CompetitiveTier::Competitive) | Some(CompetitiveTier::Playable)
                    )
            })
            .collect();
        rated.sort_by(|a, b| {
            CompetitiveTier::rank_or_unrated(a.competitive_tier)
                .cmp(&CompetitiveTier::rank_or_unrated(b.competitive_tier))
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(rated.into_iter().take(limit).map(|c| c.name.clone()).collect())
    }

    // Import operations

    async fn upsert_card(&self, card: &Card) -> StorageResult<()> {
        let mut cards = self
            .cards
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        let mut stored = card.clone();
        if let Some(existing) = cards.get(&card.id) {
            stored.created_at = existing.created_at;
        }
        cards.insert(card.id.clone(), stored);
        Ok(())
    }

    async fn replace_attacks(&self, card_id: &str, attacks: &[Attack]) -> StorageResult<()> {
        let mut stored = self
            .attacks
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        let mut rows = attacks.to_vec();
        rows.sort_by_key(|a| a.position);
        stored.insert(card_id.to_string(), rows);
        Ok(())
    }

    async fn replace_abilities(
        &self,
        card_id: &str,
        abilities: &[Ability],
    ) -> StorageResult<()> {
        let mut stored = self
            .abilities
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        stored.insert(card_id.to_string(), abilities.to_vec());
        Ok(())
    }

    async fn add_related(&self, edge: &RelatedEdge) -> StorageResult<()> {
        let mut edges = self
            .edges
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        if let Some(existing) = edges
            .iter_mut()
            .find(|e| e.card_id == edge.card_id && e.related_card_id == edge.related_card_id)
        {
            existing.relevance = edge.relevance;
        } else {
            edges.push(edge.clone());
        }
        Ok(())
    }
}
