//! Catalog query model and the filter predicate tree

use crate::card::{canonical_type, CompetitiveTier, Rarity};
use crate::pagination::PageRequest;
use serde::{Deserialize, Serialize};

/// Sort keys for catalog listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    CardNumber,
    Rarity,
    CompetitiveRating,
    Hp,
    RetreatCost,
    Set,
    Newest,
    Relevance,
}

impl SortKey {
    /// Parse an externally-supplied sort label. Unknown labels yield `None`
    /// so each route can apply its own default.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Some(Self::Name),
            "number" | "card_number" => Some(Self::CardNumber),
            "rarity" => Some(Self::Rarity),
            "competitive" | "competitive_rating" => Some(Self::CompetitiveRating),
            "hp" => Some(Self::Hp),
            "retreat" | "retreat_cost" => Some(Self::RetreatCost),
            "set" => Some(Self::Set),
            "newest" | "created_at" => Some(Self::Newest),
            "relevance" => Some(Self::Relevance),
            _ => None,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Which text surfaces a free-text query matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextScope {
    /// Card name only.
    #[default]
    Name,
    /// Name plus attack and ability effect text, with relevance weighting.
    Full,
}

/// Columns the predicate tree can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    SetId,
    Rarity,
    Hp,
    RetreatCost,
    CompetitiveTier,
    FormatLegal,
}

/// A typed predicate operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Text(String),
    Bool(bool),
}

/// One node of the conjunctive filter tree.
///
/// Rendering backends turn these into parameterized statements; user input
/// never lands in query text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Column equals the value.
    Eq(Field, Scalar),
    /// Column is one of the values. An empty set matches nothing.
    InSet(Field, Vec<Scalar>),
    /// Inclusive numeric range; either bound may be open.
    Range {
        field: Field,
        min: Option<i64>,
        max: Option<i64>,
    },
    /// Case-insensitive substring on a single column.
    ContainsText(Field, String),
    /// Case-insensitive substring across name, attack text, and ability
    /// text. Drives relevance weighting on the search surface.
    MatchesAnyText(String),
    /// At least one ability row exists for the card. An ability with empty
    /// effect text still counts.
    HasAbility,
    /// Card carries at least one of the given type tags. Must be evaluated
    /// after type aggregation so multi-typed cards keep their full tag list.
    HasAnyType(Vec<String>),
}

/// A structured catalog query: filters, sort, and result window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardQuery {
    /// Free-text query; empty or whitespace-only text is ignored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default)]
    pub text_scope: TextScope,

    /// Type-tag filter, OR semantics across the set.
    #[serde(default)]
    pub types: Vec<String>,

    #[serde(default)]
    pub rarities: Vec<Rarity>,

    #[serde(default)]
    pub sets: Vec<String>,

    pub hp_min: Option<i64>,
    pub hp_max: Option<i64>,
    pub retreat_max: Option<i64>,

    pub tier: Option<CompetitiveTier>,

    #[serde(default)]
    pub require_ability: bool,

    #[serde(default)]
    pub sort: SortKey,

    #[serde(default)]
    pub dir: SortDir,

    #[serde(default)]
    pub page: PageRequest,
}

impl CardQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_text_scope(mut self, scope: TextScope) -> Self {
        self.text_scope = scope;
        self
    }

    /// Add a type-tag filter, canonicalized; duplicates are ignored.
    pub fn with_type(mut self, tag: impl AsRef<str>) -> Self {
        let tag = canonical_type(tag.as_ref());
        if !tag.is_empty() && !self.types.contains(&tag) {
            self.types.push(tag);
        }
        self
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        if !self.rarities.contains(&rarity) {
            self.rarities.push(rarity);
        }
        self
    }

    pub fn with_set(mut self, set_id: impl Into<String>) -> Self {
        let set_id = set_id.into();
        if !self.sets.contains(&set_id) {
            self.sets.push(set_id);
        }
        self
    }

    pub fn with_hp_min(mut self, hp: i64) -> Self {
        self.hp_min = Some(hp);
        self
    }

    pub fn with_hp_max(mut self, hp: i64) -> Self {
        self.hp_max = Some(hp);
        self
    }

    pub fn with_retreat_max(mut self, cost: i64) -> Self {
        self.retreat_max = Some(cost);
        self
    }

    pub fn with_tier(mut self, tier: CompetitiveTier) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn require_ability(mut self) -> Self {
        self.require_ability = true;
        self
    }

    pub fn sort_by(mut self, sort: SortKey, dir: SortDir) -> Self {
        self.sort = sort;
        self.dir = dir;
        self
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    /// The trimmed text query, when one was supplied. Relevance weighting on
    /// the search surface keys off this same token.
    pub fn text_query(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Compile the filters into a conjunction of predicate nodes. The
    /// format-legality gate is always present: only legal cards are
    /// listable or searchable.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut preds = vec![Predicate::Eq(Field::FormatLegal, Scalar::Bool(true))];

        if let Some(text) = self.text_query() {
            match self.text_scope {
                TextScope::Name => {
                    preds.push(Predicate::ContainsText(Field::Name, text.to_string()));
                }
                TextScope::Full => {
                    preds.push(Predicate::MatchesAnyText(text.to_string()));
                }
            }
        }

        if !self.types.is_empty() {
            preds.push(Predicate::HasAnyType(self.types.clone()));
        }

        if !self.rarities.is_empty() {
            preds.push(Predicate::InSet(
                Field::Rarity,
                self.rarities
                    .iter()
                    .map(|r| Scalar::Text(r.as_str().to_string()))
                    .collect(),
            ));
        }

        if !self.sets.is_empty() {
            preds.push(Predicate::InSet(
                Field::SetId,
                self.sets.iter().map(|s| Scalar::Text(s.clone())).collect(),
            ));
        }

        if self.hp_min.is_some() || self.hp_max.is_some() {
            preds.push(Predicate::Range {
                field: Field::Hp,
                min: self.hp_min,
                max: self.hp_max,
            });
        }

        if let Some(max) = self.retreat_max {
            preds.push(Predicate::Range {
                field: Field::RetreatCost,
                min: None,
                max: Some(max),
            });
        }

        if let Some(tier) = self.tier {
            preds.push(Predicate::Eq(
                Field::CompetitiveTier,
                Scalar::Text(tier.as_str().to_string()),
            ));
        }

        if self.require_ability {
            preds.push(Predicate::HasAbility);
        }

        preds
    }
}
