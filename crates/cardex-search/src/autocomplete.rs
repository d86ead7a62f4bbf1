//! Name autocomplete over catalog candidates
//!
//! Ranks candidates into three buckets: name-prefix matches first, then
//! substring matches, then fuzzy matches (behind the `fuzzy` feature).
//! Within a bucket, better competitive tiers come first and unrated cards
//! last, with the card name as the final tiebreak.

use cardex_core::limits::MIN_AUTOCOMPLETE_LEN;
use cardex_core::{CardSummary, CompetitiveTier};
use serde::{Deserialize, Serialize};

const BUCKET_PREFIX: u8 = 0;
const BUCKET_SUBSTRING: u8 = 1;
#[cfg(feature = "fuzzy")]
const BUCKET_FUZZY: u8 = 2;

/// One autocomplete suggestion, ready for the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub name: String,
    /// Display line: `{name} - {set_name} #{card_number}`.
    pub display: String,
    pub image_url: Option<String>,
    pub competitive_tier: Option<CompetitiveTier>,
}

impl Suggestion {
    fn from_summary(card: &CardSummary) -> Self {
        Self {
            id: card.id.clone(),
            name: card.name.clone(),
            display: format!("{} - {} #{}", card.name, card.set_name, card.card_number),
            image_url: card.image_url.clone(),
            competitive_tier: card.competitive_tier,
        }
    }
}

type RankEntry<'a> = (u8, i64, String, &'a CardSummary);

/// Stateless autocomplete engine
pub struct AutocompleteEngine {
    /// Fuzzy matches must score above this fraction of the query's
    /// self-match score to qualify.
    pub fuzzy_threshold: f32,
}

impl AutocompleteEngine {
    pub fn new() -> Self {
        Self {
            fuzzy_threshold: 0.3,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.fuzzy_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Rank candidates against the query. Queries shorter than two
    /// characters yield no suggestions. Each candidate lands in at most
    /// one bucket, so a card never appears twice.
    pub fn suggest(
        &self,
        query: &str,
        candidates: &[CardSummary],
        limit: usize,
    ) -> Vec<Suggestion> {
        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_AUTOCOMPLETE_LEN {
            return Vec::new();
        }
        let needle = trimmed.to_lowercase();

        let mut ranked: Vec<RankEntry> = Vec::new();
        let mut misses: Vec<&CardSummary> = Vec::new();
        for candidate in candidates {
            let name = candidate.name.to_lowercase();
            if name.starts_with(&needle) {
                ranked.push(entry(BUCKET_PREFIX, name, candidate));
            } else if name.contains(&needle) {
                ranked.push(entry(BUCKET_SUBSTRING, name, candidate));
            } else {
                misses.push(candidate);
            }
        }

        #[cfg(feature = "fuzzy")]
        self.push_fuzzy_matches(trimmed, &misses, &mut ranked);
        #[cfg(not(feature = "fuzzy"))]
        let _ = misses;

        ranked.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)).then_with(|| a.2.cmp(&b.2)));
        ranked.truncate(limit);

        tracing::debug!(query = %trimmed, matches = ranked.len(), "autocomplete ranked");
        ranked
            .into_iter()
            .map(|(_, _, _, candidate)| Suggestion::from_summary(candidate))
            .collect()
    }

    #[cfg(feature = "fuzzy")]
    fn push_fuzzy_matches<'a>(
        &self,
        query: &str,
        misses: &[&'a CardSummary],
        ranked: &mut Vec<RankEntry<'a>>,
    ) {
        use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
        use nucleo_matcher::{Config, Matcher, Utf32Str};

        let mut matcher = Matcher::new(Config::DEFAULT);
        let pattern = Pattern::new(
            query,
            CaseMatching::Ignore,
            Normalization::Smart,
            AtomKind::Fuzzy,
        );

        // The query matched against itself is the best achievable score;
        // candidate scores are normalized against it.
        let mut buf = Vec::new();
        let self_score = match pattern.score(Utf32Str::new(query, &mut buf), &mut matcher) {
            Some(score) if score > 0 => score as f32,
            _ => return,
        };

        for candidate in misses {
            let mut buf = Vec::new();
            if let Some(score) =
                pattern.score(Utf32Str::new(&candidate.name, &mut buf), &mut matcher)
            {
                if score as f32 / self_score > self.fuzzy_threshold {
                    ranked.push(entry(
                        BUCKET_FUZZY,
                        candidate.name.to_lowercase(),
                        candidate,
                    ));
                }
            }
        }
    }
}

impl Default for AutocompleteEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn entry<'a>(bucket: u8, name_key: String, candidate: &'a CardSummary) -> RankEntry<'a> {
    (
        bucket,
        CompetitiveTier::rank_or_unrated(candidate.competitive_tier),
        name_key,
        candidate,
    )
}
