//! Card domain types

use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical type-tag vocabulary recognized by the catalog.
pub const TYPE_TAGS: [&str; 13] = [
    "grass",
    "fire",
    "water",
    "lightning",
    "psychic",
    "fighting",
    "darkness",
    "metal",
    "fairy",
    "dragon",
    "colorless",
    "trainer",
    "energy",
];

/// Normalize a raw type tag to its canonical lowercase form.
pub fn canonical_type(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Card rarity vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    RareHolo,
    RareUltra,
    RareSecret,
    RareShiny,
    AmazingRare,
    RadiantRare,
    SpecialIllustrationRare,
}

impl Rarity {
    pub const ALL: [Rarity; 10] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::RareHolo,
        Rarity::RareUltra,
        Rarity::RareSecret,
        Rarity::RareShiny,
        Rarity::AmazingRare,
        Rarity::RadiantRare,
        Rarity::SpecialIllustrationRare,
    ];

    /// Rank used by the rarity sort; scarcer rarities rank lower (first).
    /// Rarities outside the ranked set share the trailing rank.
    pub fn sort_rank(self) -> i64 {
        match self {
            Rarity::RareSecret => 1,
            Rarity::RareUltra => 2,
            Rarity::RareShiny => 3,
            Rarity::SpecialIllustrationRare => 4,
            Rarity::RareHolo => 5,
            Rarity::Rare => 6,
            Rarity::Uncommon => 7,
            Rarity::Common => 8,
            Rarity::AmazingRare | Rarity::RadiantRare => 9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::RareHolo => "rare_holo",
            Rarity::RareUltra => "rare_ultra",
            Rarity::RareSecret => "rare_secret",
            Rarity::RareShiny => "rare_shiny",
            Rarity::AmazingRare => "amazing_rare",
            Rarity::RadiantRare => "radiant_rare",
            Rarity::SpecialIllustrationRare => "special_illustration_rare",
        }
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Rarity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "common" => Ok(Rarity::Common),
            "uncommon" => Ok(Rarity::Uncommon),
            "rare" => Ok(Rarity::Rare),
            "rare_holo" => Ok(Rarity::RareHolo),
            "rare_ultra" => Ok(Rarity::RareUltra),
            "rare_secret" => Ok(Rarity::RareSecret),
            "rare_shiny" => Ok(Rarity::RareShiny),
            "amazing_rare" => Ok(Rarity::AmazingRare),
            "radiant_rare" => Ok(Rarity::RadiantRare),
            "special_illustration_rare" => Ok(Rarity::SpecialIllustrationRare),
            other => Err(Error::UnknownRarity(other.to_string())),
        }
    }
}

/// Editorial play-strength rating, independent of game rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetitiveTier {
    Competitive,
    Playable,
    Casual,
}

impl CompetitiveTier {
    pub const ALL: [CompetitiveTier; 3] = [
        CompetitiveTier::Competitive,
        CompetitiveTier::Playable,
        CompetitiveTier::Casual,
    ];

    /// Rank used by the tier sort; most competitive ranks first.
    pub fn sort_rank(self) -> i64 {
        match self {
            CompetitiveTier::Competitive => 1,
            CompetitiveTier::Playable => 2,
            CompetitiveTier::Casual => 3,
        }
    }

    /// Rank including the unrated case, which always sorts last.
    pub fn rank_or_unrated(tier: Option<CompetitiveTier>) -> i64 {
        tier.map(CompetitiveTier::sort_rank).unwrap_or(4)
    }

    /// Star rating shown by clients: competitive 3, playable 2, anything
    /// else 1.
    pub fn stars(tier: Option<CompetitiveTier>) -> u8 {
        match tier {
            Some(CompetitiveTier::Competitive) => 3,
            Some(CompetitiveTier::Playable) => 2,
            _ => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CompetitiveTier::Competitive => "competitive",
            CompetitiveTier::Playable => "playable",
            CompetitiveTier::Casual => "casual",
        }
    }
}

impl std::fmt::Display for CompetitiveTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CompetitiveTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "competitive" => Ok(CompetitiveTier::Competitive),
            "playable" => Ok(CompetitiveTier::Playable),
            "casual" => Ok(CompetitiveTier::Casual),
            other => Err(Error::UnknownTier(other.to_string())),
        }
    }
}

/// A catalog card record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Stable external identifier, e.g. "sv3-125".
    pub id: String,

    pub name: String,

    /// Originating set.
    pub set_id: String,
    pub set_name: String,

    /// In-set collector number; may carry a non-numeric suffix ("102a").
    pub card_number: String,

    pub rarity: Option<Rarity>,

    /// Canonical lowercase type tags, set semantics.
    #[serde(default)]
    pub types: Vec<String>,

    pub hp: Option<i32>,

    pub retreat_cost: Option<i32>,

    /// Whether the card is legal in the current Standard-equivalent format.
    /// Gates every public list/search path.
    pub format_legal: bool,

    /// `None` means unrated.
    pub competitive_tier: Option<CompetitiveTier>,

    pub image_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        set_id: impl Into<String>,
        set_name: impl Into<String>,
        card_number: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            set_id: set_id.into(),
            set_name: set_name.into(),
            card_number: card_number.into(),
            rarity: None,
            types: Vec::new(),
            hp: None,
            retreat_cost: None,
            format_legal: true,
            competitive_tier: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a type tag, canonicalized. The tag list is a set: duplicates
    /// are ignored and the stored order is sorted.
    pub fn add_type(&mut self, tag: impl AsRef<str>) {
        let tag = canonical_type(tag.as_ref());
        if !tag.is_empty() {
            if let Err(pos) = self.types.binary_search(&tag) {
                self.types.insert(pos, tag);
            }
        }
    }

    pub fn has_type(&self, tag: &str) -> bool {
        let tag = canonical_type(tag);
        self.types.iter().any(|t| *t == tag)
    }

    pub fn with_types<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            self.add_type(tag);
        }
        self
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = Some(rarity);
        self
    }

    pub fn with_hp(mut self, hp: i32) -> Self {
        self.hp = Some(hp);
        self
    }

    pub fn with_retreat_cost(mut self, cost: i32) -> Self {
        self.retreat_cost = Some(cost);
        self
    }

    pub fn with_tier(mut self, tier: CompetitiveTier) -> Self {
        self.competitive_tier = Some(tier);
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_format_legal(mut self, legal: bool) -> Self {
        self.format_legal = legal;
        self
    }
}

/// An attack printed on a card. Attacks are ordered by `position`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attack {
    pub card_id: String,

    /// Zero-based print order within the card.
    pub position: i32,

    pub name: String,

    /// Ordered energy-cost symbols, e.g. `["fire", "fire", "colorless"]`.
    #[serde(default)]
    pub cost: Vec<String>,

    /// Damage text; may carry a suffix ("120+", "50×2").
    pub damage: Option<String>,

    pub effect: Option<String>,
}

impl Attack {
    pub fn new(card_id: impl Into<String>, position: i32, name: impl Into<String>) -> Self {
        Self {
            card_id: card_id.into(),
            position,
            name: name.into(),
            cost: Vec::new(),
            damage: None,
            effect: None,
        }
    }

    pub fn with_cost<I, S>(mut self, cost: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cost = cost.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_damage(mut self, damage: impl Into<String>) -> Self {
        self.damage = Some(damage.into());
        self
    }

    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = Some(effect.into());
        self
    }
}

/// An ability printed on a card. Unordered relative to its siblings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    pub card_id: String,
    pub name: String,
    pub effect: Option<String>,
    /// Kind label as printed, e.g. "Ability".
    pub kind: Option<String>,
}

impl Ability {
    pub fn new(card_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            card_id: card_id.into(),
            name: name.into(),
            effect: None,
            kind: None,
        }
    }

    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = Some(effect.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

/// A directed relationship edge between two cards, persisted as the fallback
/// source of relationships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedEdge {
    pub card_id: String,
    pub related_card_id: String,
    pub relevance: i32,
}

impl RelatedEdge {
    pub fn new(
        card_id: impl Into<String>,
        related_card_id: impl Into<String>,
        relevance: i32,
    ) -> Self {
        Self {
            card_id: card_id.into(),
            related_card_id: related_card_id.into(),
            relevance,
        }
    }
}

/// Compact card row used by autocomplete and other pickers that only need
/// identity, display fields, and the competitive tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSummary {
    pub id: String,
    pub name: String,
    pub set_name: String,
    pub card_number: String,
    pub image_url: Option<String>,
    pub competitive_tier: Option<CompetitiveTier>,
}

impl From<&Card> for CardSummary {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id.clone(),
            name: card.name.clone(),
            set_name: card.set_name.clone(),
            card_number: card.card_number.clone(),
            image_url: card.image_url.clone(),
            competitive_tier: card.competitive_tier,
        }
    }
}
