//! Curated competitive-meta knowledge
//!
//! A process-lifetime snapshot of card synergies, deck archetypes, and staple
//! lists. The built-in data tracks the current Standard format; deployments
//! can override it with a JSON file of the same shape without rebuilding.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SynergyResult;

/// A named deck archetype and its curated card tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archetype {
    pub label: String,

    /// Cards the deck cannot function without.
    pub core: Vec<String>,

    /// Cards most builds run.
    pub support: Vec<String>,

    /// Situational picks for open deck slots.
    pub tech: Vec<String>,
}

/// Immutable knowledge consulted by relationship resolution and deck-building
/// suggestions. Loaded once at startup and shared by reference; nothing in the
/// request path mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynergyKnowledge {
    /// Card name to its synergy partners, strongest first.
    pub synergies: HashMap<String, Vec<String>>,

    /// Archetypes in priority order; the first match wins.
    pub archetypes: Vec<Archetype>,

    /// Staple names keyed by canonical type tag.
    pub type_staples: HashMap<String, Vec<String>>,

    /// Trainers that fit almost any deck.
    pub universal_staples: Vec<String>,

    /// Pokemon whose job is drawing or searching.
    pub draw_support: Vec<String>,

    /// Cards played to disrupt the opponent.
    pub disruption: Vec<String>,
}

impl SynergyKnowledge {
    /// The built-in Standard-format snapshot.
    pub fn builtin() -> Self {
        Self {
            synergies: BUILTIN_SYNERGIES
                .iter()
                .map(|(card, partners)| ((*card).to_string(), names(partners)))
                .collect(),
            archetypes: vec![
                archetype(
                    "Charizard ex",
                    &["Charizard ex", "Pidgeot ex", "Rare Candy"],
                    &["Arcanine ex", "Bibarel", "Iono", "Professor's Research"],
                    &["Lumineon V", "Manaphy", "Lost Vacuum"],
                ),
                archetype(
                    "Gardevoir ex",
                    &["Gardevoir ex", "Kirlia", "Fog Crystal"],
                    &["Zacian V", "Scream Tail", "Moonlit Hill"],
                    &["Pidgeot ex", "Jirachi", "Technical Machine: Devolution"],
                ),
                archetype(
                    "Lost Box",
                    &["Comfey", "Sableye", "Lost City", "Mirage Gate"],
                    &["Cramorant", "Radiant Greninja", "Colress's Experiment"],
                    &["Spiritomb", "Klefki", "Lost Vacuum"],
                ),
                archetype(
                    "Miraidon ex",
                    &["Miraidon ex", "Flaaffy", "Electric Generator"],
                    &["Raikou V", "Iron Hands ex", "Beach Court"],
                    &["Forest Seal Stone", "Spiritomb", "Path to the Peak"],
                ),
            ],
            type_staples: BUILTIN_TYPE_STAPLES
                .iter()
                .map(|(tag, staples)| ((*tag).to_string(), names(staples)))
                .collect(),
            universal_staples: names(&[
                "Professor's Research",
                "Iono",
                "Boss's Orders",
                "Ultra Ball",
                "Switch Cart",
            ]),
            draw_support: names(&["Bibarel", "Radiant Greninja", "Lumineon V", "Pidgeot ex"]),
            disruption: names(&["Boss's Orders", "Cross Switcher"]),
        }
    }

    /// Load knowledge from a JSON file.
    pub fn load(path: &Path) -> SynergyResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Load knowledge from `path` when given, falling back to the built-in
    /// snapshot if the file is missing or malformed. A bad override file
    /// degrades with a warning instead of failing startup.
    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };
        match Self::load(path) {
            Ok(knowledge) => {
                tracing::info!(path = %path.display(), "Loaded synergy knowledge file");
                knowledge
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load synergy knowledge file, using built-in data"
                );
                Self::builtin()
            }
        }
    }

    /// Curated partner list for an exact card name.
    pub fn synergies_for(&self, card_name: &str) -> Option<&[String]> {
        self.synergies.get(card_name).map(Vec::as_slice)
    }

    /// First archetype, in declared order, whose core list contains the name
    /// or whose label equals it.
    pub fn archetype_for(&self, card_name: &str) -> Option<&Archetype> {
        self.archetypes
            .iter()
            .find(|a| a.label == card_name || a.core.iter().any(|c| c == card_name))
    }

    /// Staples for a canonical type tag. Unknown tags yield an empty slice.
    pub fn staples_for_type(&self, tag: &str) -> &[String] {
        self.type_staples
            .get(tag)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn universal_staples(&self) -> &[String] {
        &self.universal_staples
    }

    pub fn is_draw_support(&self, card_name: &str) -> bool {
        self.draw_support.iter().any(|n| n == card_name)
    }

    pub fn is_disruption(&self, card_name: &str) -> bool {
        self.disruption.iter().any(|n| n == card_name)
    }
}

impl Default for SynergyKnowledge {
    fn default() -> Self {
        Self::builtin()
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

fn archetype(label: &str, core: &[&str], support: &[&str], tech: &[&str]) -> Archetype {
    Archetype {
        label: label.to_string(),
        core: names(core),
        support: names(support),
        tech: names(tech),
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Built-in data
// ─────────────────────────────────────────────────────────────────────────

const BUILTIN_SYNERGIES: &[(&str, &[&str])] = &[
    (
        "Charizard ex",
        &[
            "Pidgeot ex",
            "Rare Candy",
            "Arcanine ex",
            "Charmeleon",
            "Charmander",
            "Iono",
            "Professor's Research",
            "Boss's Orders",
            "Ultra Ball",
            "Super Rod",
        ],
    ),
    (
        "Pidgeot ex",
        &[
            "Rare Candy",
            "Pidgey",
            "Ultra Ball",
            "Iono",
            "Boss's Orders",
            "Charizard ex",
            "Gardevoir ex",
            "Technical Machine: Devolution",
        ],
    ),
    (
        "Gardevoir ex",
        &[
            "Kirlia",
            "Ralts",
            "Rare Candy",
            "Fog Crystal",
            "Zacian V",
            "Scream Tail",
            "Professor's Research",
            "Iono",
            "Moonlit Hill",
            "Super Rod",
        ],
    ),
    (
        "Comfey",
        &[
            "Colress's Experiment",
            "Lost City",
            "Mirage Gate",
            "Sableye",
            "Radiant Greninja",
            "Lost Vacuum",
            "Cross Switcher",
            "Cramorant",
            "Switch Cart",
        ],
    ),
    (
        "Miraidon ex",
        &[
            "Flaaffy",
            "Mareep",
            "Raikou V",
            "Iron Hands ex",
            "Electric Generator",
            "Professor's Research",
            "Iono",
            "Beach Court",
            "Forest Seal Stone",
        ],
    ),
    (
        "Bibarel",
        &[
            "Bidoof",
            "Ultra Ball",
            "Quick Ball",
            "Professor's Research",
            "Skwovet",
            "Twin Energy",
        ],
    ),
    (
        "Radiant Greninja",
        &[
            "Energy Retrieval",
            "Fog Crystal",
            "Battle VIP Pass",
            "Melony",
            "Irida",
        ],
    ),
    ("Iono", &["Judge", "Roxanne", "Path to the Peak", "Spiritomb"]),
    (
        "Professor's Research",
        &["Ultra Ball", "Quick Ball", "Battle VIP Pass", "Super Rod"],
    ),
    (
        "Boss's Orders",
        &["Cross Switcher", "Escape Rope", "Switch Cart", "Counter Catcher"],
    ),
    (
        "Lost City",
        &["Lost Vacuum", "Comfey", "Sableye", "Colress's Experiment"],
    ),
    (
        "Path to the Peak",
        &["Spiritomb", "Iono", "Judge", "Klefki"],
    ),
    (
        "Dark Patch",
        &[
            "Galarian Moltres V",
            "Darkrai VSTAR",
            "Dark Energy",
            "Energy Switch",
        ],
    ),
    ("Mirage Gate", &["Comfey", "Sableye", "Cramorant", "Lost City"]),
    (
        "Ultra Ball",
        &["Professor's Research", "Quick Ball", "Nest Ball", "Level Ball"],
    ),
    (
        "Battle VIP Pass",
        &["Lumineon V", "Professor's Research", "Ultra Ball", "Arven"],
    ),
    (
        "Super Rod",
        &[
            "Professor's Research",
            "Lost Vacuum",
            "Ordinary Rod",
            "Energy Retrieval",
        ],
    ),
    (
        "Rare Candy",
        &[
            "Pidgeot ex",
            "Charizard ex",
            "Gardevoir ex",
            "Alakazam ex",
            "Ultra Ball",
        ],
    ),
    (
        "Arven",
        &[
            "Battle VIP Pass",
            "Rare Candy",
            "Forest Seal Stone",
            "Choice Belt",
            "Nest Ball",
        ],
    ),
];

const BUILTIN_TYPE_STAPLES: &[(&str, &[&str])] = &[
    ("fire", &["Arcanine ex", "Magma Basin", "Fire Energy"]),
    ("water", &["Irida", "Melony", "Wash Energy"]),
    ("grass", &["Gardenia's Vigor", "Forest Seal Stone", "Grass Energy"]),
    ("lightning", &["Electric Generator", "Beach Court", "Lightning Energy"]),
    ("psychic", &["Fog Crystal", "Gardevoir ex", "Psychic Energy"]),
    ("fighting", &["Korrina's Focus", "Fighting Energy"]),
    ("darkness", &["Dark Patch", "Galarian Moltres V", "Darkness Energy"]),
    ("metal", &["Metal Saucer", "Metal Energy"]),
    ("dragon", &["Dragon Energy"]),
    ("colorless", &["Twin Energy", "Powerful Energy"]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archetype_lookup_prefers_declared_order() {
        let knowledge = SynergyKnowledge::builtin();

        // Pidgeot ex is core in Charizard ex and tech in Gardevoir ex; the
        // earlier archetype wins and tech membership never counts.
        let hit = knowledge.archetype_for("Pidgeot ex").unwrap();
        assert_eq!(hit.label, "Charizard ex");

        let by_label = knowledge.archetype_for("Lost Box").unwrap();
        assert_eq!(by_label.label, "Lost Box");

        assert!(knowledge.archetype_for("Lost Vacuum").is_none());
        assert!(knowledge.archetype_for("Snorlax").is_none());
    }

    #[test]
    fn test_synergy_lists_keep_curated_order() {
        let knowledge = SynergyKnowledge::builtin();
        let partners = knowledge.synergies_for("Charizard ex").unwrap();
        assert_eq!(partners.first().map(String::as_str), Some("Pidgeot ex"));
        assert_eq!(partners.last().map(String::as_str), Some("Super Rod"));
        assert_eq!(partners.len(), 10);

        assert!(knowledge.synergies_for("charizard ex").is_none());
    }

    #[test]
    fn test_staples_and_role_lists() {
        let knowledge = SynergyKnowledge::builtin();
        assert_eq!(
            knowledge.staples_for_type("fire"),
            ["Arcanine ex", "Magma Basin", "Fire Energy"]
        );
        assert!(knowledge.staples_for_type("trainer").is_empty());

        assert!(knowledge.is_draw_support("Pidgeot ex"));
        assert!(!knowledge.is_draw_support("Iono"));
        assert!(knowledge.is_disruption("Cross Switcher"));
        assert!(!knowledge.is_disruption("Judge"));
    }

    #[test]
    fn test_load_replaces_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledge.json");
        std::fs::write(
            &path,
            r#"{
                "synergies": {"Alpha": ["Beta", "Gamma"]},
                "archetypes": [
                    {"label": "Alpha", "core": ["Alpha"], "support": [], "tech": []}
                ],
                "type_staples": {"fire": ["Beta"]},
                "universal_staples": ["Gamma"],
                "draw_support": [],
                "disruption": []
            }"#,
        )
        .unwrap();

        let knowledge = SynergyKnowledge::load_or_builtin(Some(&path));
        assert_eq!(
            knowledge.synergies_for("Alpha").unwrap(),
            ["Beta", "Gamma"]
        );
        assert!(knowledge.synergies_for("Charizard ex").is_none());
        assert_eq!(knowledge.archetype_for("Alpha").unwrap().label, "Alpha");
    }

    #[test]
    fn test_broken_file_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledge.json");
        std::fs::write(&path, "{ not json").unwrap();

        let knowledge = SynergyKnowledge::load_or_builtin(Some(&path));
        assert_eq!(knowledge, SynergyKnowledge::builtin());

        let missing = SynergyKnowledge::load_or_builtin(Some(Path::new("/nonexistent/k.json")));
        assert_eq!(missing, SynergyKnowledge::builtin());
    }

    #[test]
    fn test_json_round_trip() {
        let knowledge = SynergyKnowledge::builtin();
        let raw = serde_json::to_string(&knowledge).unwrap();
        let back: SynergyKnowledge = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, knowledge);
    }
}
