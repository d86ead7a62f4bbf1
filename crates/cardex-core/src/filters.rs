//! Filter option lists for the browse surface

use crate::card::Rarity;
use serde::{Deserialize, Serialize};

/// A set identifier/name pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetOption {
    pub id: String,
    pub name: String,
}

/// Available filter choices. Normally derived from storage; the static
/// fallback keeps the filter sidebar usable when storage is unreachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Display-capitalized type tags.
    pub types: Vec<String>,
    pub rarities: Vec<String>,
    pub sets: Vec<SetOption>,
}

impl FilterOptions {
    /// Static defaults served when storage is unreachable.
    pub fn fallback() -> Self {
        Self {
            types: [
                "Grass",
                "Fire",
                "Water",
                "Lightning",
                "Psychic",
                "Fighting",
                "Darkness",
                "Metal",
                "Dragon",
                "Colorless",
                "Trainer",
                "Energy",
            ]
            .iter()
            .map(|t| t.to_string())
            .collect(),
            rarities: Rarity::ALL.iter().map(|r| r.as_str().to_string()).collect(),
            sets: vec![
                SetOption {
                    id: "sv1".to_string(),
                    name: "Scarlet & Violet".to_string(),
                },
                SetOption {
                    id: "sv2".to_string(),
                    name: "Paldea Evolved".to_string(),
                },
                SetOption {
                    id: "sv3".to_string(),
                    name: "Obsidian Flames".to_string(),
                },
            ],
        }
    }
}

/// Capitalize a canonical type tag for display ("fire" -> "Fire").
pub fn display_type(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_type() {
        assert_eq!(display_type("fire"), "Fire");
        assert_eq!(display_type("darkness"), "Darkness");
        assert_eq!(display_type(""), "");
    }

    #[test]
    fn test_fallback_covers_the_vocabulary() {
        let options = FilterOptions::fallback();
        assert!(options.types.contains(&"Fire".to_string()));
        assert_eq!(options.rarities.len(), Rarity::ALL.len());
        assert!(!options.sets.is_empty());
    }
}
