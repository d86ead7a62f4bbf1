//! Output formatting utilities

use cardex_core::CardView;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Plain,
        }
    }
}

/// Render a value as pretty JSON for `--format json`.
pub fn to_json<T: serde::Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
}

/// One listing line: name, set, number, then the facts that exist.
pub fn card_line(card: &CardView) -> String {
    let mut line = format!("{} - {} #{}", card.name, card.set_name, card.card_number);
    if let Some(hp) = card.hp {
        line.push_str(&format!(" ({} HP)", hp));
    }
    if !card.types.is_empty() {
        line.push_str(&format!(" [{}]", card.types.join(", ")));
    }
    if let Some(tier) = card.competitive_tier {
        line.push_str(&format!(" {}", tier));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardex_core::{project, Card, CompetitiveTier};

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::from("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from("plain"), OutputFormat::Plain);
        assert_eq!(OutputFormat::from("table"), OutputFormat::Plain);
    }

    #[test]
    fn test_card_line_skips_absent_facts() {
        let bare = project(&Card::new("sv1-1", "Sprigatito", "sv1", "Scarlet & Violet", "1"));
        assert_eq!(card_line(&bare), "Sprigatito - Scarlet & Violet #1");

        let full = project(
            &Card::new("sv3-125", "Charizard ex", "sv3", "Obsidian Flames", "125")
                .with_types(["fire"])
                .with_hp(330)
                .with_tier(CompetitiveTier::Competitive),
        );
        assert_eq!(
            card_line(&full),
            "Charizard ex - Obsidian Flames #125 (330 HP) [fire] competitive"
        );
    }
}
