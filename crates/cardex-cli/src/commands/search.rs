//! Search command - query the card catalog from the terminal

use clap::Args;

use cardex_core::limits::{DEFAULT_LIST_LIMIT, DEFAULT_SEARCH_LIMIT};
use cardex_core::{
    project, CardQuery, CompetitiveTier, PageRequest, Rarity, SortDir, SortKey, TextScope,
};
use cardex_storage::CardStore;

use crate::output::{card_line, to_json, OutputFormat};
use crate::{AppContext, Cli};

#[derive(Args)]
pub struct SearchArgs {
    /// Text query against card names (and card text with --full-text)
    pub query: Option<String>,

    /// Match attack and ability text too, ranking results by relevance
    #[arg(long)]
    pub full_text: bool,

    /// Filter by type tag (can be used multiple times)
    #[arg(short = 't', long = "type")]
    pub types: Vec<String>,

    /// Filter by rarity (can be used multiple times)
    #[arg(short, long = "rarity")]
    pub rarities: Vec<String>,

    /// Filter by set id (can be used multiple times)
    #[arg(short, long = "set")]
    pub sets: Vec<String>,

    /// Minimum HP
    #[arg(long)]
    pub hp_min: Option<i64>,

    /// Maximum HP
    #[arg(long)]
    pub hp_max: Option<i64>,

    /// Maximum retreat cost
    #[arg(long)]
    pub retreat_max: Option<i64>,

    /// Competitive tier: competitive, playable, casual
    #[arg(long)]
    pub tier: Option<String>,

    /// Only cards with at least one ability
    #[arg(long)]
    pub has_ability: bool,

    /// Sort key: name, number, rarity, competitive, hp, retreat, set, newest
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort direction: asc, desc
    #[arg(long)]
    pub order: Option<String>,

    /// 1-based page number
    #[arg(short, long, default_value = "1")]
    pub page: i64,

    /// Results per page
    #[arg(short, long, default_value = "0")]
    pub limit: i64,
}

impl SearchArgs {
    /// Compile the flags into a catalog query. Unknown labels are skipped
    /// with a warning rather than aborting, matching the API surface.
    fn to_query(&self) -> CardQuery {
        let scope = if self.full_text {
            TextScope::Full
        } else {
            TextScope::Name
        };
        let mut query = CardQuery::new().with_text_scope(scope);

        if let Some(text) = self.query.as_deref() {
            query = query.with_text(text);
        }
        for tag in &self.types {
            query = query.with_type(tag);
        }
        for label in &self.rarities {
            match label.parse::<Rarity>() {
                Ok(rarity) => query = query.with_rarity(rarity),
                Err(e) => tracing::warn!("Skipping rarity filter: {e}"),
            }
        }
        for set_id in &self.sets {
            query = query.with_set(set_id.clone());
        }
        if let Some(hp) = self.hp_min {
            query = query.with_hp_min(hp);
        }
        if let Some(hp) = self.hp_max {
            query = query.with_hp_max(hp);
        }
        if let Some(cost) = self.retreat_max {
            query = query.with_retreat_max(cost);
        }
        if let Some(label) = self.tier.as_deref() {
            match label.parse::<CompetitiveTier>() {
                Ok(tier) => query = query.with_tier(tier),
                Err(e) => tracing::warn!("Skipping tier filter: {e}"),
            }
        }
        if self.has_ability {
            query = query.require_ability();
        }

        let default_sort = if self.full_text {
            SortKey::Relevance
        } else {
            SortKey::Name
        };
        let sort = self
            .sort
            .as_deref()
            .and_then(SortKey::parse)
            .unwrap_or(default_sort);
        let dir = self
            .order
            .as_deref()
            .and_then(SortDir::parse)
            .unwrap_or_default();

        let default_limit = if self.full_text {
            DEFAULT_SEARCH_LIMIT
        } else {
            DEFAULT_LIST_LIMIT
        };
        query
            .sort_by(sort, dir)
            .with_page(PageRequest::from_page(self.page, self.limit, default_limit))
    }
}

pub async fn run(args: &SearchArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let query = args.to_query();
    let (cards, total) = ctx.store.list_cards(&query).await?;
    let views: Vec<_> = cards.iter().map(project).collect();

    match cli.output_format() {
        OutputFormat::Json => {
            println!(
                "{}",
                to_json(&serde_json::json!({ "cards": views, "total": total }))
            );
        }
        OutputFormat::Plain => {
            if views.is_empty() {
                println!("No cards matched");
                return Ok(());
            }
            let page = query.page.page();
            println!("{} of {} matching cards (page {}):", views.len(), total, page);
            for view in &views {
                println!("  {}", card_line(view));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_compile_into_a_query() {
        let args = SearchArgs {
            query: Some("char".to_string()),
            full_text: false,
            types: vec!["Fire".to_string()],
            rarities: vec!["rare_holo".to_string(), "bogus".to_string()],
            sets: vec!["sv3".to_string()],
            hp_min: Some(120),
            hp_max: None,
            retreat_max: Some(2),
            tier: Some("competitive".to_string()),
            has_ability: true,
            sort: Some("hp".to_string()),
            order: Some("desc".to_string()),
            page: 2,
            limit: 10,
        };
        let query = args.to_query();
        assert_eq!(query.text_query(), Some("char"));
        assert_eq!(query.text_scope, TextScope::Name);
        assert_eq!(query.types, ["fire"]);
        assert_eq!(query.rarities, [Rarity::RareHolo]);
        assert_eq!(query.sort, SortKey::Hp);
        assert_eq!(query.dir, SortDir::Desc);
        assert_eq!(query.page.offset, 10);
        assert!(query.require_ability);
    }

    #[test]
    fn test_full_text_defaults() {
        let args = SearchArgs {
            query: Some("draw".to_string()),
            full_text: true,
            types: vec![],
            rarities: vec![],
            sets: vec![],
            hp_min: None,
            hp_max: None,
            retreat_max: None,
            tier: None,
            has_ability: false,
            sort: None,
            order: None,
            page: 1,
            limit: 0,
        };
        let query = args.to_query();
        assert_eq!(query.text_scope, TextScope::Full);
        assert_eq!(query.sort, SortKey::Relevance);
        assert_eq!(query.page.limit, DEFAULT_SEARCH_LIMIT);
    }
}
