//! Show command - one card with its attacks, abilities, and related cards

use anyhow::bail;
use clap::Args;

use cardex_core::limits::DETAIL_RELATED_LIMIT;
use cardex_core::{project, CardDetail};
use cardex_storage::CardStore;

use crate::output::{card_line, to_json, OutputFormat};
use crate::{AppContext, Cli};

#[derive(Args)]
pub struct ShowArgs {
    /// Card id, e.g. sv3-125
    pub id: String,
}

pub async fn run(args: &ShowArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let Some(card) = ctx.store.get_card(&args.id).await? else {
        bail!("Card not found: {}", args.id);
    };

    let detail = CardDetail {
        card: project(&card),
        attacks: ctx.store.attacks_for(&args.id).await?,
        abilities: ctx.store.abilities_for(&args.id).await?,
        related_cards: ctx.store.related_for(&args.id, DETAIL_RELATED_LIMIT).await?,
    };

    match cli.output_format() {
        OutputFormat::Json => println!("{}", to_json(&detail)),
        OutputFormat::Plain => print_detail(&detail),
    }

    Ok(())
}

fn print_detail(detail: &CardDetail) {
    println!("{}", card_line(&detail.card));
    if let Some(rarity) = detail.card.rarity {
        println!("  Rarity: {rarity}");
    }
    println!("  Standard: {}", detail.card.set.legalities.standard);

    if !detail.abilities.is_empty() {
        println!("Abilities:");
        for ability in &detail.abilities {
            match ability.effect.as_deref() {
                Some(effect) => println!("  {}: {}", ability.name, effect),
                None => println!("  {}", ability.name),
            }
        }
    }

    if !detail.attacks.is_empty() {
        println!("Attacks:");
        for attack in &detail.attacks {
            let cost = if attack.cost.is_empty() {
                String::new()
            } else {
                format!(" [{}]", attack.cost.join(", "))
            };
            let damage = attack
                .damage
                .as_deref()
                .map(|d| format!(" - {d}"))
                .unwrap_or_default();
            println!("  {}{}{}", attack.name, cost, damage);
            if let Some(effect) = attack.effect.as_deref() {
                println!("    {effect}");
            }
        }
    }

    if !detail.related_cards.is_empty() {
        println!("Related cards:");
        for related in &detail.related_cards {
            println!("  {} (relevance {})", related.name, related.relevance_score);
        }
    }
}
