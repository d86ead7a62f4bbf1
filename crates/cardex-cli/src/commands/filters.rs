//! Filters command - list the filter options the catalog offers

use cardex_core::{display_type, FilterOptions};
use cardex_storage::CardStore;

use crate::output::{to_json, OutputFormat};
use crate::{AppContext, Cli};

pub async fn run(cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let options = FilterOptions {
        types: ctx
            .store
            .distinct_types()
            .await?
            .iter()
            .map(|t| display_type(t))
            .collect(),
        rarities: ctx.store.distinct_rarities().await?,
        sets: ctx.store.distinct_sets().await?,
    };

    match cli.output_format() {
        OutputFormat::Json => println!("{}", to_json(&options)),
        OutputFormat::Plain => {
            println!("Types: {}", options.types.join(", "));
            println!("Rarities: {}", options.rarities.join(", "));
            println!("Sets:");
            for set in &options.sets {
                println!("  {} ({})", set.name, set.id);
            }
        }
    }

    Ok(())
}
