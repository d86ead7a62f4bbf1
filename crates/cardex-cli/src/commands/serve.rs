//! Serve command - run the HTTP API server

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use cardex_api::{run_server, AppState};
use cardex_synergy::SynergyKnowledge;

use crate::AppContext;

#[derive(Args)]
pub struct ServeArgs {
    /// Listen address, e.g. 127.0.0.1:3001 (overrides the config file)
    #[arg(short, long)]
    pub addr: Option<String>,

    /// Synergy knowledge file (JSON); built-in data when absent
    #[arg(short, long)]
    pub knowledge: Option<PathBuf>,
}

pub async fn run(args: &ServeArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let addr = args
        .addr
        .clone()
        .unwrap_or_else(|| ctx.config.listen_addr.clone());
    let knowledge_path = args
        .knowledge
        .as_deref()
        .or(ctx.config.knowledge_path.as_deref());

    let knowledge = Arc::new(SynergyKnowledge::load_or_builtin(knowledge_path));
    let state = Arc::new(AppState::new(ctx.store.clone(), knowledge));

    run_server(state, &addr).await
}
