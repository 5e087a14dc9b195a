mod api;
mod export;
mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use donorwatch_core::Config;
use donorwatch_ingest::FecImporter;
use donorwatch_rules::RuleLoader;

use state::AppState;

fn load_config() -> Config {
    donorwatch_core::config::load_dotenv();
    Config::from_env()
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let records = FecImporter::import(&config.data.fec_file)?;
    let loader = RuleLoader::new(config.data.rules_dir.clone());
    let (rules, _load_results) = loader.load_all()?;

    info!(
        records = records.len(),
        rules = rules.len(),
        "snapshot ready"
    );

    let state = Arc::new(AppState { records, rules });

    let app = Router::new()
        .route("/ping", get(api::ping))
        .route("/search", post(api::search))
        .route("/upload", post(api::upload))
        .route("/export", post(api::export))
        .route("/compliance", post(api::compliance))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let config = load_config();
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("serve") | None => serve(&config).await?,
        _ => {
            println!("donorwatch v0.1.0");
            println!("Usage: server [serve]");
            println!("  serve    Load the FEC snapshot and rule set, then start the HTTP server");
            println!();
            println!("Environment: DONORWATCH_DATA_FILE, DONORWATCH_RULES_DIR, SERVER_HOST, SERVER_PORT");
        }
    }

    Ok(())
}
