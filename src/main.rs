use std::net::SocketAddr;
use std::sync::Arc;
use tradeflow::{
    api, config::Config, db::init_db, AdvisoryGateway, GeminiAdvisor, LedgerStore, Repository,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let store = match &config.database_path {
        Some(path) => {
            let pool = match init_db(path).await {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Failed to initialize database: {}", e);
                    std::process::exit(1);
                }
            };
            match LedgerStore::load(Arc::new(Repository::new(pool))).await {
                Ok(store) => store,
                Err(e) => {
                    eprintln!("Failed to load ledger: {}", e);
                    std::process::exit(1);
                }
            }
        }
        None => {
            tracing::info!("DATABASE_PATH not set, ledger is kept in memory only");
            LedgerStore::in_memory()
        }
    };

    let advisory = match &config.advisor_api_key {
        Some(key) => AdvisoryGateway::new(
            Arc::new(GeminiAdvisor::new(
                config.advisor_api_url.clone(),
                key.clone(),
                config.advisor_model.clone(),
                config.advisor_timeout,
            )),
            config.advisor_timeout,
        ),
        None => {
            tracing::info!("ADVISOR_API_KEY not set, price advice uses the local markup");
            AdvisoryGateway::disabled()
        }
    };

    let app = api::create_router(api::AppState::new(store, advisory));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
