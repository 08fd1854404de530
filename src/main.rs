use std::env;
use std::sync::Arc;

use flinkly::app;
use flinkly::services::catalog::{GigRepository, InMemoryCatalog, PgCatalog};
use flinkly::utils::secret::get_secret;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "flinkly=info".into());
    let json = env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn build_catalog() -> Result<Arc<dyn GigRepository>, Box<dyn std::error::Error>> {
    if let Some(database_url) = get_secret("DATABASE_URL_FILE", "DATABASE_URL") {
        info!("Using [PgCatalog]");
        let db_pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&database_url)
            .await?;
        let catalog = PgCatalog::new(db_pool);
        catalog.migrate().await?;
        return Ok(Arc::new(catalog));
    }

    warn!("DATABASE_URL not set, running with [InMemoryCatalog]");
    let catalog = match env::var("GIGS_SEED_FILE") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)?;
            let catalog = InMemoryCatalog::from_json(&raw)?;
            info!(%path, gigs = catalog.len(), "Seeded catalog");
            catalog
        }
        Err(_) => InMemoryCatalog::new(),
    };
    Ok(Arc::new(catalog))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let catalog = build_catalog().await?;
    let app = app(catalog);

    let addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8090".to_string());
    let listener = TcpListener::bind(&addr).await?;
    info!("Server starting at http://{}", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
