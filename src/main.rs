use std::sync::{Arc, Mutex};

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use okoshko::config::{AppConfig, BusySource, PersistenceBackend};
use okoshko::db;
use okoshko::handlers;
use okoshko::services::clock::SystemClock;
use okoshko::services::collaborators::fallback::{DefaultCatalog, PlaceholderBusySource};
use okoshko::services::collaborators::sqlite::SqliteStore;
use okoshko::services::collaborators::supabase::SupabaseStore;
use okoshko::services::collaborators::{BookingLedger, BookingSink, BusySlotSource, ServiceCatalog};
use okoshko::services::session::SessionStore;
use okoshko::state::AppState;

type Collaborators = (
    Box<dyn ServiceCatalog>,
    Box<dyn BusySlotSource>,
    Box<dyn BookingSink>,
    Box<dyn BookingLedger>,
);

fn supabase_collaborators(config: &AppConfig) -> anyhow::Result<Collaborators> {
    anyhow::ensure!(
        !config.supabase_url.is_empty() && !config.supabase_anon_key.is_empty(),
        "SUPABASE_URL and SUPABASE_ANON_KEY must be set when PERSISTENCE_BACKEND=supabase"
    );
    let window = config.working_window()?;
    let store = || {
        SupabaseStore::new(
            config.supabase_url.clone(),
            config.supabase_anon_key.clone(),
            window,
        )
    };
    let catalog: Box<dyn ServiceCatalog> = Box::new(store());
    let busy: Box<dyn BusySlotSource> = Box::new(store());
    let sink: Box<dyn BookingSink> = Box::new(store());
    let ledger: Box<dyn BookingLedger> = Box::new(store());
    Ok((catalog, busy, sink, ledger))
}

fn sqlite_collaborators(store: &SqliteStore) -> Collaborators {
    let catalog: Box<dyn ServiceCatalog> = Box::new(store.clone());
    let busy: Box<dyn BusySlotSource> = Box::new(store.clone());
    let sink: Box<dyn BookingSink> = Box::new(store.clone());
    let ledger: Box<dyn BookingLedger> = Box::new(store.clone());
    (catalog, busy, sink, ledger)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    let window = config.working_window()?;

    let db = Arc::new(Mutex::new(db::init_db(&config.database_url)?));
    let local = SqliteStore::new(Arc::clone(&db), window);

    let (mut catalog, mut busy, sink, ledger): Collaborators = match config.persistence_backend {
        PersistenceBackend::Supabase => {
            tracing::info!(url = %config.supabase_url, "using Supabase persistence");
            supabase_collaborators(&config)?
        }
        PersistenceBackend::Sqlite => {
            tracing::info!(path = %config.database_url, "using SQLite persistence");
            sqlite_collaborators(&local)
        }
    };

    if config.demo_catalog {
        tracing::info!("serving the demo service catalog");
        catalog = Box::new(DefaultCatalog);
    }
    if config.busy_source == BusySource::Placeholder {
        tracing::info!("using placeholder busy slots");
        busy = Box::new(PlaceholderBusySource);
    }

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        catalog,
        busy,
        sink,
        ledger,
        counters: Box::new(local),
        clock: Box::new(SystemClock),
        sessions: SessionStore::new(config.session_ttl()),
    });

    let sweeper = Arc::clone(&state);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            ticker.tick().await;
            match sweeper.sessions.purge_expired() {
                Ok(0) => {}
                Ok(expired) => tracing::info!(expired, "purged idle wizard sessions"),
                Err(e) => tracing::warn!(error = %e, "session sweep failed"),
            }
        }
    });

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
