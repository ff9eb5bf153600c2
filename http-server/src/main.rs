use axum::{
    Router,
    routing::{get, post},
};
use engine::affiliate::AffiliateLedger;
use engine::catalog::PoolCatalog;
use engine::gamification::{GamificationEngine, LevelCurve};
use engine::ledger::AccountLedger;
use engine::types::OptionSpec;
use engine::wagering::WageringEngine;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

mod locale;
mod middleware;
mod models;
mod routes;

use models::InMemoryStorage;
use routes::affiliates::{get_affiliate_summary, record_referral, withdraw_commissions};
use routes::gamification::get_gamification;
use routes::pools::{close_pool, list_pools, open_pool, settle_pool};
use routes::users::{complete_profile, get_profile, login};
use routes::wagers::{list_wagers, place_wager};
use routes::wallet::{
    confirm_settlement, create_deposit, create_withdrawal, export_transactions, get_wallet,
    list_transactions,
};

/// All engine components behind a single lock, so check-then-act
/// sequences (balance check before a debit, the settlement status guard)
/// cannot interleave across requests.
pub struct Platform {
    pub ledger: AccountLedger,
    pub catalog: PoolCatalog,
    pub wagering: WageringEngine,
    pub affiliates: AffiliateLedger,
    pub gamification: GamificationEngine,
}

impl Platform {
    pub fn new() -> Self {
        Platform {
            ledger: AccountLedger::new(),
            catalog: PoolCatalog::new(),
            wagering: WageringEngine::new(),
            affiliates: AffiliateLedger::new(),
            gamification: GamificationEngine::new(LevelCurve::Linear { xp_per_level: 250 }),
        }
    }
}

// Application state containing the platform and in-memory session storage
#[derive(Clone)]
pub struct AppState {
    pub platform: Arc<Mutex<Platform>>,
    pub storage: InMemoryStorage,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    // Initialize in-memory storage
    let storage = InMemoryStorage::new();
    tracing::info!("In-memory storage initialized successfully");

    // Seed the catalog with a pair of open pools
    let mut platform = Platform::new();
    platform.catalog.open_pool(
        "Flamengo vs Corinthians",
        "futebol",
        vec![
            OptionSpec {
                name: "Flamengo".to_string(),
                odds: 185,
            },
            OptionSpec {
                name: "Corinthians".to_string(),
                odds: 210,
            },
            OptionSpec {
                name: "Empate".to_string(),
                odds: 350,
            },
        ],
        25_000_00,
        end_date_in_days(7),
    )?;
    platform.catalog.open_pool(
        "São Paulo vs Palmeiras",
        "futebol",
        vec![
            OptionSpec {
                name: "São Paulo".to_string(),
                odds: 240,
            },
            OptionSpec {
                name: "Palmeiras".to_string(),
                odds: 195,
            },
            OptionSpec {
                name: "Empate".to_string(),
                odds: 320,
            },
        ],
        35_000_00,
        end_date_in_days(14),
    )?;
    tracing::info!("Pool catalog seeded");

    let state = AppState {
        platform: Arc::new(Mutex::new(platform)),
        storage,
    };

    // build our application with routes
    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/settlements/{tx_id}", post(confirm_settlement))
        .route("/{locale}/login", post(login))
        .route("/{locale}/profile", get(get_profile))
        .route("/{locale}/profile/complete", post(complete_profile))
        .route("/{locale}/wallet", get(get_wallet))
        .route("/{locale}/wallet/deposits", post(create_deposit))
        .route("/{locale}/wallet/withdrawals", post(create_withdrawal))
        .route("/{locale}/wallet/transactions", get(list_transactions))
        .route(
            "/{locale}/wallet/transactions/export",
            get(export_transactions),
        )
        .route("/{locale}/pools", get(list_pools).post(open_pool))
        .route("/{locale}/pools/{id}/close", post(close_pool))
        .route("/{locale}/pools/{id}/settle", post(settle_pool))
        .route("/{locale}/wagers", get(list_wagers).post(place_wager))
        .route("/{locale}/affiliates", get(get_affiliate_summary))
        .route("/{locale}/affiliates/referrals", post(record_referral))
        .route(
            "/{locale}/affiliates/withdrawals",
            post(withdraw_commissions),
        )
        .route("/{locale}/gamification", get(get_gamification))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state);

    // run our app with hyper, listening globally on port 6957
    let listener = tokio::net::TcpListener::bind("0.0.0.0:6957").await?;
    tracing::info!("Server running on http://0.0.0.0:6957");
    axum::serve(listener, app).await?;

    Ok(())
}

/// End date `days` from now, in epoch milliseconds.
fn end_date_in_days(days: u64) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64;
    now + days * 24 * 60 * 60 * 1_000
}

// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// Root endpoint
async fn root() -> &'static str {
    "Bolão API - POST /{locale}/login to authenticate, GET /{locale}/pools to browse pools, POST /{locale}/wagers to place a wager"
}
