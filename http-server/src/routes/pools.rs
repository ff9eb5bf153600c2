use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::catalog::PoolFilter;
use engine::types::{OptionSpec, Pool, PoolOption, PoolStatus, XpAction};
use engine::wagering::SettlementEntry;
use serde::{Deserialize, Serialize};

use crate::{AppState, locale::Locale, middleware::AuthUser};

use super::error_status;

// Pool listing query parameters
#[derive(Deserialize)]
pub struct PoolsQuery {
    pub sport: Option<String>,
    pub status: Option<String>,
}

// Pool response model
#[derive(Serialize)]
pub struct PoolResponse {
    pub id: u64,
    pub event: String,
    pub sport: String,
    pub participant_count: u64,
    pub prize_total: u64,
    pub end_date: u64,
    pub status: PoolStatus,
    pub options: Vec<PoolOptionResponse>,
    pub winning_option: Option<u64>,
}

#[derive(Serialize)]
pub struct PoolOptionResponse {
    pub id: u64,
    pub name: String,
    pub odds: u32,
}

impl PoolResponse {
    pub fn from_pool(pool: &Pool) -> Self {
        PoolResponse {
            id: pool.id,
            event: pool.event.clone(),
            sport: pool.sport.clone(),
            participant_count: pool.participant_count,
            prize_total: pool.prize_total,
            end_date: pool.end_date,
            status: pool.status,
            options: pool.options.iter().map(PoolOptionResponse::from_option).collect(),
            winning_option: pool.winning_option,
        }
    }
}

impl PoolOptionResponse {
    fn from_option(option: &PoolOption) -> Self {
        PoolOptionResponse {
            id: option.id,
            name: option.name.clone(),
            odds: option.odds,
        }
    }
}

// Pool listing response
#[derive(Serialize)]
pub struct ListPoolsResponse {
    pub success: bool,
    pub message: String,
    pub pools: Vec<PoolResponse>,
}

// Public pool listing, ascending by end date
pub async fn list_pools(
    State(state): State<AppState>,
    Query(params): Query<PoolsQuery>,
) -> (StatusCode, Json<ListPoolsResponse>) {
    let status = match params.status.as_deref() {
        Some(label) => match PoolStatus::parse(label) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ListPoolsResponse {
                        success: false,
                        message: format!("Unknown pool status '{label}'"),
                        pools: Vec::new(),
                    }),
                );
            }
        },
        None => None,
    };

    let filter = PoolFilter {
        sport: params.sport,
        status,
    };

    let platform = state.platform.lock().unwrap();
    let pools = platform
        .catalog
        .list(&filter)
        .into_iter()
        .map(PoolResponse::from_pool)
        .collect();

    (
        StatusCode::OK,
        Json(ListPoolsResponse {
            success: true,
            message: "Pools retrieved successfully".to_string(),
            pools,
        }),
    )
}

// Open pool request
#[derive(Deserialize)]
pub struct OpenPoolRequest {
    pub event: String,
    pub sport: String,
    pub options: Vec<OptionSpec>,
    #[serde(default)]
    pub prize_seed: u64,
    pub end_date: u64,
}

// Open pool response
#[derive(Serialize)]
pub struct OpenPoolResponse {
    pub success: bool,
    pub message: String,
    pub pool_id: Option<u64>,
}

// Open pool endpoint
pub async fn open_pool(
    State(state): State<AppState>,
    locale: Locale,
    AuthUser(_user): AuthUser,
    Json(payload): Json<OpenPoolRequest>,
) -> (StatusCode, Json<OpenPoolResponse>) {
    let mut platform = state.platform.lock().unwrap();
    match platform.catalog.open_pool(
        &payload.event,
        &payload.sport,
        payload.options,
        payload.prize_seed,
        payload.end_date,
    ) {
        Ok(pool_id) => (
            StatusCode::CREATED,
            Json(OpenPoolResponse {
                success: true,
                message: locale.messages().pool_opened.to_string(),
                pool_id: Some(pool_id),
            }),
        ),
        Err(err) => (
            error_status(&err),
            Json(OpenPoolResponse {
                success: false,
                message: err.to_string(),
                pool_id: None,
            }),
        ),
    }
}

// Close pool response
#[derive(Serialize)]
pub struct ClosePoolResponse {
    pub success: bool,
    pub message: String,
}

// Close pool endpoint: parks a pool past its event date until settlement
pub async fn close_pool(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path((_locale, pool_id)): Path<(String, u64)>,
) -> (StatusCode, Json<ClosePoolResponse>) {
    let mut platform = state.platform.lock().unwrap();
    match platform.catalog.close_pool(pool_id) {
        Ok(()) => (
            StatusCode::OK,
            Json(ClosePoolResponse {
                success: true,
                message: "Pool closed".to_string(),
            }),
        ),
        Err(err) => (
            error_status(&err),
            Json(ClosePoolResponse {
                success: false,
                message: err.to_string(),
            }),
        ),
    }
}

// Settle pool request
#[derive(Deserialize)]
pub struct SettlePoolRequest {
    pub winning_option_id: u64,
}

// Settle pool response
#[derive(Serialize)]
pub struct SettlePoolResponse {
    pub success: bool,
    pub message: String,
    pub settlements: Vec<SettlementEntry>,
}

// Settle pool endpoint: credits winners and awards their XP
pub async fn settle_pool(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path((locale, pool_id)): Path<(String, u64)>,
    Json(payload): Json<SettlePoolRequest>,
) -> (StatusCode, Json<SettlePoolResponse>) {
    let locale = Locale::parse(&locale);
    let mut guard = state.platform.lock().unwrap();
    let platform = &mut *guard;

    match platform.wagering.settle_pool(
        &mut platform.ledger,
        &mut platform.catalog,
        pool_id,
        payload.winning_option_id,
    ) {
        Ok(settlements) => {
            for entry in settlements.iter().filter(|e| e.payout > 0) {
                platform
                    .gamification
                    .award(entry.account_id, XpAction::WagerWon);
            }
            tracing::info!(
                "Pool {} settled, {} wagers resolved",
                pool_id,
                settlements.len()
            );
            (
                StatusCode::OK,
                Json(SettlePoolResponse {
                    success: true,
                    message: locale.messages().pool_settled.to_string(),
                    settlements,
                }),
            )
        }
        Err(err) => (
            error_status(&err),
            Json(SettlePoolResponse {
                success: false,
                message: err.to_string(),
                settlements: Vec::new(),
            }),
        ),
    }
}
