use axum::{Json, extract::State, http::StatusCode};
use engine::types::{Wager, WagerOutcome, XpAction};
use serde::{Deserialize, Serialize};

use crate::{AppState, locale::Locale, middleware::AuthUser};

use super::{error_status, reference_code};

// Place wager request
#[derive(Deserialize)]
pub struct PlaceWagerRequest {
    pub pool_id: u64,
    pub option_id: u64,
    /// Stake in centavos
    pub stake: u64,
}

// Place wager response
#[derive(Serialize)]
pub struct PlaceWagerResponse {
    pub success: bool,
    pub message: String,
    pub wager_id: Option<u64>,
    /// Stake x odds at placement, centavos, rounded half-up
    pub potential_payout: Option<u64>,
    pub balance: i64,
}

// Wager response model
#[derive(Serialize)]
pub struct WagerResponse {
    pub id: u64,
    pub pool_id: u64,
    pub option_id: u64,
    pub stake: u64,
    pub odds: u32,
    pub placed_at: u64,
    pub outcome: WagerOutcome,
    pub potential_payout: u64,
}

impl WagerResponse {
    pub fn from_wager(wager: &Wager) -> Self {
        WagerResponse {
            id: wager.id,
            pool_id: wager.pool_id,
            option_id: wager.option_id,
            stake: wager.stake,
            odds: wager.odds,
            placed_at: wager.placed_at,
            outcome: wager.outcome,
            potential_payout: engine::wagering::potential_payout(wager.stake, wager.odds),
        }
    }
}

// Place wager endpoint: debits the stake and captures the odds
pub async fn place_wager(
    State(state): State<AppState>,
    locale: Locale,
    AuthUser(user): AuthUser,
    Json(payload): Json<PlaceWagerRequest>,
) -> (StatusCode, Json<PlaceWagerResponse>) {
    let reference = reference_code("BET");
    let mut guard = state.platform.lock().unwrap();
    let platform = &mut *guard;

    match platform.wagering.place_wager(
        &mut platform.ledger,
        &mut platform.catalog,
        user.account_id,
        payload.pool_id,
        payload.option_id,
        payload.stake,
        &reference,
    ) {
        Ok((wager_id, potential_payout)) => {
            platform
                .gamification
                .award(user.account_id, XpAction::WagerPlaced);
            (
                StatusCode::CREATED,
                Json(PlaceWagerResponse {
                    success: true,
                    message: locale.messages().wager_placed.to_string(),
                    wager_id: Some(wager_id),
                    potential_payout: Some(potential_payout),
                    balance: platform.ledger.balance(user.account_id),
                }),
            )
        }
        Err(err) => (
            error_status(&err),
            Json(PlaceWagerResponse {
                success: false,
                message: err.to_string(),
                wager_id: None,
                potential_payout: None,
                balance: platform.ledger.balance(user.account_id),
            }),
        ),
    }
}

// Wager listing response
#[derive(Serialize)]
pub struct ListWagersResponse {
    pub success: bool,
    pub wagers: Vec<WagerResponse>,
}

// List the authenticated user's wagers
pub async fn list_wagers(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> (StatusCode, Json<ListWagersResponse>) {
    let platform = state.platform.lock().unwrap();
    let wagers = platform
        .wagering
        .wagers_for(user.account_id)
        .into_iter()
        .map(WagerResponse::from_wager)
        .collect();

    (
        StatusCode::OK,
        Json(ListWagersResponse {
            success: true,
            wagers,
        }),
    )
}
