use axum::{Json, extract::State, http::StatusCode};
use engine::types::{GamificationProfile, XpAction};
use serde::Serialize;

use crate::{AppState, middleware::AuthUser};

#[derive(Serialize)]
pub struct XpPointsResponse {
    pub action: XpAction,
    pub points: u64,
}

// Gamification response: profile snapshot plus the point table
#[derive(Serialize)]
pub struct GamificationResponse {
    pub success: bool,
    pub profile: GamificationProfile,
    pub point_table: Vec<XpPointsResponse>,
}

// Gamification profile endpoint
pub async fn get_gamification(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> (StatusCode, Json<GamificationResponse>) {
    let platform = state.platform.lock().unwrap();

    let point_table = [
        XpAction::Login,
        XpAction::WagerPlaced,
        XpAction::WagerWon,
        XpAction::Referral,
        XpAction::ProfileCompleted,
    ]
    .into_iter()
    .map(|action| XpPointsResponse {
        action,
        points: action.points(),
    })
    .collect();

    let response = GamificationResponse {
        success: true,
        profile: platform.gamification.profile(user.account_id),
        point_table,
    };
    (StatusCode::OK, Json(response))
}
