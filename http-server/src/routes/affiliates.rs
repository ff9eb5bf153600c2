use axum::{Json, extract::State, http::StatusCode};
use engine::types::{Commission, CommissionStatus, XpAction};
use serde::{Deserialize, Serialize};

use crate::{AppState, locale::Locale, middleware::AuthUser};

use super::error_status;

/// Commission accrued when a referred user signs up, in centavos.
const SIGNUP_COMMISSION: u64 = 2_500;

// Referral request
#[derive(Deserialize)]
pub struct ReferralRequest {
    pub referred_account_id: u64,
}

// Referral response
#[derive(Serialize)]
pub struct ReferralResponse {
    pub success: bool,
    pub message: String,
    /// False when the pair was already recorded (a no-op, not an error)
    pub recorded: bool,
}

// Record referral endpoint: idempotent per referred account
pub async fn record_referral(
    State(state): State<AppState>,
    locale: Locale,
    AuthUser(user): AuthUser,
    Json(payload): Json<ReferralRequest>,
) -> (StatusCode, Json<ReferralResponse>) {
    let mut guard = state.platform.lock().unwrap();
    let platform = &mut *guard;

    let recorded = platform
        .affiliates
        .record_referral(user.account_id, payload.referred_account_id);

    if recorded {
        // First time only: XP plus the signup commission accrual
        platform
            .gamification
            .award(user.account_id, XpAction::Referral);
        if let Err(err) = platform.affiliates.accrue_commission(
            user.account_id,
            payload.referred_account_id,
            SIGNUP_COMMISSION,
        ) {
            return (
                error_status(&err),
                Json(ReferralResponse {
                    success: false,
                    message: err.to_string(),
                    recorded,
                }),
            );
        }
    }

    (
        StatusCode::OK,
        Json(ReferralResponse {
            success: true,
            message: locale.messages().referral_recorded.to_string(),
            recorded,
        }),
    )
}

// Commission response model
#[derive(Serialize)]
pub struct CommissionResponse {
    pub id: u64,
    pub referred_user_id: u64,
    pub amount: u64,
    pub status: CommissionStatus,
}

impl CommissionResponse {
    fn from_commission(commission: &Commission) -> Self {
        CommissionResponse {
            id: commission.id,
            referred_user_id: commission.referred_user_id,
            amount: commission.amount,
            status: commission.status,
        }
    }
}

// Affiliate summary response
#[derive(Serialize)]
pub struct AffiliateSummaryResponse {
    pub success: bool,
    pub referral_count: usize,
    pub pending_total: u64,
    pub commissions: Vec<CommissionResponse>,
}

// Affiliate summary endpoint
pub async fn get_affiliate_summary(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> (StatusCode, Json<AffiliateSummaryResponse>) {
    let platform = state.platform.lock().unwrap();
    let response = AffiliateSummaryResponse {
        success: true,
        referral_count: platform.affiliates.referral_count(user.account_id),
        pending_total: platform.affiliates.pending_total(user.account_id),
        commissions: platform
            .affiliates
            .commissions_for(user.account_id)
            .into_iter()
            .map(CommissionResponse::from_commission)
            .collect(),
    };
    (StatusCode::OK, Json(response))
}

// Commission withdrawal response
#[derive(Serialize)]
pub struct CommissionWithdrawalResponse {
    pub success: bool,
    pub message: String,
    /// Total moved into the wallet, centavos
    pub amount: Option<u64>,
    pub balance: i64,
}

// Commission withdrawal endpoint: pays all pending commissions into the
// account ledger as one payout transaction
pub async fn withdraw_commissions(
    State(state): State<AppState>,
    locale: Locale,
    AuthUser(user): AuthUser,
) -> (StatusCode, Json<CommissionWithdrawalResponse>) {
    let mut guard = state.platform.lock().unwrap();
    let platform = &mut *guard;

    match platform
        .affiliates
        .withdraw_commissions(user.account_id, &mut platform.ledger)
    {
        Ok(amount) => (
            StatusCode::OK,
            Json(CommissionWithdrawalResponse {
                success: true,
                message: locale.messages().commissions_withdrawn.to_string(),
                amount: Some(amount),
                balance: platform.ledger.balance(user.account_id),
            }),
        ),
        Err(err) => (
            error_status(&err),
            Json(CommissionWithdrawalResponse {
                success: false,
                message: err.to_string(),
                amount: None,
                balance: platform.ledger.balance(user.account_id),
            }),
        ),
    }
}
