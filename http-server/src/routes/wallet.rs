use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use engine::export;
use engine::types::{Transaction, TransactionKind, TransactionStatus};
use serde::{Deserialize, Serialize};

use crate::{AppState, locale::Locale, middleware::AuthUser};

use super::{error_status, reference_code};

// Transaction response model
#[derive(Serialize)]
pub struct TransactionResponse {
    pub id: u64,
    pub timestamp: u64,
    pub kind: TransactionKind,
    pub amount: i64,
    pub status: TransactionStatus,
    pub description: String,
    pub reference: String,
}

impl TransactionResponse {
    pub fn from_transaction(transaction: &Transaction) -> Self {
        TransactionResponse {
            id: transaction.id,
            timestamp: transaction.timestamp,
            kind: transaction.kind,
            amount: transaction.amount,
            status: transaction.status,
            description: transaction.description.clone(),
            reference: transaction.reference.clone(),
        }
    }
}

// Wallet overview response
#[derive(Serialize)]
pub struct WalletResponse {
    pub success: bool,
    pub balance: i64,
    pub transactions: Vec<TransactionResponse>,
}

// Wallet overview endpoint: balance plus full history
pub async fn get_wallet(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> (StatusCode, Json<WalletResponse>) {
    let platform = state.platform.lock().unwrap();
    let response = WalletResponse {
        success: true,
        balance: platform.ledger.balance(user.account_id),
        transactions: platform
            .ledger
            .transactions(user.account_id)
            .iter()
            .map(TransactionResponse::from_transaction)
            .collect(),
    };
    (StatusCode::OK, Json(response))
}

// Deposit request
#[derive(Deserialize)]
pub struct DepositRequest {
    /// Amount in centavos
    pub amount: i64,
}

// Mutation response shared by deposit and withdrawal
#[derive(Serialize)]
pub struct WalletMutationResponse {
    pub success: bool,
    pub message: String,
    pub transaction_id: Option<u64>,
    pub balance: i64,
}

// Deposit endpoint: deposits complete immediately
pub async fn create_deposit(
    State(state): State<AppState>,
    locale: Locale,
    AuthUser(user): AuthUser,
    Json(payload): Json<DepositRequest>,
) -> (StatusCode, Json<WalletMutationResponse>) {
    let reference = reference_code("PIX");
    let mut platform = state.platform.lock().unwrap();

    if payload.amount <= 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(WalletMutationResponse {
                success: false,
                message: "Deposit amount must be greater than 0".to_string(),
                transaction_id: None,
                balance: platform.ledger.balance(user.account_id),
            }),
        );
    }

    match platform.ledger.record(
        user.account_id,
        TransactionKind::Deposit,
        payload.amount,
        TransactionStatus::Completed,
        "Depósito via Pix",
        &reference,
    ) {
        Ok(tx_id) => (
            StatusCode::CREATED,
            Json(WalletMutationResponse {
                success: true,
                message: locale.messages().deposit_confirmed.to_string(),
                transaction_id: Some(tx_id),
                balance: platform.ledger.balance(user.account_id),
            }),
        ),
        Err(err) => (
            error_status(&err),
            Json(WalletMutationResponse {
                success: false,
                message: err.to_string(),
                transaction_id: None,
                balance: platform.ledger.balance(user.account_id),
            }),
        ),
    }
}

// Withdrawal request
#[derive(Deserialize)]
pub struct WithdrawalRequest {
    /// Amount in centavos
    pub amount: u64,
    pub destination: Option<String>,
}

// Withdrawal endpoint: creates a pending transaction awaiting the
// payment provider's settlement callback
pub async fn create_withdrawal(
    State(state): State<AppState>,
    locale: Locale,
    AuthUser(user): AuthUser,
    Json(payload): Json<WithdrawalRequest>,
) -> (StatusCode, Json<WalletMutationResponse>) {
    let reference = reference_code("WDR");
    let destination = payload.destination.as_deref().unwrap_or("Pix");
    let mut platform = state.platform.lock().unwrap();

    match platform
        .ledger
        .request_withdrawal(user.account_id, payload.amount, destination, &reference)
    {
        Ok(tx_id) => (
            StatusCode::CREATED,
            Json(WalletMutationResponse {
                success: true,
                message: locale.messages().withdrawal_requested.to_string(),
                transaction_id: Some(tx_id),
                balance: platform.ledger.balance(user.account_id),
            }),
        ),
        Err(err) => (
            error_status(&err),
            Json(WalletMutationResponse {
                success: false,
                message: err.to_string(),
                transaction_id: None,
                balance: platform.ledger.balance(user.account_id),
            }),
        ),
    }
}

// History query parameters
#[derive(Deserialize)]
pub struct HistoryQuery {
    pub kind: Option<String>,
    pub search: Option<String>,
}

// History response
#[derive(Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub message: String,
    pub transactions: Vec<TransactionResponse>,
}

// Filtered transaction history endpoint
pub async fn list_transactions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<HistoryQuery>,
) -> (StatusCode, Json<HistoryResponse>) {
    // An unknown kind label is a rejection, not an empty result
    let kind = match params.kind.as_deref() {
        Some(label) => match label.parse::<TransactionKind>() {
            Ok(kind) => Some(kind),
            Err(err) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(HistoryResponse {
                        success: false,
                        message: err.to_string(),
                        transactions: Vec::new(),
                    }),
                );
            }
        },
        None => None,
    };

    let platform = state.platform.lock().unwrap();
    let transactions = platform
        .ledger
        .transactions_filtered(user.account_id, kind, params.search.as_deref())
        .into_iter()
        .map(TransactionResponse::from_transaction)
        .collect();

    (
        StatusCode::OK,
        Json(HistoryResponse {
            success: true,
            message: "History retrieved successfully".to_string(),
            transactions,
        }),
    )
}

// CSV export endpoint, in the prototype's download format
pub async fn export_transactions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> impl IntoResponse {
    let platform = state.platform.lock().unwrap();
    let csv = export::export_csv(platform.ledger.transactions(user.account_id));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"historico_transacoes.csv\"",
            ),
        ],
        csv,
    )
}

// Settlement callback response
#[derive(Serialize)]
pub struct SettlementCallbackResponse {
    pub success: bool,
    pub message: String,
    pub status: Option<TransactionStatus>,
}

// Payment-provider settlement callback. Providers post loosely shaped
// JSON, so the body is read as a raw value and only `status` matters:
// "completed" or "failed". Failed settlements are recorded, not retried.
pub async fn confirm_settlement(
    State(state): State<AppState>,
    Path(tx_id): Path<u64>,
    Json(payload): Json<serde_json::Value>,
) -> (StatusCode, Json<SettlementCallbackResponse>) {
    let success = match payload.get("status").and_then(|s| s.as_str()) {
        Some("completed") => true,
        Some("failed") => false,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(SettlementCallbackResponse {
                    success: false,
                    message: "status must be \"completed\" or \"failed\"".to_string(),
                    status: None,
                }),
            );
        }
    };

    let mut platform = state.platform.lock().unwrap();
    match platform.ledger.resolve_pending(tx_id, success) {
        Ok(status) => {
            if status == TransactionStatus::Failed {
                tracing::warn!("Settlement for transaction {} failed", tx_id);
            }
            (
                StatusCode::OK,
                Json(SettlementCallbackResponse {
                    success: true,
                    message: "Settlement recorded".to_string(),
                    status: Some(status),
                }),
            )
        }
        Err(err) => (
            error_status(&err),
            Json(SettlementCallbackResponse {
                success: false,
                message: err.to_string(),
                status: None,
            }),
        ),
    }
}
