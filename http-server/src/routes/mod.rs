pub mod affiliates;
pub mod gamification;
pub mod pools;
pub mod users;
pub mod wagers;
pub mod wallet;

use axum::http::StatusCode;
use engine::errors::EngineError;
use rand::Rng;

/// Maps engine rejections onto HTTP status codes. Everything is a
/// request-rejection; nothing here is a server fault.
pub fn error_status(err: &EngineError) -> StatusCode {
    match err {
        EngineError::PoolNotFound
        | EngineError::OptionNotFound
        | EngineError::TransactionNotFound => StatusCode::NOT_FOUND,
        EngineError::AlreadySettled | EngineError::TransactionNotPending => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    }
}

/// Reference codes in the prototype's style: prefix plus six digits,
/// e.g. "PIX123456", "BET789012", "WDR901234".
pub fn reference_code(prefix: &str) -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{prefix}{n:06}")
}
