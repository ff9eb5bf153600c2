use thiserror::Error;

/// Request-rejection errors. None of these are fatal: every failing
/// operation leaves the ledger, catalog, and wager stores unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("amount must not be zero")]
    InvalidAmount,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("pool is not open")]
    PoolClosed,
    #[error("pool already settled")]
    AlreadySettled,
    #[error("stake must be greater than zero")]
    InvalidStake,
    #[error("a pool needs at least two options, each with odds of 1.00 or higher")]
    InvalidOptions,
    #[error("no pending commissions")]
    NoPendingCommissions,
    #[error("unsupported transaction kind: {0}")]
    UnsupportedKind(String),
    #[error("pool not found")]
    PoolNotFound,
    #[error("option not found")]
    OptionNotFound,
    #[error("transaction not found")]
    TransactionNotFound,
    #[error("transaction is not pending")]
    TransactionNotPending,
    #[error("malformed csv: {0}")]
    MalformedCsv(String),
}
