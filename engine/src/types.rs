use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::EngineError;

/// All money is in integer centavos. Ledger amounts are signed:
/// credits positive, debits negative.
pub type Centavos = i64;

/// Odds in integer hundredths: 185 = 1.85x. Minimum valid odds is 100 (1.00x).
pub type CentiOdds = u32;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Wager,
    Payout,
    Bonus,
    Cashback,
}

impl TransactionKind {
    /// Portuguese label used in the CSV export's `Tipo` column.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "depósito",
            TransactionKind::Withdrawal => "saque",
            TransactionKind::Wager => "aposta",
            TransactionKind::Payout => "prêmio",
            TransactionKind::Bonus => "bônus",
            TransactionKind::Cashback => "cashback",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = EngineError;

    /// Accepts both the API labels and the CSV's Portuguese labels.
    /// Anything else is an `UnsupportedKind` rejection.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" | "depósito" => Ok(TransactionKind::Deposit),
            "withdrawal" | "saque" => Ok(TransactionKind::Withdrawal),
            "wager" | "aposta" => Ok(TransactionKind::Wager),
            "payout" | "prêmio" => Ok(TransactionKind::Payout),
            "bonus" | "bônus" => Ok(TransactionKind::Bonus),
            "cashback" => Ok(TransactionKind::Cashback),
            other => Err(EngineError::UnsupportedKind(other.to_string())),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pendente",
            TransactionStatus::Completed => "concluído",
            TransactionStatus::Failed => "falhou",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" | "pendente" => Ok(TransactionStatus::Pending),
            "completed" | "concluído" => Ok(TransactionStatus::Completed),
            "failed" | "falhou" => Ok(TransactionStatus::Failed),
            other => Err(EngineError::MalformedCsv(format!(
                "unknown status: {other}"
            ))),
        }
    }
}

/// One balance-affecting ledger entry. Immutable once completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u64,
    pub timestamp: u64,
    pub kind: TransactionKind,
    pub amount: Centavos,
    pub status: TransactionStatus,
    pub description: String,
    pub reference: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolStatus {
    Open,
    Closed,
    Settled,
}

impl PoolStatus {
    /// Lenient parse for filter query parameters.
    pub fn parse(s: &str) -> Option<PoolStatus> {
        match s {
            "open" => Some(PoolStatus::Open),
            "closed" => Some(PoolStatus::Closed),
            "settled" => Some(PoolStatus::Settled),
            _ => None,
        }
    }
}

/// A priced outcome within a pool (a team, a draw, etc).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolOption {
    pub id: u64,
    pub name: String,
    pub odds: CentiOdds,
}

/// Outcome name and odds as supplied when opening a pool; ids are
/// assigned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub name: String,
    pub odds: CentiOdds,
}

/// A shared betting pot tied to a real-world sporting event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub id: u64,
    pub event: String,
    pub sport: String,
    pub participant_count: u64,
    pub prize_total: u64,
    pub end_date: u64,
    pub status: PoolStatus,
    pub options: Vec<PoolOption>,
    /// Exactly one option once the pool is settled, `None` before.
    pub winning_option: Option<u64>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WagerOutcome {
    Pending,
    Won,
    Lost,
}

/// A stake against one pool option. Odds are captured at placement time
/// and never re-priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wager {
    pub id: u64,
    pub account_id: u64,
    pub pool_id: u64,
    pub option_id: u64,
    pub stake: u64,
    pub odds: CentiOdds,
    pub placed_at: u64,
    pub outcome: WagerOutcome,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
    Pending,
    Paid,
}

/// Affiliate earnings owed for a referred user's qualifying activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commission {
    pub id: u64,
    pub referrer_id: u64,
    pub referred_user_id: u64,
    pub amount: u64,
    pub status: CommissionStatus,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpAction {
    Login,
    WagerPlaced,
    WagerWon,
    Referral,
    ProfileCompleted,
}

impl XpAction {
    /// Fixed point table.
    pub fn points(&self) -> u64 {
        match self {
            XpAction::Login => 10,
            XpAction::WagerPlaced => 20,
            XpAction::WagerWon => 50,
            XpAction::Referral => 100,
            XpAction::ProfileCompleted => 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamificationProfile {
    pub account_id: u64,
    pub level: u32,
    pub current_xp: u64,
    pub next_level_threshold_xp: u64,
}
