use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::errors::EngineError;
use crate::types::{Centavos, Transaction, TransactionKind, TransactionStatus};

#[inline(always)]
pub(crate) fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

/// Append-only per-account transaction ledger.
///
/// Balance = sum of all completed transaction amounts. Pending entries
/// never contribute; they sit in the ledger until an external settlement
/// confirmation resolves them to completed or failed.
pub struct AccountLedger {
    accounts: HashMap<u64, Vec<Transaction>>,
    /// Transaction id -> owning account, for settlement callbacks.
    index: HashMap<u64, u64>,
    tx_id_counter: u64,
}

impl AccountLedger {
    pub fn new() -> Self {
        AccountLedger {
            accounts: HashMap::new(),
            index: HashMap::new(),
            tx_id_counter: 0,
        }
    }

    /// Appends an entry to the account's ledger and returns its id.
    pub fn record(
        &mut self,
        account_id: u64,
        kind: TransactionKind,
        amount: Centavos,
        status: TransactionStatus,
        description: &str,
        reference: &str,
    ) -> Result<u64, EngineError> {
        if amount == 0 {
            return Err(EngineError::InvalidAmount);
        }

        let tx_id = self.tx_id_counter;
        self.tx_id_counter += 1;

        let transaction = Transaction {
            id: tx_id,
            timestamp: current_timestamp_ms(),
            kind,
            amount,
            status,
            description: description.to_string(),
            reference: reference.to_string(),
        };

        self.accounts.entry(account_id).or_default().push(transaction);
        self.index.insert(tx_id, account_id);
        Ok(tx_id)
    }

    /// Sum of completed transaction amounts. Unknown accounts read as 0.
    pub fn balance(&self, account_id: u64) -> Centavos {
        self.accounts
            .get(&account_id)
            .map(|transactions| {
                transactions
                    .iter()
                    .filter(|t| t.status == TransactionStatus::Completed)
                    .map(|t| t.amount)
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Creates a pending withdrawal awaiting external settlement
    /// confirmation. The debit is checked against the completed-only
    /// balance before anything is written.
    pub fn request_withdrawal(
        &mut self,
        account_id: u64,
        amount: u64,
        destination: &str,
        reference: &str,
    ) -> Result<u64, EngineError> {
        if amount == 0 {
            return Err(EngineError::InvalidAmount);
        }
        if amount as Centavos > self.balance(account_id) {
            return Err(EngineError::InsufficientFunds);
        }

        self.record(
            account_id,
            TransactionKind::Withdrawal,
            -(amount as Centavos),
            TransactionStatus::Pending,
            &format!("Saque via {destination}"),
            reference,
        )
    }

    /// Settlement callback from the payment provider: transitions a
    /// pending transaction to completed or failed. Failures are recorded,
    /// never retried automatically.
    pub fn resolve_pending(
        &mut self,
        tx_id: u64,
        success: bool,
    ) -> Result<TransactionStatus, EngineError> {
        let account_id = *self
            .index
            .get(&tx_id)
            .ok_or(EngineError::TransactionNotFound)?;

        let transaction = self
            .accounts
            .get_mut(&account_id)
            .and_then(|transactions| transactions.iter_mut().find(|t| t.id == tx_id))
            .ok_or(EngineError::TransactionNotFound)?;

        if transaction.status != TransactionStatus::Pending {
            return Err(EngineError::TransactionNotPending);
        }

        transaction.status = if success {
            TransactionStatus::Completed
        } else {
            TransactionStatus::Failed
        };
        Ok(transaction.status)
    }

    /// Chronological transaction history for an account.
    pub fn transactions(&self, account_id: u64) -> &[Transaction] {
        self.accounts
            .get(&account_id)
            .map(|transactions| transactions.as_slice())
            .unwrap_or(&[])
    }

    /// History filtered by kind and/or a case-insensitive substring match
    /// over description and reference.
    pub fn transactions_filtered(
        &self,
        account_id: u64,
        kind: Option<TransactionKind>,
        search: Option<&str>,
    ) -> Vec<&Transaction> {
        let search_lower = search.map(|s| s.to_lowercase());
        self.transactions(account_id)
            .iter()
            .filter(|t| kind.is_none_or(|k| t.kind == k))
            .filter(|t| {
                search_lower.as_ref().is_none_or(|q| {
                    t.description.to_lowercase().contains(q)
                        || t.reference.to_lowercase().contains(q)
                })
            })
            .collect()
    }
}

impl Default for AccountLedger {
    fn default() -> Self {
        Self::new()
    }
}
