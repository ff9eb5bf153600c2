use std::collections::HashMap;

use crate::errors::EngineError;
use crate::ledger::AccountLedger;
use crate::types::{Commission, CommissionStatus, TransactionKind, TransactionStatus};

/// Tracks referred users and commission accrual per referrer,
/// independent of the account ledger until commissions are withdrawn
/// into it.
pub struct AffiliateLedger {
    referrals: HashMap<u64, Vec<u64>>,
    commissions: Vec<Commission>,
    commission_id_counter: u64,
}

impl AffiliateLedger {
    pub fn new() -> Self {
        AffiliateLedger {
            referrals: HashMap::new(),
            commissions: Vec::new(),
            commission_id_counter: 0,
        }
    }

    /// Idempotent per (referrer, referred) pair. Returns `true` the
    /// first time, `false` for a duplicate (a no-op, not an error).
    pub fn record_referral(&mut self, referrer_id: u64, referred_user_id: u64) -> bool {
        let referred = self.referrals.entry(referrer_id).or_default();
        if referred.contains(&referred_user_id) {
            return false;
        }
        referred.push(referred_user_id);
        true
    }

    pub fn referral_count(&self, referrer_id: u64) -> usize {
        self.referrals
            .get(&referrer_id)
            .map(|r| r.len())
            .unwrap_or(0)
    }

    /// Appends a pending commission for a referred user's qualifying
    /// action.
    pub fn accrue_commission(
        &mut self,
        referrer_id: u64,
        referred_user_id: u64,
        amount: u64,
    ) -> Result<u64, EngineError> {
        if amount == 0 {
            return Err(EngineError::InvalidAmount);
        }
        let id = self.commission_id_counter;
        self.commission_id_counter += 1;
        self.commissions.push(Commission {
            id,
            referrer_id,
            referred_user_id,
            amount,
            status: CommissionStatus::Pending,
        });
        Ok(id)
    }

    pub fn commissions_for(&self, referrer_id: u64) -> Vec<&Commission> {
        self.commissions
            .iter()
            .filter(|c| c.referrer_id == referrer_id)
            .collect()
    }

    /// Sum of the referrer's pending commissions.
    pub fn pending_total(&self, referrer_id: u64) -> u64 {
        self.commissions
            .iter()
            .filter(|c| c.referrer_id == referrer_id && c.status == CommissionStatus::Pending)
            .map(|c| c.amount)
            .sum()
    }

    /// Moves every pending commission into the account ledger as one
    /// completed payout transaction and marks them paid. Returns the
    /// amount paid out.
    pub fn withdraw_commissions(
        &mut self,
        referrer_id: u64,
        ledger: &mut AccountLedger,
    ) -> Result<u64, EngineError> {
        let total = self.pending_total(referrer_id);
        if total == 0 {
            return Err(EngineError::NoPendingCommissions);
        }

        ledger.record(
            referrer_id,
            TransactionKind::Payout,
            total as i64,
            TransactionStatus::Completed,
            "Comissões de afiliado",
            &format!("AFF{referrer_id:06}"),
        )?;

        for commission in self
            .commissions
            .iter_mut()
            .filter(|c| c.referrer_id == referrer_id && c.status == CommissionStatus::Pending)
        {
            commission.status = CommissionStatus::Paid;
        }
        Ok(total)
    }
}

impl Default for AffiliateLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERRER: u64 = 1;

    #[test]
    fn test_record_referral_idempotent() {
        let mut affiliates = AffiliateLedger::new();
        assert!(affiliates.record_referral(REFERRER, 2));
        assert!(!affiliates.record_referral(REFERRER, 2));
        assert!(affiliates.record_referral(REFERRER, 3));
        assert_eq!(affiliates.referral_count(REFERRER), 2);

        // Same referred user under a different referrer is a new pair.
        assert!(affiliates.record_referral(4, 2));
    }

    #[test]
    fn test_accrue_and_pending_total() {
        let mut affiliates = AffiliateLedger::new();
        affiliates.accrue_commission(REFERRER, 2, 2_500).unwrap();
        affiliates.accrue_commission(REFERRER, 3, 1_500).unwrap();
        affiliates.accrue_commission(9, 5, 9_900).unwrap();

        assert_eq!(affiliates.pending_total(REFERRER), 4_000);
        assert_eq!(affiliates.commissions_for(REFERRER).len(), 2);
    }

    #[test]
    fn test_accrue_zero_rejected() {
        let mut affiliates = AffiliateLedger::new();
        let err = affiliates.accrue_commission(REFERRER, 2, 0).unwrap_err();
        assert_eq!(err, EngineError::InvalidAmount);
        assert!(affiliates.commissions_for(REFERRER).is_empty());
    }

    #[test]
    fn test_withdraw_moves_sum_into_ledger() {
        let mut affiliates = AffiliateLedger::new();
        let mut ledger = AccountLedger::new();
        affiliates.accrue_commission(REFERRER, 2, 2_500).unwrap();
        affiliates.accrue_commission(REFERRER, 3, 1_500).unwrap();

        let paid = affiliates
            .withdraw_commissions(REFERRER, &mut ledger)
            .unwrap();
        assert_eq!(paid, 4_000);
        assert_eq!(ledger.balance(REFERRER), 4_000);

        // One payout transaction for the whole sum.
        let history = ledger.transactions(REFERRER);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, TransactionKind::Payout);
        assert_eq!(history[0].amount, 4_000);

        // Everything marked paid.
        assert!(
            affiliates
                .commissions_for(REFERRER)
                .iter()
                .all(|c| c.status == CommissionStatus::Paid)
        );
    }

    #[test]
    fn test_withdraw_with_nothing_pending() {
        let mut affiliates = AffiliateLedger::new();
        let mut ledger = AccountLedger::new();

        let err = affiliates
            .withdraw_commissions(REFERRER, &mut ledger)
            .unwrap_err();
        assert_eq!(err, EngineError::NoPendingCommissions);
        assert_eq!(ledger.balance(REFERRER), 0);
        assert!(ledger.transactions(REFERRER).is_empty());
    }

    #[test]
    fn test_withdraw_twice_needs_new_accrual() {
        let mut affiliates = AffiliateLedger::new();
        let mut ledger = AccountLedger::new();
        affiliates.accrue_commission(REFERRER, 2, 2_500).unwrap();
        affiliates
            .withdraw_commissions(REFERRER, &mut ledger)
            .unwrap();

        let err = affiliates
            .withdraw_commissions(REFERRER, &mut ledger)
            .unwrap_err();
        assert_eq!(err, EngineError::NoPendingCommissions);

        affiliates.accrue_commission(REFERRER, 3, 1_000).unwrap();
        let paid = affiliates
            .withdraw_commissions(REFERRER, &mut ledger)
            .unwrap();
        assert_eq!(paid, 1_000);
        assert_eq!(ledger.balance(REFERRER), 3_500);
    }
}
