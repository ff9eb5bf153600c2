use serde::Serialize;

use crate::catalog::PoolCatalog;
use crate::errors::EngineError;
use crate::ledger::{AccountLedger, current_timestamp_ms};
use crate::types::{
    CentiOdds, PoolStatus, TransactionKind, TransactionStatus, Wager, WagerOutcome,
};

/// Potential payout for a stake at the given odds, rounded half-up to
/// the centavo. Integer throughout: (stake * odds + 50) / 100.
pub fn potential_payout(stake: u64, odds: CentiOdds) -> u64 {
    ((stake as u128 * odds as u128 + 50) / 100) as u64
}

/// Result of settling one wager within a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementEntry {
    pub wager_id: u64,
    pub account_id: u64,
    pub outcome: WagerOutcome,
    /// Credited payout in centavos; 0 for lost wagers.
    pub payout: u64,
}

/// Accepts stakes against priced pool options and resolves them when the
/// pool settles. The ledger and catalog are passed in by the caller so
/// that one outer lock serializes every check-then-act sequence.
pub struct WageringEngine {
    wagers: Vec<Wager>,
    wager_id_counter: u64,
}

impl WageringEngine {
    pub fn new() -> Self {
        WageringEngine {
            wagers: Vec::new(),
            wager_id_counter: 0,
        }
    }

    /// Places a stake on one option of an open pool.
    ///
    /// Every check runs before any mutation, so a rejection leaves the
    /// ledger without a dangling debit. On success the ledger is debited
    /// exactly once and the odds are captured at this instant.
    pub fn place_wager(
        &mut self,
        ledger: &mut AccountLedger,
        catalog: &mut PoolCatalog,
        account_id: u64,
        pool_id: u64,
        option_id: u64,
        stake: u64,
        reference: &str,
    ) -> Result<(u64, u64), EngineError> {
        if stake == 0 {
            return Err(EngineError::InvalidStake);
        }

        let pool = catalog.get(pool_id)?;
        if pool.status != PoolStatus::Open {
            return Err(EngineError::PoolClosed);
        }
        let event = pool.event.clone();
        let odds = catalog.option_odds(pool_id, option_id)?;

        if stake as i64 > ledger.balance(account_id) {
            return Err(EngineError::InsufficientFunds);
        }

        ledger.record(
            account_id,
            TransactionKind::Wager,
            -(stake as i64),
            TransactionStatus::Completed,
            &format!("Aposta em {event}"),
            reference,
        )?;

        let wager_id = self.wager_id_counter;
        self.wager_id_counter += 1;
        self.wagers.push(Wager {
            id: wager_id,
            account_id,
            pool_id,
            option_id,
            stake,
            odds,
            placed_at: current_timestamp_ms(),
            outcome: WagerOutcome::Pending,
        });
        catalog.note_wager(pool_id, stake);

        Ok((wager_id, potential_payout(stake, odds)))
    }

    /// Settles a pool: the winning option's wagers are credited
    /// stake x odds as completed payout transactions, everything else is
    /// marked lost with no credit. The catalog's settlement guard makes a
    /// repeat call fail with `AlreadySettled` before any wager or ledger
    /// entry is touched, so no wager can ever be credited twice.
    pub fn settle_pool(
        &mut self,
        ledger: &mut AccountLedger,
        catalog: &mut PoolCatalog,
        pool_id: u64,
        winning_option_id: u64,
    ) -> Result<Vec<SettlementEntry>, EngineError> {
        catalog.begin_settlement(pool_id, winning_option_id)?;
        let event = catalog.get(pool_id)?.event.clone();

        let mut entries = Vec::new();
        for wager in self
            .wagers
            .iter_mut()
            .filter(|w| w.pool_id == pool_id && w.outcome == WagerOutcome::Pending)
        {
            if wager.option_id == winning_option_id {
                let payout = potential_payout(wager.stake, wager.odds);
                ledger.record(
                    wager.account_id,
                    TransactionKind::Payout,
                    payout as i64,
                    TransactionStatus::Completed,
                    &format!("Prêmio da aposta {event}"),
                    &format!("WIN{:06}", wager.id),
                )?;
                wager.outcome = WagerOutcome::Won;
                entries.push(SettlementEntry {
                    wager_id: wager.id,
                    account_id: wager.account_id,
                    outcome: WagerOutcome::Won,
                    payout,
                });
            } else {
                wager.outcome = WagerOutcome::Lost;
                entries.push(SettlementEntry {
                    wager_id: wager.id,
                    account_id: wager.account_id,
                    outcome: WagerOutcome::Lost,
                    payout: 0,
                });
            }
        }
        Ok(entries)
    }

    /// All wagers placed by one account, in placement order.
    pub fn wagers_for(&self, account_id: u64) -> Vec<&Wager> {
        self.wagers
            .iter()
            .filter(|w| w.account_id == account_id)
            .collect()
    }
}

impl Default for WageringEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OptionSpec;

    const ACCOUNT: u64 = 1;

    fn setup() -> (AccountLedger, PoolCatalog, WageringEngine, u64) {
        let mut ledger = AccountLedger::new();
        let mut catalog = PoolCatalog::new();
        let pool_id = catalog
            .open_pool(
                "Flamengo vs Corinthians",
                "futebol",
                vec![
                    OptionSpec {
                        name: "Flamengo".to_string(),
                        odds: 200,
                    },
                    OptionSpec {
                        name: "Corinthians".to_string(),
                        odds: 185,
                    },
                    OptionSpec {
                        name: "Empate".to_string(),
                        odds: 350,
                    },
                ],
                0,
                2_000,
            )
            .unwrap();
        ledger
            .record(
                ACCOUNT,
                TransactionKind::Deposit,
                10_000,
                TransactionStatus::Completed,
                "Depósito via Pix",
                "PIX123456",
            )
            .unwrap();
        (ledger, catalog, WageringEngine::new(), pool_id)
    }

    #[test]
    fn test_potential_payout_rounding() {
        // 1.85x on R$ 10.00 = R$ 18.50
        assert_eq!(potential_payout(1_000, 185), 1_850);
        // Half rounds up: 0.15 * 1.85 = 0.2775 -> 0.28
        assert_eq!(potential_payout(15, 185), 28);
        // Exact half: 0.50 * 1.01 = 0.505 -> 0.51
        assert_eq!(potential_payout(50, 101), 51);
        // Just below half rounds down: 0.47 * 1.01 = 0.4747 -> 0.47
        assert_eq!(potential_payout(47, 101), 47);
        assert_eq!(potential_payout(0, 185), 0);
    }

    #[test]
    fn test_place_wager_debits_once() {
        let (mut ledger, mut catalog, mut engine, pool_id) = setup();

        let (wager_id, payout) = engine
            .place_wager(
                &mut ledger,
                &mut catalog,
                ACCOUNT,
                pool_id,
                1,
                5_000,
                "BET789012",
            )
            .unwrap();

        assert_eq!(ledger.balance(ACCOUNT), 5_000);
        assert_eq!(payout, 10_000);

        let wagers = engine.wagers_for(ACCOUNT);
        assert_eq!(wagers.len(), 1);
        assert_eq!(wagers[0].id, wager_id);
        assert_eq!(wagers[0].odds, 200);
        assert_eq!(wagers[0].outcome, WagerOutcome::Pending);

        // Two placements with distinct wager ids debit twice, not more.
        engine
            .place_wager(
                &mut ledger,
                &mut catalog,
                ACCOUNT,
                pool_id,
                2,
                2_000,
                "BET789013",
            )
            .unwrap();
        assert_eq!(ledger.balance(ACCOUNT), 3_000);
        assert_eq!(engine.wagers_for(ACCOUNT).len(), 2);
    }

    #[test]
    fn test_place_wager_zero_stake() {
        let (mut ledger, mut catalog, mut engine, pool_id) = setup();
        let err = engine
            .place_wager(&mut ledger, &mut catalog, ACCOUNT, pool_id, 1, 0, "BET0")
            .unwrap_err();
        assert_eq!(err, EngineError::InvalidStake);
        assert_eq!(ledger.balance(ACCOUNT), 10_000);
    }

    #[test]
    fn test_place_wager_insufficient_funds() {
        let (mut ledger, mut catalog, mut engine, pool_id) = setup();
        let err = engine
            .place_wager(
                &mut ledger,
                &mut catalog,
                ACCOUNT,
                pool_id,
                1,
                10_001,
                "BET0",
            )
            .unwrap_err();
        assert_eq!(err, EngineError::InsufficientFunds);

        // No partial debit, no wager record.
        assert_eq!(ledger.balance(ACCOUNT), 10_000);
        assert!(engine.wagers_for(ACCOUNT).is_empty());
        assert_eq!(catalog.get(pool_id).unwrap().participant_count, 0);
    }

    #[test]
    fn test_place_wager_on_closed_pool() {
        let (mut ledger, mut catalog, mut engine, pool_id) = setup();
        catalog.close_pool(pool_id).unwrap();
        let err = engine
            .place_wager(
                &mut ledger,
                &mut catalog,
                ACCOUNT,
                pool_id,
                1,
                1_000,
                "BET0",
            )
            .unwrap_err();
        assert_eq!(err, EngineError::PoolClosed);
        assert_eq!(ledger.balance(ACCOUNT), 10_000);
    }

    #[test]
    fn test_place_wager_unknown_option() {
        let (mut ledger, mut catalog, mut engine, pool_id) = setup();
        let err = engine
            .place_wager(
                &mut ledger,
                &mut catalog,
                ACCOUNT,
                pool_id,
                99,
                1_000,
                "BET0",
            )
            .unwrap_err();
        assert_eq!(err, EngineError::OptionNotFound);
    }

    #[test]
    fn test_odds_captured_at_placement() {
        let (mut ledger, mut catalog, mut engine, pool_id) = setup();
        let (_, payout) = engine
            .place_wager(
                &mut ledger,
                &mut catalog,
                ACCOUNT,
                pool_id,
                3,
                1_000,
                "BET0",
            )
            .unwrap();
        // 3.50x captured on the wager itself.
        assert_eq!(payout, 3_500);
        assert_eq!(engine.wagers_for(ACCOUNT)[0].odds, 350);
    }

    #[test]
    fn test_settle_pool_credits_winners() {
        let (mut ledger, mut catalog, mut engine, pool_id) = setup();
        // Second bettor on the losing side.
        ledger
            .record(
                2,
                TransactionKind::Deposit,
                10_000,
                TransactionStatus::Completed,
                "Depósito via Pix",
                "PIX567890",
            )
            .unwrap();

        engine
            .place_wager(
                &mut ledger,
                &mut catalog,
                ACCOUNT,
                pool_id,
                1,
                5_000,
                "BET1",
            )
            .unwrap();
        engine
            .place_wager(&mut ledger, &mut catalog, 2, pool_id, 2, 4_000, "BET2")
            .unwrap();

        let entries = engine
            .settle_pool(&mut ledger, &mut catalog, pool_id, 1)
            .unwrap();
        assert_eq!(entries.len(), 2);

        let winner = entries.iter().find(|e| e.account_id == ACCOUNT).unwrap();
        assert_eq!(winner.outcome, WagerOutcome::Won);
        assert_eq!(winner.payout, 10_000);

        let loser = entries.iter().find(|e| e.account_id == 2).unwrap();
        assert_eq!(loser.outcome, WagerOutcome::Lost);
        assert_eq!(loser.payout, 0);

        // 10 000 - 5 000 + 10 000 payout.
        assert_eq!(ledger.balance(ACCOUNT), 15_000);
        // Losing stake stays debited.
        assert_eq!(ledger.balance(2), 6_000);

        assert_eq!(engine.wagers_for(ACCOUNT)[0].outcome, WagerOutcome::Won);
        assert_eq!(engine.wagers_for(2)[0].outcome, WagerOutcome::Lost);
    }

    #[test]
    fn test_settle_pool_idempotent_in_effect() {
        let (mut ledger, mut catalog, mut engine, pool_id) = setup();
        engine
            .place_wager(
                &mut ledger,
                &mut catalog,
                ACCOUNT,
                pool_id,
                1,
                5_000,
                "BET1",
            )
            .unwrap();

        engine
            .settle_pool(&mut ledger, &mut catalog, pool_id, 1)
            .unwrap();
        let balance_after_first = ledger.balance(ACCOUNT);

        let err = engine
            .settle_pool(&mut ledger, &mut catalog, pool_id, 1)
            .unwrap_err();
        assert_eq!(err, EngineError::AlreadySettled);

        // No double credit.
        assert_eq!(ledger.balance(ACCOUNT), balance_after_first);
        assert_eq!(ledger.balance(ACCOUNT), 15_000);
    }

    #[test]
    fn test_wager_terminal_once_settled() {
        let (mut ledger, mut catalog, mut engine, pool_id) = setup();
        engine
            .place_wager(
                &mut ledger,
                &mut catalog,
                ACCOUNT,
                pool_id,
                2,
                1_000,
                "BET1",
            )
            .unwrap();
        engine
            .settle_pool(&mut ledger, &mut catalog, pool_id, 1)
            .unwrap();
        assert_eq!(engine.wagers_for(ACCOUNT)[0].outcome, WagerOutcome::Lost);
        // Placing on the settled pool is rejected.
        let err = engine
            .place_wager(
                &mut ledger,
                &mut catalog,
                ACCOUNT,
                pool_id,
                1,
                1_000,
                "BET2",
            )
            .unwrap_err();
        assert_eq!(err, EngineError::PoolClosed);
    }

    #[test]
    fn test_deposit_wager_settle_withdraw_flow() {
        // Balance 0 -> deposit 100 -> wager 50 at 2.00x -> settle win
        // -> balance 150.
        let mut ledger = AccountLedger::new();
        let mut catalog = PoolCatalog::new();
        let mut engine = WageringEngine::new();
        assert_eq!(ledger.balance(ACCOUNT), 0);

        ledger
            .record(
                ACCOUNT,
                TransactionKind::Deposit,
                100_00,
                TransactionStatus::Completed,
                "Depósito via Pix",
                "PIX123456",
            )
            .unwrap();
        assert_eq!(ledger.balance(ACCOUNT), 100_00);

        let pool_id = catalog
            .open_pool(
                "Flamengo vs Corinthians",
                "futebol",
                vec![
                    OptionSpec {
                        name: "Flamengo".to_string(),
                        odds: 200,
                    },
                    OptionSpec {
                        name: "Corinthians".to_string(),
                        odds: 200,
                    },
                ],
                0,
                2_000,
            )
            .unwrap();

        let (_, payout) = engine
            .place_wager(
                &mut ledger,
                &mut catalog,
                ACCOUNT,
                pool_id,
                1,
                50_00,
                "BET789012",
            )
            .unwrap();
        assert_eq!(ledger.balance(ACCOUNT), 50_00);
        assert_eq!(payout, 100_00);

        engine
            .settle_pool(&mut ledger, &mut catalog, pool_id, 1)
            .unwrap();
        assert_eq!(ledger.balance(ACCOUNT), 150_00);
        assert_eq!(engine.wagers_for(ACCOUNT)[0].outcome, WagerOutcome::Won);

        // Withdrawal of 200 against balance 150 fails; balance intact.
        let err = ledger
            .request_withdrawal(ACCOUNT, 200_00, "Pix", "WDR901234")
            .unwrap_err();
        assert_eq!(err, EngineError::InsufficientFunds);
        assert_eq!(ledger.balance(ACCOUNT), 150_00);
    }
}
