use std::collections::HashMap;

use crate::errors::EngineError;
use crate::types::{OptionSpec, Pool, PoolOption, PoolStatus};

/// Filter for pool listings. Empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct PoolFilter {
    pub sport: Option<String>,
    pub status: Option<PoolStatus>,
}

/// Shared read-mostly catalog of pools. Pools move through
/// open -> closed -> settled; closed is the optional parking state for
/// pools past their event date but not yet resolved.
pub struct PoolCatalog {
    pools: HashMap<u64, Pool>,
    pool_id_counter: u64,
}

impl PoolCatalog {
    pub fn new() -> Self {
        PoolCatalog {
            pools: HashMap::new(),
            pool_id_counter: 0,
        }
    }

    /// Opens a new pool. Needs at least two options, all priced at
    /// 1.00x or better.
    pub fn open_pool(
        &mut self,
        event: &str,
        sport: &str,
        options: Vec<OptionSpec>,
        prize_seed: u64,
        end_date: u64,
    ) -> Result<u64, EngineError> {
        if options.len() < 2 || options.iter().any(|o| o.odds < 100) {
            return Err(EngineError::InvalidOptions);
        }

        let pool_id = self.pool_id_counter;
        self.pool_id_counter += 1;

        let options = options
            .into_iter()
            .enumerate()
            .map(|(i, spec)| PoolOption {
                id: i as u64 + 1,
                name: spec.name,
                odds: spec.odds,
            })
            .collect();

        self.pools.insert(
            pool_id,
            Pool {
                id: pool_id,
                event: event.to_string(),
                sport: sport.to_string(),
                participant_count: 0,
                prize_total: prize_seed,
                end_date,
                status: PoolStatus::Open,
                options,
                winning_option: None,
            },
        );
        Ok(pool_id)
    }

    pub fn get(&self, pool_id: u64) -> Result<&Pool, EngineError> {
        self.pools.get(&pool_id).ok_or(EngineError::PoolNotFound)
    }

    /// Pools matching the filter, ascending by end date (ties by id).
    pub fn list(&self, filter: &PoolFilter) -> Vec<&Pool> {
        let mut pools: Vec<&Pool> = self
            .pools
            .values()
            .filter(|p| filter.sport.as_deref().is_none_or(|s| p.sport == s))
            .filter(|p| filter.status.is_none_or(|s| p.status == s))
            .collect();
        pools.sort_by_key(|p| (p.end_date, p.id));
        pools
    }

    /// Open -> Closed, for pools past their event date awaiting
    /// resolution.
    pub fn close_pool(&mut self, pool_id: u64) -> Result<(), EngineError> {
        let pool = self
            .pools
            .get_mut(&pool_id)
            .ok_or(EngineError::PoolNotFound)?;
        match pool.status {
            PoolStatus::Open => {
                pool.status = PoolStatus::Closed;
                Ok(())
            }
            PoolStatus::Closed => Err(EngineError::PoolClosed),
            PoolStatus::Settled => Err(EngineError::AlreadySettled),
        }
    }

    /// Atomic settlement guard: transitions open/closed -> settled with
    /// the winner recorded. A second attempt loses with `AlreadySettled`,
    /// which is what makes pool settlement idempotent in effect.
    pub fn begin_settlement(
        &mut self,
        pool_id: u64,
        winning_option_id: u64,
    ) -> Result<(), EngineError> {
        let pool = self
            .pools
            .get_mut(&pool_id)
            .ok_or(EngineError::PoolNotFound)?;
        if pool.status == PoolStatus::Settled {
            return Err(EngineError::AlreadySettled);
        }
        if !pool.options.iter().any(|o| o.id == winning_option_id) {
            return Err(EngineError::OptionNotFound);
        }
        pool.status = PoolStatus::Settled;
        pool.winning_option = Some(winning_option_id);
        Ok(())
    }

    /// Odds of one option, as priced right now.
    pub fn option_odds(&self, pool_id: u64, option_id: u64) -> Result<u32, EngineError> {
        self.get(pool_id)?
            .options
            .iter()
            .find(|o| o.id == option_id)
            .map(|o| o.odds)
            .ok_or(EngineError::OptionNotFound)
    }

    /// Accounting hook for a placed wager: one more participant, stake
    /// added to the pot.
    pub(crate) fn note_wager(&mut self, pool_id: u64, stake: u64) {
        if let Some(pool) = self.pools.get_mut(&pool_id) {
            pool.participant_count += 1;
            pool.prize_total += stake;
        }
    }
}

impl Default for PoolCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_options() -> Vec<OptionSpec> {
        vec![
            OptionSpec {
                name: "Flamengo".to_string(),
                odds: 185,
            },
            OptionSpec {
                name: "Corinthians".to_string(),
                odds: 210,
            },
        ]
    }

    fn setup_catalog() -> PoolCatalog {
        let mut catalog = PoolCatalog::new();
        catalog
            .open_pool(
                "Flamengo vs Corinthians",
                "futebol",
                two_options(),
                25_000_00,
                2_000,
            )
            .unwrap();
        catalog
    }

    #[test]
    fn test_open_pool_assigns_option_ids() {
        let catalog = setup_catalog();
        let pool = catalog.get(0).unwrap();
        assert_eq!(pool.status, PoolStatus::Open);
        assert_eq!(pool.options.len(), 2);
        assert_eq!(pool.options[0].id, 1);
        assert_eq!(pool.options[1].id, 2);
        assert_eq!(pool.winning_option, None);
    }

    #[test]
    fn test_open_pool_needs_two_options() {
        let mut catalog = PoolCatalog::new();
        let err = catalog
            .open_pool(
                "Flamengo vs Corinthians",
                "futebol",
                vec![OptionSpec {
                    name: "Flamengo".to_string(),
                    odds: 185,
                }],
                0,
                2_000,
            )
            .unwrap_err();
        assert_eq!(err, EngineError::InvalidOptions);
    }

    #[test]
    fn test_open_pool_rejects_sub_even_odds() {
        let mut catalog = PoolCatalog::new();
        let mut options = two_options();
        options[1].odds = 99;
        let err = catalog
            .open_pool("Flamengo vs Corinthians", "futebol", options, 0, 2_000)
            .unwrap_err();
        assert_eq!(err, EngineError::InvalidOptions);
    }

    #[test]
    fn test_list_sorted_by_end_date() {
        let mut catalog = PoolCatalog::new();
        catalog
            .open_pool("B", "futebol", two_options(), 0, 3_000)
            .unwrap();
        catalog
            .open_pool("A", "futebol", two_options(), 0, 1_000)
            .unwrap();
        catalog
            .open_pool("C", "basquete", two_options(), 0, 2_000)
            .unwrap();

        let all = catalog.list(&PoolFilter::default());
        let events: Vec<&str> = all.iter().map(|p| p.event.as_str()).collect();
        assert_eq!(events, vec!["A", "C", "B"]);
    }

    #[test]
    fn test_list_filters() {
        let mut catalog = PoolCatalog::new();
        catalog
            .open_pool("A", "futebol", two_options(), 0, 1_000)
            .unwrap();
        let b = catalog
            .open_pool("B", "basquete", two_options(), 0, 2_000)
            .unwrap();
        catalog.close_pool(b).unwrap();

        let futebol = catalog.list(&PoolFilter {
            sport: Some("futebol".to_string()),
            status: None,
        });
        assert_eq!(futebol.len(), 1);
        assert_eq!(futebol[0].event, "A");

        let closed = catalog.list(&PoolFilter {
            sport: None,
            status: Some(PoolStatus::Closed),
        });
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].event, "B");

        let closed_futebol = catalog.list(&PoolFilter {
            sport: Some("futebol".to_string()),
            status: Some(PoolStatus::Closed),
        });
        assert!(closed_futebol.is_empty());
    }

    #[test]
    fn test_close_pool_transitions() {
        let mut catalog = setup_catalog();
        catalog.close_pool(0).unwrap();
        assert_eq!(catalog.get(0).unwrap().status, PoolStatus::Closed);

        let err = catalog.close_pool(0).unwrap_err();
        assert_eq!(err, EngineError::PoolClosed);
    }

    #[test]
    fn test_settlement_from_open_and_closed() {
        let mut catalog = setup_catalog();
        catalog.begin_settlement(0, 1).unwrap();
        let pool = catalog.get(0).unwrap();
        assert_eq!(pool.status, PoolStatus::Settled);
        assert_eq!(pool.winning_option, Some(1));

        let mut catalog = setup_catalog();
        catalog.close_pool(0).unwrap();
        catalog.begin_settlement(0, 2).unwrap();
        assert_eq!(catalog.get(0).unwrap().winning_option, Some(2));
    }

    #[test]
    fn test_double_settlement_rejected() {
        let mut catalog = setup_catalog();
        catalog.begin_settlement(0, 1).unwrap();
        let err = catalog.begin_settlement(0, 2).unwrap_err();
        assert_eq!(err, EngineError::AlreadySettled);
        // Winner unchanged by the losing attempt.
        assert_eq!(catalog.get(0).unwrap().winning_option, Some(1));
    }

    #[test]
    fn test_settlement_unknown_option() {
        let mut catalog = setup_catalog();
        let err = catalog.begin_settlement(0, 99).unwrap_err();
        assert_eq!(err, EngineError::OptionNotFound);
        assert_eq!(catalog.get(0).unwrap().status, PoolStatus::Open);
    }

    #[test]
    fn test_unknown_pool() {
        let catalog = PoolCatalog::new();
        assert_eq!(catalog.get(42).unwrap_err(), EngineError::PoolNotFound);
        assert_eq!(
            catalog.option_odds(42, 1).unwrap_err(),
            EngineError::PoolNotFound
        );
    }

    #[test]
    fn test_note_wager_accounting() {
        let mut catalog = setup_catalog();
        catalog.note_wager(0, 5_000);
        catalog.note_wager(0, 2_500);
        let pool = catalog.get(0).unwrap();
        assert_eq!(pool.participant_count, 2);
        assert_eq!(pool.prize_total, 25_000_00 + 7_500);
    }
}
