use std::collections::HashMap;

use crate::types::{GamificationProfile, XpAction};

/// Level progression policy. The prototype shipped only static example
/// numbers, so the curve is an explicit choice supplied at construction:
///
/// - `Linear { xp_per_level }`: threshold for level n is
///   `xp_per_level * n`. With `xp_per_level = 250` a level-12 account
///   needs 3000 XP for the next level.
/// - `Geometric { base, percent }`: the level-1 threshold is `base` and
///   each level's threshold grows by `percent` percent, integer
///   arithmetic, truncating.
///
/// Thresholds are clamped to a minimum of 1 XP, so a degenerate curve
/// (zero `xp_per_level` or `base`) levels up per point instead of
/// stalling `award` in its level-up loop.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LevelCurve {
    Linear { xp_per_level: u64 },
    Geometric { base: u64, percent: u64 },
}

impl LevelCurve {
    /// XP required to advance past the given level. Never zero.
    pub fn threshold(&self, level: u32) -> u64 {
        let raw = match *self {
            LevelCurve::Linear { xp_per_level } => xp_per_level * level as u64,
            LevelCurve::Geometric { base, percent } => {
                let mut threshold = base;
                for _ in 1..level {
                    threshold = threshold * (100 + percent) / 100;
                }
                threshold
            }
        };
        raw.max(1)
    }
}

/// Awards experience points for ledger and wagering events and computes
/// level progression. Levels start at 1; XP past a threshold carries
/// over into the next level.
pub struct GamificationEngine {
    profiles: HashMap<u64, GamificationProfile>,
    curve: LevelCurve,
}

impl GamificationEngine {
    pub fn new(curve: LevelCurve) -> Self {
        GamificationEngine {
            profiles: HashMap::new(),
            curve,
        }
    }

    fn fresh_profile(&self, account_id: u64) -> GamificationProfile {
        GamificationProfile {
            account_id,
            level: 1,
            current_xp: 0,
            next_level_threshold_xp: self.curve.threshold(1),
        }
    }

    /// Current profile snapshot; accounts that never earned XP read as a
    /// fresh level-1 profile.
    pub fn profile(&self, account_id: u64) -> GamificationProfile {
        self.profiles
            .get(&account_id)
            .cloned()
            .unwrap_or_else(|| self.fresh_profile(account_id))
    }

    /// Credits the action's points and applies level-ups, carrying any
    /// remainder forward. Returns the updated snapshot.
    pub fn award(&mut self, account_id: u64, action: XpAction) -> GamificationProfile {
        let fresh = self.fresh_profile(account_id);
        let profile = self.profiles.entry(account_id).or_insert(fresh);

        profile.current_xp += action.points();
        while profile.current_xp >= profile.next_level_threshold_xp {
            profile.current_xp -= profile.next_level_threshold_xp;
            profile.level += 1;
            profile.next_level_threshold_xp = self.curve.threshold(profile.level);
        }
        profile.clone()
    }
}
