//! Player progression stats and mission rewards.

use serde::{Deserialize, Serialize};

/// Money a new player starts with.
pub const DEFAULT_STARTING_MONEY: u64 = 3000;

/// Talent points a new player starts with.
pub const DEFAULT_STARTING_TALENT_POINTS: u32 = 3;

/// Courage a new player starts with.
pub const DEFAULT_STARTING_COURAGE: u32 = 5;

/// Money and experience earned by a successful mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub money: u64,
    pub experience: u64,
}

/// Session-scoped progression for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub level: u32,
    pub experience: u64,
    pub money: u64,
    pub courage: u32,
    pub reputation: i64,
    pub talent_points: u32,
}

impl PlayerStats {
    pub fn new(starting_money: u64, starting_talent_points: u32) -> Self {
        Self {
            level: 1,
            experience: 0,
            money: starting_money,
            courage: DEFAULT_STARTING_COURAGE,
            reputation: 0,
            talent_points: starting_talent_points,
        }
    }

    /// Credit a mission reward.
    ///
    /// Nothing in the mission engine calls this; the surrounding application
    /// decides when a reported reward becomes persistent progress.
    pub fn apply_reward(&mut self, reward: &Reward) {
        self.money = self.money.saturating_add(reward.money);
        self.experience = self.experience.saturating_add(reward.experience);
    }
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_MONEY, DEFAULT_STARTING_TALENT_POINTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_player_starts_at_level_one() {
        let stats = PlayerStats::default();
        assert_eq!(stats.level, 1);
        assert_eq!(stats.money, DEFAULT_STARTING_MONEY);
        assert_eq!(stats.talent_points, DEFAULT_STARTING_TALENT_POINTS);
    }

    #[test]
    fn apply_reward_adds_money_and_experience() {
        let mut stats = PlayerStats::new(100, 0);
        stats.apply_reward(&Reward {
            money: 250,
            experience: 10,
        });
        assert_eq!(stats.money, 350);
        assert_eq!(stats.experience, 10);
    }
}
