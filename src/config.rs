use std::str::FromStr;

use thiserror::Error;

use crate::game::constants::{map, sim};
use crate::game::state::Archetype;
use crate::game::systems::ai::Difficulty;

/// Invalid simulation settings
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("maze must be at least 3x3 cells, got {cols}x{rows}")]
    MazeTooSmall { cols: usize, rows: usize },
    #[error("bot count must be 1-16, got {0}")]
    BotCount(usize),
    #[error("timestep must be positive, got {0}")]
    Timestep(f32),
    #[error("match length must be positive, got {0}")]
    MatchLength(f32),
    #[error("pickup cap must be 1-{max}, got {cap}")]
    PickupCap { cap: usize, max: usize },
    #[error("match count must be at least 1")]
    MatchCount,
}

/// Simulation configuration
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub cols: usize,
    pub rows: usize,
    /// Base seed; match `i` of a batch uses `seed + i`. Random when unset.
    pub seed: Option<u64>,
    pub bot_count: usize,
    pub difficulty: Difficulty,
    pub pickup_cap: usize,
    /// Fixed timestep in seconds
    pub dt: f32,
    pub max_seconds: f32,
    pub matches: usize,
    pub player_archetype: Archetype,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            cols: map::DEFAULT_COLS,
            rows: map::DEFAULT_ROWS,
            seed: None,
            bot_count: sim::DEFAULT_BOT_COUNT,
            difficulty: Difficulty::Medium,
            pickup_cap: map::DEFAULT_PICKUP_CAP,
            dt: sim::DEFAULT_DT,
            max_seconds: sim::DEFAULT_MAX_SECONDS,
            matches: 1,
            player_archetype: Archetype::Sniper,
        }
    }
}

impl SimConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Unparsable values are logged and
    /// left at their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        parse_into(&lookup, "MAZE_COLS", &mut config.cols);
        parse_into(&lookup, "MAZE_ROWS", &mut config.rows);
        parse_into(&lookup, "BOT_COUNT", &mut config.bot_count);
        parse_into(&lookup, "PICKUP_CAP", &mut config.pickup_cap);
        parse_into(&lookup, "SIM_DT", &mut config.dt);
        parse_into(&lookup, "SIM_MAX_SECONDS", &mut config.max_seconds);
        parse_into(&lookup, "SIM_MATCHES", &mut config.matches);

        if let Some(raw) = lookup("MAZE_SEED") {
            match raw.trim().parse::<u64>() {
                Ok(seed) => config.seed = Some(seed),
                Err(_) => tracing::warn!("Invalid MAZE_SEED '{}', using a random seed", raw),
            }
        }

        if let Some(raw) = lookup("BOT_DIFFICULTY") {
            match Difficulty::from_name(&raw) {
                Some(difficulty) => config.difficulty = difficulty,
                None => tracing::warn!("Unknown BOT_DIFFICULTY '{}', using default", raw),
            }
        }

        if let Some(raw) = lookup("PLAYER_ARCHETYPE") {
            match Archetype::from_name(&raw) {
                Some(archetype) => config.player_archetype = archetype,
                None => tracing::warn!("Unknown PLAYER_ARCHETYPE '{}', using default", raw),
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols < map::MIN_DIMENSION || self.rows < map::MIN_DIMENSION {
            return Err(ConfigError::MazeTooSmall {
                cols: self.cols,
                rows: self.rows,
            });
        }
        if self.bot_count == 0 || self.bot_count > sim::MAX_BOTS {
            return Err(ConfigError::BotCount(self.bot_count));
        }
        if !(self.dt > 0.0) {
            return Err(ConfigError::Timestep(self.dt));
        }
        if !(self.max_seconds > 0.0) {
            return Err(ConfigError::MatchLength(self.max_seconds));
        }
        let max = self.cols * self.rows;
        if self.pickup_cap == 0 || self.pickup_cap > max {
            return Err(ConfigError::PickupCap {
                cap: self.pickup_cap,
                max,
            });
        }
        if self.matches == 0 {
            return Err(ConfigError::MatchCount);
        }
        Ok(())
    }

    /// Seed for match `index` of a batch
    pub fn match_seed(&self, base: u64, index: usize) -> u64 {
        base.wrapping_add(index as u64)
    }
}

fn parse_into<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        match raw.trim().parse::<T>() {
            Ok(parsed) => *slot = parsed,
            Err(_) => tracing::warn!("Invalid {} '{}', using default", key, raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> SimConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SimConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.cols, 35);
        assert_eq!(config.rows, 25);
        assert_eq!(config.bot_count, 3);
        assert_eq!(config.difficulty, Difficulty::Medium);
        assert_eq!(config.pickup_cap, 18);
        assert_eq!(config.player_archetype, Archetype::Sniper);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("MAZE_COLS", "21"),
            ("MAZE_ROWS", " 15 "),
            ("MAZE_SEED", "42"),
            ("BOT_COUNT", "5"),
            ("BOT_DIFFICULTY", "Hard"),
            ("SIM_DT", "0.02"),
            ("SIM_MATCHES", "8"),
            ("PLAYER_ARCHETYPE", "tank"),
        ]);
        assert_eq!((config.cols, config.rows), (21, 15));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.bot_count, 5);
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.dt, 0.02);
        assert_eq!(config.matches, 8);
        assert_eq!(config.player_archetype, Archetype::Tank);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_garbage_falls_back_to_defaults() {
        let config = from_pairs(&[
            ("MAZE_COLS", "wide"),
            ("MAZE_SEED", "-1"),
            ("BOT_DIFFICULTY", "nightmare"),
            ("PLAYER_ARCHETYPE", "wizard"),
        ]);
        assert_eq!(config.cols, 35);
        assert!(config.seed.is_none());
        assert_eq!(config.difficulty, Difficulty::Medium);
        assert_eq!(config.player_archetype, Archetype::Sniper);
    }

    #[test]
    fn test_validate_rejects() {
        let bad = |f: fn(&mut SimConfig)| {
            let mut config = SimConfig::default();
            f(&mut config);
            config.validate()
        };
        assert_eq!(
            bad(|c| c.cols = 2),
            Err(ConfigError::MazeTooSmall { cols: 2, rows: 25 })
        );
        assert_eq!(bad(|c| c.bot_count = 0), Err(ConfigError::BotCount(0)));
        assert_eq!(bad(|c| c.bot_count = 17), Err(ConfigError::BotCount(17)));
        assert_eq!(bad(|c| c.dt = 0.0), Err(ConfigError::Timestep(0.0)));
        assert!(matches!(bad(|c| c.dt = f32::NAN), Err(ConfigError::Timestep(_))));
        assert_eq!(bad(|c| c.max_seconds = -1.0), Err(ConfigError::MatchLength(-1.0)));
        assert!(matches!(bad(|c| c.pickup_cap = 0), Err(ConfigError::PickupCap { .. })));
        assert_eq!(bad(|c| c.matches = 0), Err(ConfigError::MatchCount));
    }

    #[test]
    fn test_match_seed() {
        let config = SimConfig::default();
        assert_eq!(config.match_seed(10, 3), 13);
        assert_eq!(config.match_seed(u64::MAX, 1), 0);
    }
}
