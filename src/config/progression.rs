//! Optional overrides for the level and badge tables

use serde::{Deserialize, Serialize};

use crate::progression::{
    BadgeTable, BadgeTier, LevelTable, LevelTier, ProgressionEngine, ProgressionError,
};

/// `[progression]` section. Missing tables fall back to the canonical ones.
///
/// ```toml
/// [[progression.levels]]
/// level = 1
/// xp_threshold = 0
/// title = "Seedling"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<Vec<LevelTier>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badges: Option<Vec<BadgeTier>>,
}

impl ProgressionConfig {
    /// Validate the configured tables and build the engine
    pub fn engine(&self) -> Result<ProgressionEngine, ProgressionError> {
        let levels = match &self.levels {
            Some(tiers) => LevelTable::new(tiers.clone())?,
            None => LevelTable::default(),
        };
        let badges = match &self.badges {
            Some(tiers) => BadgeTable::new(tiers.clone())?,
            None => BadgeTable::default(),
        };
        Ok(ProgressionEngine::new(levels, badges))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_canonical_tables() {
        let engine = ProgressionConfig::default().engine().unwrap();
        assert_eq!(engine.levels().max_level(), 15);
        assert_eq!(engine.badge_for_xp(0).name, "Bronze");
    }

    #[test]
    fn test_custom_levels() {
        let config: ProgressionConfig = toml::from_str(
            r#"
            [[levels]]
            level = 1
            xp_threshold = 0
            title = "Novice"

            [[levels]]
            level = 2
            xp_threshold = 50
            title = "Adept"
            "#,
        )
        .unwrap();
        let engine = config.engine().unwrap();
        assert_eq!(engine.level_for_xp(49), 1);
        assert_eq!(engine.level_for_xp(50), 2);
    }

    #[test]
    fn test_unsorted_levels_are_fatal() {
        let config = ProgressionConfig {
            levels: Some(vec![
                LevelTier::new(1, 0, "A"),
                LevelTier::new(2, 300, "B"),
                LevelTier::new(3, 200, "C"),
            ]),
            badges: None,
        };
        assert!(matches!(
            config.engine(),
            Err(ProgressionError::Configuration(_))
        ));
    }

    #[test]
    fn test_badge_gap_is_fatal() {
        let config = ProgressionConfig {
            levels: None,
            badges: Some(vec![
                BadgeTier::new("Low", 0, Some(99), "#aaa", "🥉"),
                BadgeTier::new("High", 200, None, "#fff", "🥇"),
            ]),
        };
        assert!(config.engine().is_err());
    }
}
