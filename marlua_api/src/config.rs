use serde::{Deserialize, Serialize};

use marlua_memory::{Address, MemoryMap};

use crate::{Comparison, Condition, ConfigError};

/// Settings passed to a [Runtime](crate::Runtime) at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// The memory that scripts may read. Literal addresses outside of it are rejected.
    pub memory_map: MemoryMap,
    /// The byte describing whether the player is on the ground.
    pub player_state_address: Address,
    /// The value of the player state byte while grounded.
    pub grounded_value: u8,
    /// The number of frames a `wait_until` may stay unsatisfied before it is reported as a
    /// stall.
    pub stall_budget: u32,
    /// Report both directions of a d-pad axis when both are held, instead of neither.
    pub allow_opposing_directions: bool,
    /// Raw controller bytes latched one per frame before the script starts.
    pub preroll: Vec<u8>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            memory_map: MemoryMap::default(),
            player_state_address: Address(0x001D),
            grounded_value: 0,
            stall_budget: 600,
            allow_opposing_directions: false,
            preroll: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    /// Parse a config from JSON. Missing fields take their default values.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that the settings are consistent with each other.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.memory_map.contains(self.player_state_address) {
            return Err(ConfigError::AddressOutOfRange {
                address: self.player_state_address,
                map: self.memory_map,
            });
        }
        if self.stall_budget == 0 {
            return Err(ConfigError::InvalidStallBudget);
        }
        Ok(())
    }

    /// The condition that holds while the player is on the ground.
    pub fn grounded_condition(&self) -> Condition {
        Condition::new(
            self.player_state_address,
            Comparison::Eq,
            self.grounded_value,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = RuntimeConfig::from_json(
            r#"{ "player_state_address": 14, "stall_budget": 120, "preroll": [0, 8, 0] }"#,
        )
        .unwrap();
        assert_eq!(config.player_state_address, Address(0x000E));
        assert_eq!(config.stall_budget, 120);
        assert_eq!(config.preroll, vec![0, 8, 0]);
        assert_eq!(config.memory_map, MemoryMap::default());
        assert_eq!(config.grounded_value, 0);
    }

    #[test]
    fn test_json_round_trip() {
        let config = RuntimeConfig {
            allow_opposing_directions: true,
            ..RuntimeConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(RuntimeConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_inconsistent_config() {
        let error = RuntimeConfig::from_json(r#"{ "player_state_address": 4096 }"#).unwrap_err();
        assert!(matches!(error, ConfigError::AddressOutOfRange { .. }));

        let error = RuntimeConfig::from_json(r#"{ "stall_budget": 0 }"#).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidStallBudget));

        let error = RuntimeConfig::from_json(r#"{ "stall_budget": -1 }"#).unwrap_err();
        assert!(matches!(error, ConfigError::JsonError(_)));
    }

    #[test]
    fn test_grounded_condition() {
        let condition = RuntimeConfig::default().grounded_condition();
        assert_eq!(condition.address, Address(0x001D));
        assert_eq!(condition.comparison, Comparison::Eq);
        assert_eq!(condition.value, 0);
    }
}
