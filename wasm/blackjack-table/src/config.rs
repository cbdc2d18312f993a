use serde::Deserialize;

fn default_starting_money() -> u32 {
    300
}

fn default_bet() -> u32 {
    10
}

/// House table limit; a configured ceiling can only lower it.
pub const HOUSE_MAX_BET: u32 = 100;

fn default_max_bet() -> u32 {
    HOUSE_MAX_BET
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct TableConfig {
    #[serde(default = "default_starting_money")]
    pub starting_money: u32,
    #[serde(default = "default_bet")]
    pub default_bet: u32,
    #[serde(default = "default_max_bet")]
    pub max_bet: u32,
    /// Fixed shuffle seed; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            starting_money: default_starting_money(),
            default_bet: default_bet(),
            max_bet: default_max_bet(),
            seed: None,
        }
    }
}

impl TableConfig {
    pub fn validated(mut self) -> Self {
        self.max_bet = self.max_bet.clamp(1, HOUSE_MAX_BET);
        self.default_bet = self.default_bet.clamp(1, self.max_bet);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TableConfig::default();
        assert_eq!(config.starting_money, 300);
        assert_eq!(config.default_bet, 10);
        assert_eq!(config.max_bet, 100);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_partial_input_uses_defaults() {
        let config: TableConfig =
            serde_json::from_str(r#"{"seed": 9, "starting_money": 50}"#).unwrap();
        assert_eq!(config.starting_money, 50);
        assert_eq!(config.default_bet, 10);
        assert_eq!(config.max_bet, 100);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_validated_clamps_bets() {
        let config = TableConfig {
            default_bet: 500,
            max_bet: 0,
            ..TableConfig::default()
        }
        .validated();
        assert_eq!(config.max_bet, 1);
        assert_eq!(config.default_bet, 1);

        let config = TableConfig {
            default_bet: 0,
            ..TableConfig::default()
        }
        .validated();
        assert_eq!(config.default_bet, 1);
    }

    #[test]
    fn test_validated_caps_max_bet_at_house_limit() {
        let config = TableConfig {
            max_bet: u32::MAX,
            default_bet: 250,
            ..TableConfig::default()
        }
        .validated();
        assert_eq!(config.max_bet, HOUSE_MAX_BET);
        assert_eq!(config.default_bet, HOUSE_MAX_BET);

        let config = TableConfig {
            max_bet: 25,
            ..TableConfig::default()
        }
        .validated();
        assert_eq!(config.max_bet, 25);
    }
}
