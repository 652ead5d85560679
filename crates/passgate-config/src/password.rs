use crate::{ConfigError, parse_var};

/// bcrypt's default work factor.
pub const DEFAULT_COST: u32 = 12;
const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PasswordConfig {
    pub cost: u32,
}

impl PasswordConfig {
    pub fn new(cost: u32) -> Result<Self, ConfigError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                reason: format!("must be between {MIN_COST} and {MAX_COST}, got {cost}"),
            });
        }
        Ok(Self { cost })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(parse_var("BCRYPT_COST", DEFAULT_COST)?)
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_bounds() {
        assert!(PasswordConfig::new(4).is_ok());
        assert!(PasswordConfig::new(31).is_ok());
        assert!(PasswordConfig::new(3).is_err());
        assert!(PasswordConfig::new(32).is_err());
    }
}
