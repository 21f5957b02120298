use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

pub const DEFAULT_INTEREST_RATE: Decimal = dec!(0.05);

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Interest rate must not be negative, got {rate}")]
    NegativeInterestRate { rate: Decimal },
}

/// Settings shared by every account opened through a ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    interest_rate: Decimal,
}

impl LedgerConfig {
    pub fn new(interest_rate: Decimal) -> Result<Self, ConfigError> {
        if interest_rate < Decimal::ZERO {
            return Err(ConfigError::NegativeInterestRate {
                rate: interest_rate,
            });
        }
        Ok(Self { interest_rate })
    }

    pub fn interest_rate(&self) -> Decimal {
        self.interest_rate
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            interest_rate: DEFAULT_INTEREST_RATE,
        }
    }
}
