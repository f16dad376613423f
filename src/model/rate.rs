use std::fmt;

use thiserror::Error;

use super::Amount;

/// Error type for rate creation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateError {
    /// A rate of zero would give tokens away for free.
    #[error("Rate must be strictly positive.")]
    Zero,
}

/// Number of token units delivered for one unit of currency. A rate is
/// fixed when the exchange is deployed and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate(Amount);

impl Rate {
    /// Create a new rate.
    ///
    /// ```
    /// use token_vendor::model::{Rate, RateError};
    ///
    /// let rate = Rate::new(100).unwrap();
    /// assert_eq!(rate.get(), 100);
    ///
    /// assert_eq!(Rate::new(0).unwrap_err(), RateError::Zero);
    /// ```
    pub fn new(tokens_per_unit: Amount) -> Result<Self, RateError> {
        if tokens_per_unit == 0 {
            return Err(RateError::Zero);
        }

        Ok(Self(tokens_per_unit))
    }

    /// The number of tokens per currency unit.
    pub fn get(&self) -> Amount {
        self.0
    }

    /// Tokens delivered for the given currency amount, `None` on overflow.
    pub fn tokens_for(&self, currency_amount: Amount) -> Option<Amount> {
        currency_amount.checked_mul(self.0)
    }

    /// Currency paid back for the given token amount.
    ///
    /// The division truncates: token amounts that are not a multiple of the
    /// rate leave the remainder with the exchange.
    ///
    /// ```
    /// use token_vendor::model::Rate;
    ///
    /// let rate = Rate::new(100).unwrap();
    /// assert_eq!(rate.currency_for(250), 2);
    /// assert_eq!(rate.currency_for(99), 0);
    /// ```
    pub fn currency_for(&self, token_amount: Amount) -> Amount {
        token_amount / self.0
    }
}

impl Default for Rate {
    /// The reference deployment rate: 100 tokens per currency unit.
    fn default() -> Self {
        Self(100)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} tokens per unit", self.0)
    }
}
