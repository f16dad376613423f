use rust_decimal::Decimal;
use serde::Serialize;

use super::{format_units, Address, Amount, UnitsError};

/// Snapshot of what a participant holds, in smallest units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBalance {
    /// The account.
    pub account: Address,

    /// Currency held by the account.
    pub currency: Amount,

    /// Tokens held by the account in the token ledger.
    pub tokens: Amount,
}

/// Human readable form of an [AccountBalance], one CSV line of the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CSVAccountEntity {
    pub account: String,
    pub currency: Decimal,
    pub tokens: Decimal,
}

impl TryFrom<&AccountBalance> for CSVAccountEntity {
    type Error = UnitsError;

    /// ```
    /// use rust_decimal::Decimal;
    /// use token_vendor::model::{AccountBalance, Address, CSVAccountEntity};
    ///
    /// let balance = AccountBalance {
    ///     account: Address::parse("alice").unwrap(),
    ///     currency: 1_000_000_000_000_000_000,
    ///     tokens: 0,
    /// };
    /// let entity = CSVAccountEntity::try_from(&balance).unwrap();
    ///
    /// assert_eq!(entity.account, "alice");
    /// assert_eq!(entity.currency, Decimal::ONE);
    /// assert_eq!(entity.tokens, Decimal::ZERO);
    /// ```
    fn try_from(balance: &AccountBalance) -> Result<Self, Self::Error> {
        Ok(Self {
            account: balance.account.to_string(),
            currency: format_units(balance.currency)?,
            tokens: format_units(balance.tokens)?,
        })
    }
}
