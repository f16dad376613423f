use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use super::{parse_units, Address, AddressError, Amount, UnitsError};

/// What an order asks the exchange to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderKind {
    /// Credit the caller with currency from the host faucet.
    Faucet(Amount),

    /// Move tokens from the caller into the exchange inventory.
    Fund(Amount),

    /// Pay the given currency amount for tokens.
    Buy(Amount),

    /// Hand the given token amount back for currency.
    Sell(Amount),

    /// Allow the exchange to pull up to the given token amount.
    Approve(Amount),

    /// Withdraw all the currency held by the exchange (owner only).
    Withdraw,

    /// Hand the exchange over to another owner (owner only).
    TransferOwnership(Address),
}

/// An operation requested by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeOrder {
    /// Who sends the order.
    pub caller: Address,

    /// What is requested.
    pub kind: OrderKind,
}

/// Error type for order parsing.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The order type is not known.
    #[error("Unknown order type '{0}'.")]
    UnknownKind(String),

    /// The order type requires an amount.
    #[error("Order type '{0}' requires an amount.")]
    MissingAmount(String),

    /// The amount field is not a decimal number.
    #[error("Invalid amount '{0}'.")]
    InvalidAmount(String),

    /// The amount can not be expressed in smallest units.
    #[error(transparent)]
    Units(#[from] UnitsError),

    /// The order type requires a target account.
    #[error("Order type '{0}' requires a target account.")]
    MissingTarget(String),

    /// An account field is blank.
    #[error(transparent)]
    Address(#[from] AddressError),
}

/// One line of an order CSV file: `type, account, amount, target`.
#[derive(Debug, Clone, Deserialize)]
pub struct CSVOrderEntity {
    /// The order type.
    #[serde(rename = "type")]
    pub kind: String,

    /// The caller.
    pub account: String,

    /// Human readable amount, if the order type has one.
    pub amount: Option<String>,

    /// Target account, if the order type has one.
    pub target: Option<String>,
}

impl CSVOrderEntity {
    fn amount(&self) -> Result<Amount, OrderError> {
        let raw = self
            .amount
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or_else(|| OrderError::MissingAmount(self.kind.clone()))?;
        let value =
            Decimal::from_str(raw).map_err(|_| OrderError::InvalidAmount(raw.to_string()))?;

        Ok(parse_units(value)?)
    }

    fn target(&self) -> Result<Address, OrderError> {
        let raw = self
            .target
            .as_deref()
            .ok_or_else(|| OrderError::MissingTarget(self.kind.clone()))?;

        Ok(Address::parse(raw)?)
    }
}

impl TryFrom<CSVOrderEntity> for ExchangeOrder {
    type Error = OrderError;

    /// ```
    /// use token_vendor::model::{Address, CSVOrderEntity, ExchangeOrder, OrderError, OrderKind};
    ///
    /// let entity = CSVOrderEntity {
    ///     kind: "Buy".to_string(),
    ///     account: "alice".to_string(),
    ///     amount: Some("0.5".to_string()),
    ///     target: None,
    /// };
    /// let order = ExchangeOrder::try_from(entity).unwrap();
    ///
    /// assert_eq!(order.caller, Address::parse("alice").unwrap());
    /// assert_eq!(order.kind, OrderKind::Buy(500_000_000_000_000_000));
    ///
    /// let entity = CSVOrderEntity {
    ///     kind: "sell".to_string(),
    ///     account: "alice".to_string(),
    ///     amount: None,
    ///     target: None,
    /// };
    /// let error = ExchangeOrder::try_from(entity).unwrap_err();
    /// assert!(matches!(error, OrderError::MissingAmount(_)));
    /// ```
    fn try_from(entity: CSVOrderEntity) -> Result<Self, Self::Error> {
        let caller = Address::parse(&entity.account)?;
        let kind = match entity.kind.trim().to_lowercase().as_str() {
            "faucet" => OrderKind::Faucet(entity.amount()?),
            "fund" => OrderKind::Fund(entity.amount()?),
            "buy" => OrderKind::Buy(entity.amount()?),
            "sell" => OrderKind::Sell(entity.amount()?),
            "approve" => OrderKind::Approve(entity.amount()?),
            "withdraw" => OrderKind::Withdraw,
            "transfer_ownership" => OrderKind::TransferOwnership(entity.target()?),
            _ => return Err(OrderError::UnknownKind(entity.kind)),
        };

        Ok(Self { caller, kind })
    }
}
