use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

/// Quantities of token or currency, always expressed in the smallest unit.
pub type Amount = u128;

/// Number of fractional digits of both the token and the currency.
pub const DECIMALS: u32 = 18;

/// Error type for unit conversions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitsError {
    /// Amounts can not be negative.
    #[error("Amount must not be negative ({0} given).")]
    Negative(Decimal),

    /// The amount has more fractional digits than the smallest unit allows.
    #[error("Amount {0} is more precise than the smallest unit.")]
    TooPrecise(Decimal),

    /// The amount does not fit in the target representation.
    #[error("Amount {0} is out of range.")]
    OutOfRange(String),
}

fn one_unit() -> Decimal {
    Decimal::from(10u64.pow(DECIMALS))
}

/// Convert a human readable amount (`1.5` tokens) into smallest units.
///
/// ```
/// use rust_decimal::Decimal;
/// use token_vendor::model::{parse_units, UnitsError};
///
/// assert_eq!(parse_units(Decimal::ONE).unwrap(), 1_000_000_000_000_000_000);
/// assert_eq!(parse_units(Decimal::new(15, 1)).unwrap(), 1_500_000_000_000_000_000);
///
/// let error = parse_units(Decimal::NEGATIVE_ONE).unwrap_err();
/// assert_eq!(error, UnitsError::Negative(Decimal::NEGATIVE_ONE));
/// ```
pub fn parse_units(value: Decimal) -> Result<Amount, UnitsError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(UnitsError::Negative(value));
    }
    let scaled = value
        .checked_mul(one_unit())
        .ok_or_else(|| UnitsError::OutOfRange(value.to_string()))?;

    if !scaled.fract().is_zero() {
        return Err(UnitsError::TooPrecise(value));
    }

    scaled
        .to_u128()
        .ok_or_else(|| UnitsError::OutOfRange(value.to_string()))
}

/// Convert an amount in smallest units back to its human readable form.
///
/// ```
/// use rust_decimal::Decimal;
/// use token_vendor::model::format_units;
///
/// assert_eq!(format_units(100_000_000_000_000_000_000).unwrap(), Decimal::ONE_HUNDRED);
/// assert_eq!(format_units(1).unwrap().to_string(), "0.000000000000000001");
/// ```
pub fn format_units(amount: Amount) -> Result<Decimal, UnitsError> {
    let value =
        i128::try_from(amount).map_err(|_| UnitsError::OutOfRange(amount.to_string()))?;

    Decimal::try_from_i128_with_scale(value, DECIMALS)
        .map(|decimal| decimal.normalize())
        .map_err(|_| UnitsError::OutOfRange(amount.to_string()))
}
