use std::fmt;

use super::{Address, Amount};

/// Notifications emitted by the exchange once an operation is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorEvent {
    /// Currency was exchanged for tokens.
    TokensPurchased {
        buyer: Address,
        currency_amount: Amount,
        token_amount: Amount,
    },

    /// Tokens were handed back for currency.
    TokensSold {
        seller: Address,
        token_amount: Amount,
        currency_amount: Amount,
    },

    /// The exchange changed hands.
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
}

impl fmt::Display for VendorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokensPurchased {
                buyer,
                currency_amount,
                token_amount,
            } => write!(
                f,
                "TokensPurchased(buyer={buyer}, currency={currency_amount}, tokens={token_amount})"
            ),
            Self::TokensSold {
                seller,
                token_amount,
                currency_amount,
            } => write!(
                f,
                "TokensSold(seller={seller}, tokens={token_amount}, currency={currency_amount})"
            ),
            Self::OwnershipTransferred {
                previous_owner,
                new_owner,
            } => write!(
                f,
                "OwnershipTransferred(previous={previous_owner}, new={new_owner})"
            ),
        }
    }
}
