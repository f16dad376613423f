use std::collections::BTreeMap;

use anyhow::anyhow;
use log::debug;
use thiserror::Error;

use crate::model::{Address, Amount};
use crate::Result;

/// Currency related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    /// The payer does not hold enough currency.
    #[error("Insufficient funds for '{account}': available {available}, requested {requested}.")]
    InsufficientFunds {
        /// The paying account.
        account: Address,

        /// Its currency balance.
        available: Amount,

        /// The amount requested.
        requested: Amount,
    },

    /// A balance would exceed the representable range.
    #[error("Currency balance overflow.")]
    Overflow,
}

/// Native currency holdings of every account of the hosting platform.
pub trait CurrencyBank {
    /// Currency held by an account, zero for unknown accounts.
    fn balance_of(&self, account: &Address) -> Amount;

    /// Every account that ever held currency.
    fn accounts(&self) -> Vec<Address>;

    /// Give new currency to an account.
    fn credit(&mut self, account: &Address, amount: Amount) -> Result<()>;

    /// Move currency between two accounts.
    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<()>;
}

/// A simple in-memory currency bank.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCurrencyBank {
    balances: BTreeMap<Address, Amount>,
}

impl CurrencyBank for InMemoryCurrencyBank {
    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    fn accounts(&self) -> Vec<Address> {
        self.balances.keys().cloned().collect()
    }

    fn credit(&mut self, account: &Address, amount: Amount) -> Result<()> {
        let balance = self
            .balance_of(account)
            .checked_add(amount)
            .ok_or(BankError::Overflow)?;
        self.balances.insert(account.clone(), balance);
        debug!("Currency credit {account}: {amount}");

        Ok(())
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        let available = self.balance_of(from);

        if available < amount {
            return Err(anyhow!(BankError::InsufficientFunds {
                account: from.clone(),
                available,
                requested: amount,
            }));
        }
        if from != to {
            let credited = self
                .balance_of(to)
                .checked_add(amount)
                .ok_or(BankError::Overflow)?;
            self.balances.insert(from.clone(), available - amount);
            self.balances.insert(to.clone(), credited);
        }
        debug!("Currency transfer {from} -> {to}: {amount}");

        Ok(())
    }
}
