use std::collections::{BTreeMap, HashMap};

use anyhow::anyhow;
use log::debug;
use thiserror::Error;

use crate::model::{Address, Amount};
use crate::Result;

/// Token ledger related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The spender was not allowed to move that many tokens.
    #[error("Allowance exceeded: allowed {allowance}, requested {requested}.")]
    AllowanceExceeded {
        /// What is left of the allowance.
        allowance: Amount,

        /// The amount the spender tried to move.
        requested: Amount,
    },

    /// The sender does not hold enough tokens.
    #[error("Insufficient token balance for '{account}': balance {balance}, requested {requested}.")]
    InsufficientBalance {
        /// The account tokens are taken from.
        account: Address,

        /// Its token balance.
        balance: Amount,

        /// The amount requested.
        requested: Amount,
    },

    /// A balance would exceed the representable range.
    #[error("Token balance overflow.")]
    Overflow,
}

/// Fungible token ledger trait.
///
/// Account balances and delegated transfer allowances. Every mutating
/// operation either succeeds entirely or leaves the ledger untouched.
pub trait TokenLedger {
    /// Total amount of tokens in existence.
    fn total_supply(&self) -> Amount;

    /// Token balance of an account, zero for unknown accounts.
    fn balance_of(&self, account: &Address) -> Amount;

    /// What `spender` may still move out of `owner`'s balance.
    fn allowance(&self, owner: &Address, spender: &Address) -> Amount;

    /// Every account that ever held tokens.
    fn accounts(&self) -> Vec<Address>;

    /// Move tokens owned by `from` to `to`.
    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<()>;

    /// Allow `spender` to move up to `amount` tokens of `owner`. Replaces any
    /// previous allowance.
    fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) -> Result<()>;

    /// Move tokens of `from` to `to` on behalf of `spender`, consuming the
    /// allowance `from` granted to `spender`.
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()>;
}

/// A simple in-memory token ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenLedger {
    total_supply: Amount,
    balances: BTreeMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
}

impl InMemoryTokenLedger {
    /// Create a ledger whose whole supply belongs to `owner`.
    ///
    /// ```
    /// use token_vendor::adapter::{InMemoryTokenLedger, TokenLedger};
    /// use token_vendor::model::Address;
    ///
    /// let deployer = Address::parse("deployer").unwrap();
    /// let ledger = InMemoryTokenLedger::mint(&deployer, 1_000);
    ///
    /// assert_eq!(ledger.total_supply(), 1_000);
    /// assert_eq!(ledger.balance_of(&deployer), 1_000);
    /// ```
    pub fn mint(owner: &Address, supply: Amount) -> Self {
        let mut ledger = Self {
            total_supply: supply,
            ..Self::default()
        };
        ledger.balances.insert(owner.clone(), supply);

        ledger
    }

    /// Check a transfer can happen, return the new balances of both sides.
    fn check_transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(Amount, Amount)> {
        let balance = self.balance_of(from);

        if balance < amount {
            return Err(anyhow!(LedgerError::InsufficientBalance {
                account: from.clone(),
                balance,
                requested: amount,
            }));
        }
        if from == to {
            return Ok((balance, balance));
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        Ok((balance - amount, credited))
    }

    fn apply_transfer(&mut self, from: &Address, to: &Address, balances: (Amount, Amount)) {
        self.balances.insert(from.clone(), balances.0);
        self.balances.insert(to.clone(), balances.1);
    }
}

impl TokenLedger for InMemoryTokenLedger {
    fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or_default()
    }

    fn accounts(&self) -> Vec<Address> {
        self.balances.keys().cloned().collect()
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        let balances = self.check_transfer(from, to, amount)?;
        self.apply_transfer(from, to, balances);
        debug!("Token transfer {from} -> {to}: {amount}");

        Ok(())
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) -> Result<()> {
        self.allowances
            .insert((owner.clone(), spender.clone()), amount);
        debug!("Token approval {owner} -> {spender}: {amount}");

        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()> {
        let allowance = self.allowance(from, spender);

        if allowance < amount {
            return Err(anyhow!(LedgerError::AllowanceExceeded {
                allowance,
                requested: amount,
            }));
        }
        let balances = self.check_transfer(from, to, amount)?;
        self.allowances
            .insert((from.clone(), spender.clone()), allowance - amount);
        self.apply_transfer(from, to, balances);
        debug!("Token transfer {from} -> {to} by {spender}: {amount}");

        Ok(())
    }
}
