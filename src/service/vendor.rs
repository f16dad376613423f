use anyhow::bail;
use log::debug;

use crate::adapter::{CurrencyBank, TokenLedger};
use crate::model::{Address, Amount, Ownable, Rate, VendorEvent};
use crate::Result;

/// Exchange related errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExchangeError {
    /// Buy and sell amounts must be strictly positive.
    #[error("Amount must be strictly positive.")]
    InvalidAmount,

    /// The exchange does not hold enough tokens for the purchase.
    #[error("Insufficient inventory: available {available} tokens, requested {requested}.")]
    InsufficientInventory {
        /// Tokens held by the exchange.
        available: Amount,

        /// Tokens the purchase would deliver.
        requested: Amount,
    },

    /// The seller does not hold the tokens it tries to sell.
    #[error("Insufficient caller balance: balance {balance} tokens, requested {requested}.")]
    InsufficientCallerBalance {
        /// Tokens held by the seller.
        balance: Amount,

        /// Tokens the seller tries to sell.
        requested: Amount,
    },

    /// The exchange does not hold enough currency to pay the seller.
    #[error("Insufficient exchange funds: available {available}, requested {requested}.")]
    InsufficientExchangeFunds {
        /// Currency held by the exchange.
        available: Amount,

        /// Currency the sale would pay.
        requested: Amount,
    },

    /// The owner tried to withdraw from an empty exchange.
    #[error("No funds to withdraw.")]
    NoFundsToWithdraw,

    /// The exchange can not trade with itself nor be its own owner.
    #[error("The exchange account '{0}' can not be a party to its own operations.")]
    SelfDealing(Address),

    /// The conversion does not fit in an amount.
    #[error("Arithmetic overflow while converting {0} at the exchange rate.")]
    ArithmeticOverflow(Amount),
}

/// The [Vendor] holds the rules of the fixed rate exchange.
///
/// It does not own the ledgers it works on: every operation receives the
/// token ledger and the currency bank. All the checks of an operation run
/// before its first mutation, but a collaborator may still fail after the
/// payment was captured. Callers must then discard the ledgers they passed,
/// which is what the [Exchange](super::Exchange) does.
#[derive(Debug, Clone)]
pub struct Vendor {
    /// The exchange's own account in both ledgers.
    address: Address,

    /// Who may withdraw.
    ownership: Ownable,

    /// Tokens per currency unit, fixed for the lifetime of the exchange.
    rate: Rate,

    /// Events of the operations not yet drained.
    events: Vec<VendorEvent>,
}

impl Vendor {
    /// Create a vendor at `address` owned by `owner`.
    pub fn new(address: Address, owner: Address, rate: Rate) -> Self {
        Self {
            address,
            ownership: Ownable::new(owner),
            rate,
            events: Vec::new(),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn owner(&self) -> &Address {
        self.ownership.owner()
    }

    pub fn rate(&self) -> Rate {
        self.rate
    }

    /// Tokens available for sale.
    pub fn token_balance<L: TokenLedger + ?Sized>(&self, tokens: &L) -> Amount {
        tokens.balance_of(&self.address)
    }

    /// Currency collected and not yet withdrawn.
    pub fn currency_balance<B: CurrencyBank + ?Sized>(&self, bank: &B) -> Amount {
        bank.balance_of(&self.address)
    }

    /// Sell tokens to `buyer` for `currency_amount`. Returns the number of
    /// tokens delivered.
    ///
    /// ```
    /// use token_vendor::adapter::{CurrencyBank, InMemoryCurrencyBank, InMemoryTokenLedger, TokenLedger};
    /// use token_vendor::model::{Address, Rate};
    /// use token_vendor::service::{ExchangeError, Vendor};
    ///
    /// let vendor_address = Address::parse("vendor").unwrap();
    /// let alice = Address::parse("alice").unwrap();
    /// let mut tokens = InMemoryTokenLedger::mint(&vendor_address, 1_000);
    /// let mut bank = InMemoryCurrencyBank::default();
    /// bank.credit(&alice, 20).unwrap();
    ///
    /// let mut vendor = Vendor::new(vendor_address.clone(), alice.clone(), Rate::new(100).unwrap());
    /// assert_eq!(vendor.buy(&mut tokens, &mut bank, &alice, 1).unwrap(), 100);
    /// assert_eq!(tokens.balance_of(&alice), 100);
    /// assert_eq!(bank.balance_of(&vendor_address), 1);
    ///
    /// // 11 units would require 1100 tokens
    /// let error = vendor.buy(&mut tokens, &mut bank, &alice, 11).unwrap_err();
    /// assert_eq!(
    ///     error.downcast_ref::<ExchangeError>(),
    ///     Some(&ExchangeError::InsufficientInventory { available: 900, requested: 1_100 })
    /// );
    /// ```
    pub fn buy<L, B>(
        &mut self,
        tokens: &mut L,
        bank: &mut B,
        buyer: &Address,
        currency_amount: Amount,
    ) -> Result<Amount>
    where
        L: TokenLedger + ?Sized,
        B: CurrencyBank + ?Sized,
    {
        if currency_amount == 0 {
            bail!(ExchangeError::InvalidAmount);
        }
        self.reject_self(buyer)?;
        let token_amount = self
            .rate
            .tokens_for(currency_amount)
            .ok_or(ExchangeError::ArithmeticOverflow(currency_amount))?;
        let available = tokens.balance_of(&self.address);

        if available < token_amount {
            bail!(ExchangeError::InsufficientInventory {
                available,
                requested: token_amount,
            });
        }

        bank.transfer(buyer, &self.address, currency_amount)?;
        tokens.transfer(&self.address, buyer, token_amount)?;
        debug!("Vendor sold {token_amount} tokens to {buyer} for {currency_amount}");
        self.events.push(VendorEvent::TokensPurchased {
            buyer: buyer.clone(),
            currency_amount,
            token_amount,
        });

        Ok(token_amount)
    }

    /// Take `token_amount` tokens back from `seller` and pay them at the
    /// exchange rate. The seller must have approved the vendor for at least
    /// that amount beforehand. Returns the currency paid.
    ///
    /// Checks run in this order: amount, seller balance, exchange funds,
    /// allowance (enforced by the token ledger).
    pub fn sell<L, B>(
        &mut self,
        tokens: &mut L,
        bank: &mut B,
        seller: &Address,
        token_amount: Amount,
    ) -> Result<Amount>
    where
        L: TokenLedger + ?Sized,
        B: CurrencyBank + ?Sized,
    {
        if token_amount == 0 {
            bail!(ExchangeError::InvalidAmount);
        }
        self.reject_self(seller)?;
        let balance = tokens.balance_of(seller);

        if balance < token_amount {
            bail!(ExchangeError::InsufficientCallerBalance {
                balance,
                requested: token_amount,
            });
        }
        let currency_amount = self.rate.currency_for(token_amount);
        let available = bank.balance_of(&self.address);

        if available < currency_amount {
            bail!(ExchangeError::InsufficientExchangeFunds {
                available,
                requested: currency_amount,
            });
        }

        tokens.transfer_from(&self.address, seller, &self.address, token_amount)?;
        bank.transfer(&self.address, seller, currency_amount)?;
        debug!("Vendor bought {token_amount} tokens from {seller} for {currency_amount}");
        self.events.push(VendorEvent::TokensSold {
            seller: seller.clone(),
            token_amount,
            currency_amount,
        });

        Ok(currency_amount)
    }

    /// Move all the collected currency to the owner. Returns the amount
    /// withdrawn.
    pub fn withdraw<B: CurrencyBank + ?Sized>(&self, bank: &mut B, caller: &Address) -> Result<Amount> {
        self.ownership.only_owner(caller)?;
        self.reject_self(caller)?;
        let balance = bank.balance_of(&self.address);

        if balance == 0 {
            bail!(ExchangeError::NoFundsToWithdraw);
        }
        bank.transfer(&self.address, caller, balance)?;
        debug!("Vendor paid {balance} to its owner {caller}");

        Ok(balance)
    }

    /// Hand the vendor over to `new_owner`.
    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<()> {
        self.ownership.only_owner(caller)?;
        self.reject_self(&new_owner)?;
        let previous_owner = self
            .ownership
            .transfer_ownership(caller, new_owner.clone())?;
        self.events.push(VendorEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        });

        Ok(())
    }

    fn reject_self(&self, account: &Address) -> Result<()> {
        if account == &self.address {
            bail!(ExchangeError::SelfDealing(account.clone()));
        }

        Ok(())
    }

    /// Take the pending events, oldest first.
    pub fn drain_events(&mut self) -> Vec<VendorEvent> {
        std::mem::take(&mut self.events)
    }
}
