use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info};

use crate::adapter::{
    CurrencyBank, EventSink, InMemoryCurrencyBank, InMemoryTokenLedger, TokenLedger,
};
use crate::model::{AccountBalance, Address, Amount, ExchangeConfig, ExchangeOrder, OrderKind, Rate};
use crate::service::Vendor;
use crate::Result;

/// The whole state touched by exchange operations.
#[derive(Debug, Clone)]
struct Books<L, B> {
    vendor: Vendor,
    tokens: L,
    bank: B,
}

/// The [Exchange] hosts a [Vendor] together with the token ledger and the
/// currency bank it trades on.
///
/// Operations are applied one at a time. Each one works on a staged copy of
/// the books which replaces the live books only when the operation succeeds,
/// so a failed operation leaves no trace, even when a collaborator fails
/// after the payment was captured. Events are handed to the sink once the
/// operation is committed.
///
/// The service can be shared amongst multiple actors, its internal state uses
/// interior mutability.
pub struct Exchange<L, B> {
    books: RwLock<Books<L, B>>,
    sink: Box<dyn EventSink + Sync + Send>,
}

impl Exchange<InMemoryTokenLedger, InMemoryCurrencyBank> {
    /// Deploy an exchange on fresh in-memory ledgers: the token supply is
    /// minted to the deployer, the vendor is created and funded with the
    /// configured inventory, then handed to the configured owner.
    ///
    /// ```
    /// use token_vendor::adapter::LogEventSink;
    /// use token_vendor::model::ExchangeConfig;
    /// use token_vendor::service::Exchange;
    ///
    /// let config = ExchangeConfig::default();
    /// let exchange = Exchange::deploy(&config, LogEventSink).unwrap();
    ///
    /// assert_eq!(exchange.token_balance(), config.inventory);
    /// assert_eq!(exchange.currency_balance(), 0);
    /// assert_eq!(exchange.owner(), config.owner);
    /// assert_eq!(exchange.rate(), config.rate);
    /// ```
    pub fn deploy(
        config: &ExchangeConfig,
        sink: impl EventSink + Sync + Send + 'static,
    ) -> Result<Self> {
        config.validate()?;
        let mut tokens = InMemoryTokenLedger::mint(&config.deployer, config.token_supply);
        tokens.transfer(&config.deployer, &config.vendor, config.inventory)?;
        let vendor = Vendor::new(config.vendor.clone(), config.deployer.clone(), config.rate);
        let exchange = Self::new(vendor, tokens, InMemoryCurrencyBank::default(), sink);

        if config.owner != config.deployer {
            exchange.transfer_ownership(&config.deployer, config.owner.clone())?;
        }
        info!(
            "Exchange deployed at '{}' with {} at {}",
            config.vendor, config.inventory, config.rate
        );

        Ok(exchange)
    }
}

impl<L, B> Exchange<L, B>
where
    L: TokenLedger + Clone,
    B: CurrencyBank + Clone,
{
    /// Create an exchange hosting `vendor` on the given ledgers.
    pub fn new(vendor: Vendor, tokens: L, bank: B, sink: impl EventSink + Sync + Send + 'static) -> Self {
        Self {
            books: RwLock::new(Books {
                vendor,
                tokens,
                bank,
            }),
            sink: Box::new(sink),
        }
    }

    // Only staged copies are mutated while the write lock is held, the live
    // books stay consistent even if an operation panicked.
    fn read(&self) -> RwLockReadGuard<'_, Books<L, B>> {
        self.books.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Books<L, B>> {
        self.books.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `operation` as a single unit of work.
    fn execute<T>(&self, operation: impl FnOnce(&mut Books<L, B>) -> Result<T>) -> Result<T> {
        let (outcome, events) = {
            let mut guard = self.write();
            let mut staged = guard.clone();
            let outcome = operation(&mut staged)?;
            let events = staged.vendor.drain_events();
            *guard = staged;

            (outcome, events)
        };

        // the books are unlocked before the sink runs
        for event in &events {
            self.sink.emit(event);
        }

        Ok(outcome)
    }

    /// Pay `currency_amount` for tokens. Returns the tokens delivered.
    ///
    /// ```
    /// use token_vendor::adapter::LogEventSink;
    /// use token_vendor::model::{Address, ExchangeConfig};
    /// use token_vendor::service::{Exchange, ExchangeError};
    ///
    /// let exchange = Exchange::deploy(&ExchangeConfig::default(), LogEventSink).unwrap();
    /// let alice = Address::parse("alice").unwrap();
    /// exchange.faucet(&alice, 10).unwrap();
    ///
    /// assert_eq!(exchange.buy(&alice, 2).unwrap(), 200);
    /// assert_eq!(exchange.token_balance_of(&alice), 200);
    /// assert_eq!(exchange.currency_balance(), 2);
    ///
    /// let error = exchange.buy(&alice, 0).unwrap_err();
    /// assert_eq!(error.downcast_ref::<ExchangeError>(), Some(&ExchangeError::InvalidAmount));
    /// ```
    pub fn buy(&self, buyer: &Address, currency_amount: Amount) -> Result<Amount> {
        let delivered = self.execute(|books| {
            books
                .vendor
                .buy(&mut books.tokens, &mut books.bank, buyer, currency_amount)
        })?;
        info!("{buyer} bought {delivered} tokens for {currency_amount}");

        Ok(delivered)
    }

    /// Sell `token_amount` previously approved tokens. Returns the currency
    /// paid to the seller.
    pub fn sell(&self, seller: &Address, token_amount: Amount) -> Result<Amount> {
        let paid = self.execute(|books| {
            books
                .vendor
                .sell(&mut books.tokens, &mut books.bank, seller, token_amount)
        })?;
        info!("{seller} sold {token_amount} tokens for {paid}");

        Ok(paid)
    }

    /// Withdraw all the collected currency to the owner. Returns the amount
    /// withdrawn.
    pub fn withdraw(&self, caller: &Address) -> Result<Amount> {
        let withdrawn = self.execute(|books| books.vendor.withdraw(&mut books.bank, caller))?;
        info!("{caller} withdrew {withdrawn}");

        Ok(withdrawn)
    }

    /// Hand the exchange over to `new_owner`.
    pub fn transfer_ownership(&self, caller: &Address, new_owner: Address) -> Result<()> {
        self.execute(|books| books.vendor.transfer_ownership(caller, new_owner))
    }

    /// Let `spender` move up to `amount` tokens of `owner`.
    pub fn approve(&self, owner: &Address, spender: &Address, amount: Amount) -> Result<()> {
        self.execute(|books| books.tokens.approve(owner, spender, amount))
    }

    /// Plain token transfer between two accounts.
    pub fn transfer_tokens(&self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        self.execute(|books| books.tokens.transfer(from, to, amount))
    }

    /// Move tokens of `from` into the exchange inventory.
    pub fn fund(&self, from: &Address, amount: Amount) -> Result<()> {
        self.execute(|books| {
            let vendor = books.vendor.address().clone();
            books.tokens.transfer(from, &vendor, amount)
        })?;
        debug!("{from} funded the exchange with {amount} tokens");

        Ok(())
    }

    /// Give new currency to `account`.
    pub fn faucet(&self, account: &Address, amount: Amount) -> Result<()> {
        self.execute(|books| books.bank.credit(account, amount))
    }

    /// Apply the given order and return the amount it moved: tokens for a
    /// buy, currency for a sell or a withdrawal, the order amount otherwise.
    ///
    /// ```
    /// use token_vendor::adapter::LogEventSink;
    /// use token_vendor::model::{Address, ExchangeConfig, ExchangeOrder, OrderKind};
    /// use token_vendor::service::Exchange;
    ///
    /// let exchange = Exchange::deploy(&ExchangeConfig::default(), LogEventSink).unwrap();
    /// let alice = Address::parse("alice").unwrap();
    ///
    /// exchange.process_order(ExchangeOrder { caller: alice.clone(), kind: OrderKind::Faucet(5) }).unwrap();
    /// let delivered = exchange
    ///     .process_order(ExchangeOrder { caller: alice.clone(), kind: OrderKind::Buy(5) })
    ///     .unwrap();
    ///
    /// assert_eq!(delivered, 500);
    /// ```
    pub fn process_order(&self, order: ExchangeOrder) -> Result<Amount> {
        let caller = &order.caller;

        match order.kind {
            OrderKind::Faucet(amount) => self.faucet(caller, amount).map(|_| amount),
            OrderKind::Fund(amount) => self.fund(caller, amount).map(|_| amount),
            OrderKind::Buy(amount) => self.buy(caller, amount),
            OrderKind::Sell(amount) => self.sell(caller, amount),
            OrderKind::Approve(amount) => {
                let vendor = self.address();
                self.approve(caller, &vendor, amount).map(|_| amount)
            }
            OrderKind::Withdraw => self.withdraw(caller),
            OrderKind::TransferOwnership(new_owner) => {
                self.transfer_ownership(caller, new_owner).map(|_| 0)
            }
        }
    }

    /// The exchange's own account.
    pub fn address(&self) -> Address {
        self.read().vendor.address().clone()
    }

    pub fn owner(&self) -> Address {
        self.read().vendor.owner().clone()
    }

    pub fn rate(&self) -> Rate {
        self.read().vendor.rate()
    }

    /// Tokens available for sale.
    pub fn token_balance(&self) -> Amount {
        let books = self.read();
        books.vendor.token_balance(&books.tokens)
    }

    /// Currency collected and not yet withdrawn.
    pub fn currency_balance(&self) -> Amount {
        let books = self.read();
        books.vendor.currency_balance(&books.bank)
    }

    pub fn token_balance_of(&self, account: &Address) -> Amount {
        self.read().tokens.balance_of(account)
    }

    pub fn currency_balance_of(&self, account: &Address) -> Amount {
        self.read().bank.balance_of(account)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.read().tokens.allowance(owner, spender)
    }

    /// Balances of every account known to either ledger, sorted by address.
    pub fn accounts(&self) -> Vec<AccountBalance> {
        let books = self.read();
        let addresses: BTreeSet<Address> = books
            .tokens
            .accounts()
            .into_iter()
            .chain(books.bank.accounts())
            .collect();

        addresses
            .into_iter()
            .map(|account| AccountBalance {
                currency: books.bank.balance_of(&account),
                tokens: books.tokens.balance_of(&account),
                account,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;

    use super::*;
    use crate::adapter::{LedgerError, RecordingEventSink};
    use crate::model::{OwnershipError, VendorEvent, DECIMALS};
    use crate::service::ExchangeError;

    fn address(value: &str) -> Address {
        Address::parse(value).unwrap()
    }

    fn units(value: u128) -> Amount {
        value * 10u128.pow(DECIMALS)
    }

    /// Reference deployment: 1000 tokens in the vendor, 100 tokens per unit,
    /// `owner` owns the vendor, `alice` has 10 units of currency.
    fn deploy() -> (
        Exchange<InMemoryTokenLedger, InMemoryCurrencyBank>,
        Arc<RecordingEventSink>,
    ) {
        let sink = Arc::new(RecordingEventSink::default());
        let config = ExchangeConfig {
            owner: address("owner"),
            ..ExchangeConfig::default()
        };
        let exchange = Exchange::deploy(&config, sink.clone()).unwrap();
        exchange.faucet(&address("alice"), units(10)).unwrap();

        (exchange, sink)
    }

    #[test]
    fn test_deploy() {
        let (exchange, sink) = deploy();

        assert_eq!(exchange.token_balance(), units(1_000));
        assert_eq!(exchange.token_balance_of(&address("deployer")), 0);
        assert_eq!(exchange.owner(), address("owner"));
        assert_eq!(exchange.address(), address("vendor"));
        assert_eq!(
            sink.events(),
            vec![VendorEvent::OwnershipTransferred {
                previous_owner: address("deployer"),
                new_owner: address("owner"),
            }]
        );
    }

    #[test]
    fn test_deploy_invalid_config() {
        let config = ExchangeConfig {
            inventory: units(2_000),
            ..ExchangeConfig::default()
        };

        assert!(Exchange::deploy(&config, RecordingEventSink::default()).is_err());
    }

    #[test]
    fn test_buy_without_currency() {
        let (exchange, _sink) = deploy();
        let error = exchange.buy(&address("alice"), 0).unwrap_err();

        assert_eq!(
            error.downcast_ref::<ExchangeError>(),
            Some(&ExchangeError::InvalidAmount)
        );
    }

    #[test]
    fn test_buy_more_than_inventory() {
        let (exchange, sink) = deploy();
        exchange.faucet(&address("alice"), units(200)).unwrap();
        let error = exchange.buy(&address("alice"), units(101)).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<ExchangeError>(),
            Some(ExchangeError::InsufficientInventory { .. })
        ));
        assert_eq!(exchange.token_balance(), units(1_000));
        assert_eq!(exchange.currency_balance_of(&address("alice")), units(210));
        assert_eq!(sink.events().len(), 1);
    }

    #[test]
    fn test_buy() {
        let (exchange, sink) = deploy();
        let delivered = exchange.buy(&address("alice"), units(1)).unwrap();

        assert_eq!(delivered, units(100));
        assert_eq!(exchange.token_balance_of(&address("alice")), units(100));
        assert_eq!(exchange.token_balance(), units(900));
        assert_eq!(exchange.currency_balance(), units(1));
        assert_eq!(
            sink.events().last(),
            Some(&VendorEvent::TokensPurchased {
                buyer: address("alice"),
                currency_amount: units(1),
                token_amount: units(100),
            })
        );
    }

    #[test]
    fn test_withdraw_not_owner() {
        let (exchange, _sink) = deploy();
        let error = exchange.withdraw(&address("alice")).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<OwnershipError>(),
            Some(OwnershipError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_withdraw_without_funds() {
        let (exchange, _sink) = deploy();
        let error = exchange.withdraw(&address("owner")).unwrap_err();

        assert_eq!(
            error.downcast_ref::<ExchangeError>(),
            Some(&ExchangeError::NoFundsToWithdraw)
        );
    }

    #[test]
    fn test_withdraw() {
        let (exchange, _sink) = deploy();
        exchange.buy(&address("alice"), units(1)).unwrap();
        let before = exchange.currency_balance_of(&address("owner"));
        let withdrawn = exchange.withdraw(&address("owner")).unwrap();

        assert_eq!(withdrawn, units(1));
        assert_eq!(exchange.currency_balance(), 0);
        assert_eq!(
            exchange.currency_balance_of(&address("owner")),
            before + units(1)
        );

        // a second withdrawal finds nothing and changes nothing
        let error = exchange.withdraw(&address("owner")).unwrap_err();
        assert_eq!(
            error.downcast_ref::<ExchangeError>(),
            Some(&ExchangeError::NoFundsToWithdraw)
        );
        assert_eq!(
            exchange.currency_balance_of(&address("owner")),
            before + units(1)
        );
    }

    #[test]
    fn test_sell_zero() {
        let (exchange, _sink) = deploy();
        let error = exchange.sell(&address("alice"), 0).unwrap_err();

        assert_eq!(
            error.downcast_ref::<ExchangeError>(),
            Some(&ExchangeError::InvalidAmount)
        );
    }

    #[test]
    fn test_sell_more_than_owned() {
        let (exchange, _sink) = deploy();
        let error = exchange.sell(&address("alice"), units(1)).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<ExchangeError>(),
            Some(ExchangeError::InsufficientCallerBalance { .. })
        ));
    }

    #[test]
    fn test_sell_after_withdraw() {
        let (exchange, _sink) = deploy();
        exchange.buy(&address("alice"), units(1)).unwrap();
        exchange.withdraw(&address("owner")).unwrap();
        exchange
            .approve(&address("alice"), &address("vendor"), units(100))
            .unwrap();
        let error = exchange.sell(&address("alice"), units(100)).unwrap_err();

        assert_eq!(
            error.downcast_ref::<ExchangeError>(),
            Some(&ExchangeError::InsufficientExchangeFunds {
                available: 0,
                requested: units(1),
            })
        );
        assert_eq!(exchange.token_balance_of(&address("alice")), units(100));
        assert_eq!(
            exchange.allowance(&address("alice"), &address("vendor")),
            units(100)
        );
    }

    #[test]
    fn test_sell_without_approval() {
        let (exchange, _sink) = deploy();
        exchange.buy(&address("alice"), units(1)).unwrap();
        let error = exchange.sell(&address("alice"), units(100)).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<LedgerError>(),
            Some(LedgerError::AllowanceExceeded { .. })
        ));
        assert_eq!(exchange.token_balance_of(&address("alice")), units(100));
        assert_eq!(exchange.currency_balance(), units(1));
    }

    #[test]
    fn test_sell() {
        let (exchange, sink) = deploy();
        exchange.buy(&address("alice"), units(1)).unwrap();
        exchange
            .approve(&address("alice"), &address("vendor"), units(100))
            .unwrap();

        assert_eq!(
            exchange.allowance(&address("alice"), &address("vendor")),
            units(100)
        );

        let before = exchange.currency_balance_of(&address("alice"));
        let paid = exchange.sell(&address("alice"), units(100)).unwrap();

        assert_eq!(paid, units(1));
        assert_eq!(exchange.token_balance(), units(1_000));
        assert_eq!(exchange.token_balance_of(&address("alice")), 0);
        assert_eq!(
            exchange.currency_balance_of(&address("alice")),
            before + units(1)
        );
        assert_eq!(
            sink.events().last(),
            Some(&VendorEvent::TokensSold {
                seller: address("alice"),
                token_amount: units(100),
                currency_amount: units(1),
            })
        );
    }

    #[test]
    fn test_transfer_ownership_not_owner() {
        let (exchange, _sink) = deploy();
        let error = exchange
            .transfer_ownership(&address("alice"), address("alice"))
            .unwrap_err();

        assert!(error.downcast_ref::<OwnershipError>().is_some());
        assert_eq!(exchange.owner(), address("owner"));
    }

    #[test]
    fn test_process_orders() {
        let (exchange, _sink) = deploy();
        let alice = address("alice");
        let orders = vec![
            (OrderKind::Buy(units(2)), units(200)),
            (OrderKind::Approve(units(50)), units(50)),
            (OrderKind::Sell(units(50)), units(1) / 2),
            (OrderKind::Fund(units(10)), units(10)),
        ];

        for (kind, expected) in orders {
            let moved = exchange
                .process_order(ExchangeOrder {
                    caller: alice.clone(),
                    kind,
                })
                .unwrap();
            assert_eq!(moved, expected);
        }

        assert_eq!(exchange.token_balance_of(&alice), units(140));
        assert_eq!(exchange.token_balance(), units(860));

        let withdrawn = exchange
            .process_order(ExchangeOrder {
                caller: address("owner"),
                kind: OrderKind::Withdraw,
            })
            .unwrap();
        assert_eq!(withdrawn, units(3) / 2);
    }

    #[test]
    fn test_accounts() {
        let (exchange, _sink) = deploy();
        exchange.buy(&address("alice"), units(1)).unwrap();
        let accounts = exchange.accounts();
        let names: Vec<&str> = accounts.iter().map(|a| a.account.as_str()).collect();

        assert_eq!(names, vec!["alice", "deployer", "vendor"]);
        assert_eq!(accounts[0].tokens, units(100));
        assert_eq!(accounts[0].currency, units(9));
        assert_eq!(accounts[2].currency, units(1));
    }

    #[test]
    fn test_exchange_can_not_own_itself() {
        let (exchange, sink) = deploy();
        exchange.buy(&address("alice"), 1).unwrap();

        let error = exchange
            .process_order(ExchangeOrder {
                caller: address("owner"),
                kind: OrderKind::TransferOwnership(address("vendor")),
            })
            .unwrap_err();

        assert_eq!(
            error.downcast_ref::<ExchangeError>(),
            Some(&ExchangeError::SelfDealing(address("vendor")))
        );
        assert_eq!(exchange.owner(), address("owner"));
        assert!(exchange.withdraw(&address("vendor")).is_err());
        assert_eq!(exchange.currency_balance(), 1);
        assert_eq!(sink.events().len(), 2);
    }

    #[test]
    fn test_exchange_can_not_buy_from_itself() {
        let (exchange, _sink) = deploy();
        exchange.faucet(&address("vendor"), units(1)).unwrap();
        let error = exchange.buy(&address("vendor"), units(1)).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<ExchangeError>(),
            Some(ExchangeError::SelfDealing(_))
        ));
        assert_eq!(exchange.token_balance(), units(1_000));
        assert_eq!(exchange.currency_balance(), units(1));
    }

    #[test]
    fn test_transfer_tokens() {
        let (exchange, _sink) = deploy();
        exchange.buy(&address("alice"), units(1)).unwrap();
        exchange
            .transfer_tokens(&address("alice"), &address("bob"), units(30))
            .unwrap();

        assert_eq!(exchange.token_balance_of(&address("alice")), units(70));
        assert_eq!(exchange.token_balance_of(&address("bob")), units(30));

        let error = exchange
            .transfer_tokens(&address("bob"), &address("alice"), units(31))
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<LedgerError>(),
            Some(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(exchange.token_balance_of(&address("bob")), units(30));
    }

    /// Sink reading the exchange back while it receives an event.
    struct QueryingSink {
        exchange: Arc<std::sync::OnceLock<Arc<Exchange<InMemoryTokenLedger, InMemoryCurrencyBank>>>>,
        seen: Arc<std::sync::Mutex<Vec<Amount>>>,
    }

    impl EventSink for QueryingSink {
        fn emit(&self, _event: &VendorEvent) {
            if let Some(exchange) = self.exchange.get() {
                self.seen.lock().unwrap().push(exchange.token_balance());
            }
        }
    }

    #[test]
    fn test_sink_can_query_the_exchange() {
        let cell = Arc::new(std::sync::OnceLock::new());
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = QueryingSink {
            exchange: cell.clone(),
            seen: seen.clone(),
        };
        let exchange = Arc::new(Exchange::deploy(&ExchangeConfig::default(), sink).unwrap());
        cell.set(exchange.clone()).ok();
        exchange.faucet(&address("alice"), units(1)).unwrap();

        exchange.buy(&address("alice"), units(1)).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![units(900)]);
    }

    /// Token ledger whose direct transfers fail once it is armed.
    #[derive(Debug, Clone)]
    struct BrokenLedger {
        inner: InMemoryTokenLedger,
        armed: bool,
    }

    impl TokenLedger for BrokenLedger {
        fn total_supply(&self) -> Amount {
            self.inner.total_supply()
        }

        fn balance_of(&self, account: &Address) -> Amount {
            self.inner.balance_of(account)
        }

        fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
            self.inner.allowance(owner, spender)
        }

        fn accounts(&self) -> Vec<Address> {
            self.inner.accounts()
        }

        fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
            if self.armed {
                anyhow::bail!("ledger unavailable");
            }
            self.inner.transfer(from, to, amount)
        }

        fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) -> Result<()> {
            self.inner.approve(owner, spender, amount)
        }

        fn transfer_from(
            &mut self,
            spender: &Address,
            from: &Address,
            to: &Address,
            amount: Amount,
        ) -> Result<()> {
            self.inner.transfer_from(spender, from, to, amount)
        }
    }

    #[test]
    fn test_failed_token_transfer_rolls_back_payment() {
        let sink = Arc::new(RecordingEventSink::default());
        let tokens = BrokenLedger {
            inner: InMemoryTokenLedger::mint(&address("vendor"), 1_000),
            armed: true,
        };
        let mut bank = InMemoryCurrencyBank::default();
        bank.credit(&address("alice"), 5).unwrap();
        let vendor = Vendor::new(address("vendor"), address("owner"), Rate::new(10).unwrap());
        let exchange = Exchange::new(vendor, tokens, bank, sink.clone());

        let error = exchange.buy(&address("alice"), 5).unwrap_err();

        assert_eq!(error.to_string(), "ledger unavailable");
        assert_eq!(exchange.currency_balance_of(&address("alice")), 5);
        assert_eq!(exchange.currency_balance(), 0);
        assert_eq!(exchange.token_balance(), 1_000);
        assert!(sink.events().is_empty());
    }

    proptest! {
        #[test]
        fn prop_buy_moves_rate_times_amount(
            rate in 1u128..1_000,
            currency in 1u128..1_000,
            inventory in 1u128..1_000_000,
        ) {
            let tokens = InMemoryTokenLedger::mint(&address("vendor"), inventory);
            let mut bank = InMemoryCurrencyBank::default();
            bank.credit(&address("alice"), currency).unwrap();
            let vendor = Vendor::new(address("vendor"), address("owner"), Rate::new(rate).unwrap());
            let exchange = Exchange::new(vendor, tokens, bank, RecordingEventSink::default());

            let result = exchange.buy(&address("alice"), currency);

            if currency * rate <= inventory {
                prop_assert_eq!(result.unwrap(), currency * rate);
                prop_assert_eq!(exchange.token_balance_of(&address("alice")), currency * rate);
                prop_assert_eq!(exchange.token_balance(), inventory - currency * rate);
                prop_assert_eq!(exchange.currency_balance(), currency);
            } else {
                let error = result.unwrap_err();
                let is_inventory_error = matches!(
                    error.downcast_ref::<ExchangeError>(),
                    Some(ExchangeError::InsufficientInventory { .. })
                );
                prop_assert!(is_inventory_error);
                prop_assert_eq!(exchange.token_balance(), inventory);
                prop_assert_eq!(exchange.token_balance_of(&address("alice")), 0);
                prop_assert_eq!(exchange.currency_balance_of(&address("alice")), currency);
                prop_assert_eq!(exchange.currency_balance(), 0);
            }
        }

        #[test]
        fn prop_buy_then_sell_round_trip(rate in 1u128..1_000, currency in 1u128..1_000, kept in 0u128..1_000) {
            let tokens = InMemoryTokenLedger::mint(&address("vendor"), 1_000_000);
            let mut bank = InMemoryCurrencyBank::default();
            bank.credit(&address("alice"), currency).unwrap();
            let vendor = Vendor::new(address("vendor"), address("owner"), Rate::new(rate).unwrap());
            let exchange = Exchange::new(vendor, tokens, bank, RecordingEventSink::default());

            let delivered = exchange.buy(&address("alice"), currency).unwrap();
            // selling back all but a few tokens loses at most one unit to truncation
            let to_sell = delivered - kept.min(delivered - 1);
            exchange.approve(&address("alice"), &address("vendor"), to_sell).unwrap();
            let paid = exchange.sell(&address("alice"), to_sell).unwrap();

            prop_assert_eq!(paid, to_sell / rate);
            prop_assert!(currency - paid <= (delivered - to_sell) / rate + 1);
            prop_assert_eq!(
                exchange.currency_balance_of(&address("alice")) + exchange.currency_balance(),
                currency
            );
        }
    }
}
