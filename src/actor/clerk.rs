//! The clerk actor applies the orders it receives to the exchange.
//! For that purpose, it uses the [Exchange] service.

use std::sync::{mpsc::Receiver, Arc};

use crate::adapter::{CurrencyBank, TokenLedger};
use crate::{model::ExchangeOrder, service::Exchange};

/// The clerk actor is responsible for submitting the orders to the exchange.
pub struct Clerk<L, B> {
    /// The exchange service.
    exchange: Arc<Exchange<L, B>>,

    /// The order channel receiver to read exchange orders.
    order_receiver: Receiver<ExchangeOrder>,
}

impl<L, B> Clerk<L, B>
where
    L: TokenLedger + Clone,
    B: CurrencyBank + Clone,
{
    /// Create a new clerk actor.
    pub fn new(exchange: Arc<Exchange<L, B>>, order_receiver: Receiver<ExchangeOrder>) -> Self {
        Self {
            exchange,
            order_receiver,
        }
    }

    /// Run the clerk actor.
    /// The actor does NOT stop when an order is rejected, it only logs the
    /// error. It stops when the order channel is closed.
    pub fn run(&self) {
        for order in self.order_receiver.iter() {
            let caller = order.caller.clone();

            if let Err(error) = self.exchange.process_order(order) {
                log::info!("Order from '{}' rejected: {:#}", caller, error);
            }
        }
    }
}
