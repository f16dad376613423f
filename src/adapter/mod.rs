//! The adapter module holds the collaborators the exchange relies on: the
//! token ledger, the currency bank and the event sinks. Each comes as a trait
//! so the services do not depend on where the data actually lives.

mod currency_bank;
mod event_sink;
mod token_ledger;

pub use currency_bank::*;
pub use event_sink::*;
pub use token_ledger::*;
