//! # Model module
//!
//! Plain data used across the crate: addresses, amounts and their units,
//! the exchange rate, ownership, events, orders and configuration.

mod account;
mod address;
mod config;
mod event;
mod order;
mod ownership;
mod rate;
mod units;

pub use account::*;
pub use address::*;
pub use config::*;
pub use event::*;
pub use order::*;
pub use ownership::*;
pub use rate::*;
pub use units::*;
