//! TOKEN VENDOR LIBRARY
//!
//! This library provides a fixed-rate exchange between a fungible token and a
//! base currency. Buyers send currency and receive tokens, sellers hand back
//! tokens they approved and receive currency, the owner withdraws the
//! collected currency.

pub mod actor;
pub mod adapter;
pub mod model;
pub mod service;

pub type Result<T> = anyhow::Result<T>;
