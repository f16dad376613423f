//! # Balance Exporter Actor
//!
//! This module provides the implementation of the Balance Exporter Actor.

use std::{io::Write, sync::Arc};

use log::debug;

use crate::adapter::{CurrencyBank, TokenLedger};
use crate::model::CSVAccountEntity;
use crate::{service::Exchange, Result};

/// The balance exporter actor.
pub struct BalanceExporter<L, B> {
    /// The exchange service.
    exchange: Arc<Exchange<L, B>>,

    /// A Write interface to export the CSV to
    writer: Box<dyn Write + Sync + Send>,
}

impl<L, B> BalanceExporter<L, B>
where
    L: TokenLedger + Clone,
    B: CurrencyBank + Clone,
{
    /// Create a new balance exporter actor.
    pub fn new(exchange: Arc<Exchange<L, B>>, writer: Box<dyn Write + Sync + Send>) -> Self {
        Self { exchange, writer }
    }

    /// Run the balance exporter actor.
    /// The actor writes the balances of every known account as CSV.
    pub fn run(self) -> Result<()> {
        debug!("Balance Exporter Actor started");

        let mut writer = csv::Writer::from_writer(self.writer);
        for balance in self.exchange.accounts() {
            writer.serialize(CSVAccountEntity::try_from(&balance)?)?;
        }

        writer.flush()?;

        debug!("Balance Exporter Actor stopped");

        Ok(())
    }
}
