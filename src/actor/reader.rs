//! Reader actor
//!
//! The reader actor is responsible for reading exchange orders from a CSV
//! file. The actor reads the file line by line and sends the orders to the
//! clerk actor through a channel.

use std::{io::Read, sync::mpsc::Sender};

use csv::ReaderBuilder;
use log::debug;

use crate::model::{CSVOrderEntity, ExchangeOrder};

/// Reader actor.
pub struct Reader {
    /// The order channel sender to send exchange orders.
    order_sender: Sender<ExchangeOrder>,
    reader: Box<dyn Read + Sync + Send>,
}

impl Reader {
    /// Create a new reader actor.
    pub fn new(order_sender: Sender<ExchangeOrder>, reader: Box<dyn Read + Sync + Send>) -> Self {
        Self {
            order_sender,
            reader,
        }
    }

    /// Run the reader actor.
    /// Lines that can not be read or turned into an order are logged and
    /// skipped. The actor stops at the end of the input.
    pub fn run(self) -> crate::Result<()> {
        debug!("Reader Actor started");
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(self.reader);

        for result in csv_reader.deserialize() {
            let record: CSVOrderEntity = match result {
                Err(error) => {
                    log::info!("Error reading CSV record: {}", error);
                    continue;
                }
                Ok(record) => record,
            };
            let order = match ExchangeOrder::try_from(record) {
                Err(error) => {
                    log::info!("Error parsing CSV record: {}", error);
                    continue;
                }
                Ok(order) => order,
            };

            self.order_sender.send(order)?;
        }
        debug!("Reader Actor stopped");

        Ok(())
    }
}
