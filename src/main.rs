use std::{
    io::{stdout, BufReader},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use log::{debug, error, info};
use rust_decimal::Decimal;

use token_vendor::{
    actor::{BalanceExporter, Clerk, Reader},
    adapter::LogEventSink,
    model::{parse_units, Address, ExchangeConfig, ExchangeOrder, Rate},
    service::Exchange,
    Result,
};

/// Command line arguments
#[derive(Debug, Parser)]
#[command(version, about = "Replay exchange orders against a fixed rate token vendor.")]
struct CLIArguments {
    /// The path to the CSV file of orders to replay.
    csv_file: PathBuf,

    /// Tokens delivered for one unit of currency.
    #[arg(long, default_value_t = 100)]
    rate: u128,

    /// Tokens minted to the deployer.
    #[arg(long, default_value_t = Decimal::ONE_THOUSAND)]
    supply: Decimal,

    /// Tokens moved from the deployer into the exchange.
    #[arg(long, default_value_t = Decimal::ONE_THOUSAND)]
    inventory: Decimal,

    /// Account deploying the token and the exchange.
    #[arg(long, default_value = "deployer")]
    deployer: String,

    /// Account of the exchange.
    #[arg(long, default_value = "vendor")]
    vendor: String,

    /// Owner of the exchange, the deployer when not set.
    #[arg(long)]
    owner: Option<String>,
}

impl CLIArguments {
    fn config(&self) -> Result<ExchangeConfig> {
        let deployer = Address::parse(&self.deployer).context("Invalid deployer")?;
        let owner = match &self.owner {
            Some(owner) => Address::parse(owner).context("Invalid owner")?,
            None => deployer.clone(),
        };
        let config = ExchangeConfig {
            rate: Rate::new(self.rate)?,
            token_supply: parse_units(self.supply).context("Invalid supply")?,
            inventory: parse_units(self.inventory).context("Invalid inventory")?,
            vendor: Address::parse(&self.vendor).context("Invalid vendor")?,
            deployer,
            owner,
        };
        config.validate()?;

        Ok(config)
    }
}

struct Application {
    csv_file: PathBuf,
    config: ExchangeConfig,
}

impl Application {
    fn new(arguments: CLIArguments) -> Result<Self> {
        let csv_file = arguments.csv_file.clone();

        if !csv_file.exists() {
            bail!("CSV file does not exist: '{:?}'.", csv_file.display());
        }
        if !csv_file.is_file() {
            bail!("CSV file is not a file: '{:?}'.", csv_file.canonicalize());
        }
        let config = arguments.config()?;
        let this = Self { csv_file, config };

        Ok(this)
    }

    fn run(&self) -> Result<()> {
        info!("Starting TOKEN_VENDOR version {}", env!("CARGO_PKG_VERSION"));
        debug!("Reading CSV file: '{:?}'.", self.csv_file.canonicalize());

        // dependencies
        let exchange = Arc::new(Exchange::deploy(&self.config, LogEventSink)?);
        // Create a channel to send orders to the clerk actor.
        let (order_sender, order_receiver) = std::sync::mpsc::channel::<ExchangeOrder>();
        // Create a buffered reader for the CSV file.
        let buffer = BufReader::new(std::fs::File::open(&self.csv_file)?);

        // Create the clerk actor and start it in a separate thread.
        let clerk_actor = Clerk::new(exchange.clone(), order_receiver);
        let clerk_handler = std::thread::spawn(move || clerk_actor.run());

        // Create the reader actor and start it in a separate thread.
        let reader_actor = Reader::new(order_sender, Box::new(buffer));
        let reader_handler = std::thread::spawn(move || reader_actor.run());

        reader_handler
            .join()
            .map_err(|_| anyhow!("Reader thread panicked"))??;
        clerk_handler
            .join()
            .map_err(|_| anyhow!("Clerk thread panicked"))?;

        // Export the balances as CSV.
        BalanceExporter::new(exchange, Box::new(stdout())).run()
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let arguments = CLIArguments::parse();
    let application = Application::new(arguments)?;

    let result = application.run();

    match &result {
        Ok(_) => {
            info!("TOKEN_VENDOR completed successfully");
        }
        Err(error) => {
            error!("TOKEN_VENDOR failed with error: {}", error);
        }
    };

    result
}
