use thiserror::Error;

use super::{Address, Amount, Rate, DECIMALS};

/// Error type for deployment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The exchange can not be funded with more tokens than exist.
    #[error("Inventory {inventory} exceeds the token supply {supply}.")]
    InventoryExceedsSupply {
        /// Tokens the exchange should receive.
        inventory: Amount,

        /// Tokens minted to the deployer.
        supply: Amount,
    },

    /// The exchange needs an address of its own.
    #[error("Exchange address '{0}' is already used by the deployer or the owner.")]
    AddressTaken(Address),
}

/// Everything needed to deploy an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Tokens per currency unit.
    pub rate: Rate,

    /// Tokens minted to the deployer, in smallest units.
    pub token_supply: Amount,

    /// Tokens the deployer moves into the exchange, in smallest units.
    pub inventory: Amount,

    /// Account that deploys the token and the exchange.
    pub deployer: Address,

    /// Account of the exchange itself.
    pub vendor: Address,

    /// Account that owns the exchange once deployed.
    pub owner: Address,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        let thousand_tokens = 1_000 * 10u128.pow(DECIMALS);
        let deployer = Address::unchecked("deployer");

        Self {
            rate: Rate::default(),
            token_supply: thousand_tokens,
            inventory: thousand_tokens,
            owner: deployer.clone(),
            deployer,
            vendor: Address::unchecked("vendor"),
        }
    }
}

impl ExchangeConfig {
    /// Check the configuration is consistent.
    ///
    /// ```
    /// use token_vendor::model::{ConfigError, ExchangeConfig};
    ///
    /// let config = ExchangeConfig::default();
    /// assert!(config.validate().is_ok());
    ///
    /// let config = ExchangeConfig { inventory: config.token_supply + 1, ..config };
    /// assert!(matches!(config.validate(), Err(ConfigError::InventoryExceedsSupply { .. })));
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inventory > self.token_supply {
            return Err(ConfigError::InventoryExceedsSupply {
                inventory: self.inventory,
                supply: self.token_supply,
            });
        }
        if self.vendor == self.deployer || self.vendor == self.owner {
            return Err(ConfigError::AddressTaken(self.vendor.clone()));
        }

        Ok(())
    }
}
