use thiserror::Error;

use super::Address;

/// Error type for owner restricted operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OwnershipError {
    /// The caller is not the current owner.
    #[error("Unauthorized: caller '{caller}' is not the owner.")]
    Unauthorized {
        /// The address that attempted the operation.
        caller: Address,
    },
}

/// Single owner access control. The owner is the only identity allowed to
/// run restricted operations and to hand the ownership over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    /// Create the access control with its initial owner.
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    /// The current owner.
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Guard evaluated before any owner restricted operation.
    ///
    /// ```
    /// use token_vendor::model::{Address, Ownable, OwnershipError};
    ///
    /// let owner = Address::parse("owner").unwrap();
    /// let eve = Address::parse("eve").unwrap();
    /// let ownable = Ownable::new(owner.clone());
    ///
    /// assert!(ownable.only_owner(&owner).is_ok());
    /// assert_eq!(
    ///     ownable.only_owner(&eve).unwrap_err(),
    ///     OwnershipError::Unauthorized { caller: eve }
    /// );
    /// ```
    pub fn only_owner(&self, caller: &Address) -> Result<(), OwnershipError> {
        if caller != &self.owner {
            return Err(OwnershipError::Unauthorized {
                caller: caller.clone(),
            });
        }

        Ok(())
    }

    /// Hand the ownership to `new_owner` and return the previous owner.
    /// Only the current owner can do that.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<Address, OwnershipError> {
        self.only_owner(caller)?;

        Ok(std::mem::replace(&mut self.owner, new_owner))
    }
}
