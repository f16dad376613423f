//! Service module
//!
//! Services hold the business logic of the application. The [Vendor] knows the
//! exchange rules, the [Exchange] applies them to the ledgers one operation at
//! a time and makes sure a rejected operation leaves no trace. Actors use the
//! [Exchange] to perform their tasks.

mod exchange;
mod vendor;

pub use exchange::*;
pub use vendor::*;
