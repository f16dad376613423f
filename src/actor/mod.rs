//! # Actor module
//!
//! The actors are controlers. They use services to perform their tasks.
//! They communicate with other actors through messages.

mod clerk;
mod exporter;
mod reader;

pub use clerk::*;
pub use exporter::*;
pub use reader::*;
