//!
//! # Duck types
//!
//! Shapes shared by every event source: conditions and their roll-up,
//! the common status block and sink destinations.
//!
mod condition;
mod condition_set;
mod destination;
mod status;

pub use self::condition::*;
pub use self::condition_set::*;
pub use self::destination::*;
pub use self::status::*;
