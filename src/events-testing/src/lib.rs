//!
//! # Fixtures
//!
//! Builders for `Storage` and `GCS` objects in a known state. Each
//! `with_*` option mutates the object; options run in order so a later
//! option overrides an earlier one.
//!
mod gcs;
mod meta;
mod storage;

pub use self::gcs::*;
pub use self::meta::*;
pub use self::storage::*;
