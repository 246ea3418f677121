//!
//! # events.cloud.google.com/v1alpha1
//!
//! Sources that turn Google Cloud Storage notifications into cloud events.
//!
mod gcs;
mod storage;
mod storage_lifecycle;

pub use self::gcs::*;
pub use self::storage::*;

use events_types::GroupVersionKind;

pub const GROUP: &str = "events.cloud.google.com";
pub const VERSION: &str = "v1alpha1";

/// identity of a kind within this group version
pub fn scheme_kind(kind: &str) -> GroupVersionKind {
    GroupVersionKind::new(GROUP, VERSION, kind)
}

/// payload of each notification is the object's JSON representation
pub const PAYLOAD_FORMAT_JSON_API_V1: &str = "JSON_API_V1";
/// notifications carry no payload
pub const PAYLOAD_FORMAT_NONE: &str = "NONE";

pub const DEFAULT_SECRET_NAME: &str = "google-cloud-key";
pub const DEFAULT_SECRET_KEY: &str = "key.json";
