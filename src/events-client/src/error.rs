use std::io::Error as IoError;

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

use events_types::labels::SelectorError;

use crate::MetadataClientError;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("{resource} \"{name}\" not found")]
    NotFound { resource: String, name: String },
    #[error("{resource} \"{name}\" already exists")]
    AlreadyExists { resource: String, name: String },
    #[error("conflict on {resource} \"{name}\": {reason}")]
    Conflict {
        resource: String,
        name: String,
        reason: String,
    },
    #[error("invalid object: {0}")]
    Invalid(String),
    #[error("lock poison error")]
    LockPoison,
}

#[derive(Error, Debug)]
pub enum FakeClientError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    #[error("Json error: {0}")]
    JsonError(#[from] SerdeJsonError),
    #[error("IO error: {0}")]
    IoError(#[from] IoError),
    #[error("Selector error: {0}")]
    Selector(#[from] SelectorError),
    #[error("unsupported field selector: {0}")]
    FieldSelector(String),
    #[error("patch error")]
    PatchError,
    /// error injected by a reactor
    #[error("{0}")]
    Other(String),
}

impl FakeClientError {
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }
}

impl MetadataClientError for FakeClientError {
    fn patch_error() -> Self {
        Self::PatchError
    }

    fn not_founded(&self) -> bool {
        matches!(self, Self::Tracker(TrackerError::NotFound { .. }))
    }

    fn already_exists(&self) -> bool {
        matches!(self, Self::Tracker(TrackerError::AlreadyExists { .. }))
    }
}
