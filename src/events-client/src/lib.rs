mod action;
mod client;
mod error;
mod fake;
mod patch;
mod tracker;
mod typed;

pub use action::Action;
pub use action::Verb;
pub use client::as_token_stream_result;
pub use client::ListArg;
pub use client::MetadataClient;
pub use client::MetadataClientError;
pub use client::NameSpace;
pub use client::TokenStreamResult;
pub use error::FakeClientError;
pub use error::TrackerError;
pub use fake::FakeClient;
pub use fake::FakeClientBuilder;
pub use fake::Reaction;
pub use patch::merge_patch;
pub use tracker::ObjectTracker;
pub use tracker::Removal;
pub use tracker::WatchEvent;
pub use tracker::WatchEventType;
pub use typed::ResourceClient;

pub type SharedClient<C> = std::sync::Arc<C>;
