use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use url::Url;

use events_types::core::SecretKeySelector;
use events_types::duck::Condition;
use events_types::duck::ConditionSet;
use events_types::duck::ConditionsAccessor;
use events_types::duck::Destination;
use events_types::duck::Status as DuckStatus;
use events_types::duck::CONDITION_READY;
use events_types::Crd;
use events_types::CrdNames;
use events_types::DefaultHeader;
use events_types::K8List;
use events_types::K8Obj;
use events_types::SetDefaults;
use events_types::Spec;
use events_types::Status;

use super::DEFAULT_SECRET_KEY;
use super::DEFAULT_SECRET_NAME;
use super::GROUP;
use super::PAYLOAD_FORMAT_JSON_API_V1;
use super::VERSION;

const STORAGE_API: Crd = Crd {
    group: GROUP,
    version: VERSION,
    names: CrdNames {
        kind: "Storage",
        plural: "storages",
        singular: "storage",
    },
};

pub type Storage = K8Obj<StorageSpec>;
pub type StorageList = K8List<StorageSpec>;

pub const STORAGE_EVENT_FINALIZE: &str = "finalize";
pub const STORAGE_EVENT_DELETE: &str = "delete";
pub const STORAGE_EVENT_ARCHIVE: &str = "archive";
pub const STORAGE_EVENT_METADATA_UPDATE: &str = "metadataUpdate";

/// subscribed when the spec names no event types
pub const ALL_STORAGE_EVENT_TYPES: [&str; 4] = [
    STORAGE_EVENT_FINALIZE,
    STORAGE_EVENT_DELETE,
    STORAGE_EVENT_ARCHIVE,
    STORAGE_EVENT_METADATA_UPDATE,
];

pub const STORAGE_CONDITION_READY: &str = CONDITION_READY;
/// true when the underlying PullSubscription is ready
pub const STORAGE_PULL_SUBSCRIPTION_READY: &str = "PullSubscriptionReady";
/// true when the Pub/Sub topic notifications go to is ready
pub const STORAGE_TOPIC_READY: &str = "TopicReady";
/// true when the bucket notification has been created
pub const STORAGE_NOTIFICATION_READY: &str = "NotificationReady";

pub static STORAGE_CONDITION_SET: ConditionSet = ConditionSet::living(&[
    STORAGE_PULL_SUBSCRIPTION_READY,
    STORAGE_TOPIC_READY,
    STORAGE_NOTIFICATION_READY,
]);

impl Spec for StorageSpec {
    type Status = StorageStatus;
    type Header = DefaultHeader;

    fn metadata() -> &'static Crd {
        &STORAGE_API
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageSpec {
    /// service account key used for both the notification and the subscription
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretKeySelector>,
    /// project the topic lives in, discovered when empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_types: Vec<String>,
    /// only objects whose name starts with this prefix notify
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub object_name_prefix: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub payload_format: String,
    #[serde(default)]
    pub sink: Destination,
}

impl SetDefaults for StorageSpec {
    fn set_defaults(&mut self) {
        let missing_secret = self
            .secret
            .as_ref()
            .map_or(true, SecretKeySelector::is_empty);
        if missing_secret {
            self.secret = Some(SecretKeySelector::new(
                DEFAULT_SECRET_NAME,
                DEFAULT_SECRET_KEY,
            ));
        }
        if self.payload_format.is_empty() {
            self.payload_format = PAYLOAD_FORMAT_JSON_API_V1.to_owned();
        }
        if self.event_types.is_empty() {
            self.event_types = ALL_STORAGE_EVENT_TYPES
                .iter()
                .map(|event| event.to_string())
                .collect();
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageStatus {
    #[serde(flatten)]
    pub status: DuckStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notification_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub topic_id: String,
    /// resolved address of the sink
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink_uri: Option<Url>,
}

impl Status for StorageStatus {}

impl ConditionsAccessor for StorageStatus {
    fn conditions(&self) -> &[Condition] {
        &self.status.conditions
    }

    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.status.conditions
    }
}
