use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use events_types::core::ObjectReference;
use events_types::core::SecretKeySelector;
use events_types::duck::Condition;
use events_types::duck::ConditionSet;
use events_types::duck::ConditionsAccessor;
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

use super::GROUP;
use super::PAYLOAD_FORMAT_JSON_API_V1;
use super::VERSION;

const GCS_API: Crd = Crd {
    group: GROUP,
    version: VERSION,
    names: CrdNames {
        kind: "GCS",
        plural: "gcses",
        singular: "gcs",
    },
};

pub type Gcs = K8Obj<GcsSpec>;
pub type GcsList = K8List<GcsSpec>;

/// true when the GCS is ready to send events
pub const GCS_CONDITION_READY: &str = CONDITION_READY;
/// true when the underlying PullSubscription is ready
pub const PULL_SUBSCRIPTION_READY: &str = "PullSubscriptionReady";
/// true when the underlying Pub/Sub topic is ready
pub const PUBSUB_TOPIC_READY: &str = "PubSubTopicReady";
/// true when the bucket notification has been configured
pub const GCS_READY: &str = "GCSReady";

pub static GCS_CONDITION_SET: ConditionSet =
    ConditionSet::living(&[PULL_SUBSCRIPTION_READY, PUBSUB_TOPIC_READY, GCS_READY]);

impl Spec for GcsSpec {
    type Status = GcsStatus;
    type Header = DefaultHeader;

    fn metadata() -> &'static Crd {
        &GCS_API
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GcsSpec {
    /// credential used to create the notification on the bucket
    #[serde(default)]
    pub gcs_creds_secret: SecretKeySelector,
    /// credential used to poll the subscription, falls back to `gcs_creds_secret`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcp_creds_secret: Option<SecretKeySelector>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_account_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub google_cloud_project: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_types: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub object_name_prefix: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub payload_format: String,
    #[serde(default)]
    pub sink: ObjectReference,
}

impl GcsSpec {
    /// credential for polling the subscription
    pub fn pull_secret(&self) -> &SecretKeySelector {
        self.gcp_creds_secret
            .as_ref()
            .unwrap_or(&self.gcs_creds_secret)
    }
}

impl SetDefaults for GcsSpec {
    fn set_defaults(&mut self) {
        if self.payload_format.is_empty() {
            self.payload_format = PAYLOAD_FORMAT_JSON_API_V1.to_owned();
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GcsStatus {
    #[serde(flatten)]
    pub status: DuckStatus,
    /// id GCS assigned to the notification
    #[serde(
        rename = "notificationID",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub notification_id: String,
    /// topic the notifications are published to
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub topic: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sink_uri: String,
}

impl Status for GcsStatus {}

impl ConditionsAccessor for GcsStatus {
    fn conditions(&self) -> &[Condition] {
        &self.status.conditions
    }

    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.status.conditions
    }
}

impl GcsStatus {
    pub fn get_condition(&self, condition_type: &str) -> Option<&Condition> {
        GCS_CONDITION_SET.get_condition(self, condition_type)
    }

    pub fn is_ready(&self) -> bool {
        GCS_CONDITION_SET.is_happy(self)
    }

    pub fn initialize_conditions(&mut self) {
        GCS_CONDITION_SET.manage(self).initialize_conditions();
    }

    pub fn mark_pull_subscription_ready(&mut self) {
        GCS_CONDITION_SET.manage(self).mark_true(PULL_SUBSCRIPTION_READY);
    }

    pub fn mark_pull_subscription_not_ready(&mut self, reason: &str, message: &str) {
        GCS_CONDITION_SET
            .manage(self)
            .mark_false(PULL_SUBSCRIPTION_READY, reason, message);
    }

    pub fn mark_pubsub_topic_ready(&mut self, topic: &str) {
        self.topic = topic.to_owned();
        GCS_CONDITION_SET.manage(self).mark_true(PUBSUB_TOPIC_READY);
    }

    pub fn mark_pubsub_topic_not_ready(&mut self, reason: &str, message: &str) {
        GCS_CONDITION_SET
            .manage(self)
            .mark_false(PUBSUB_TOPIC_READY, reason, message);
    }

    pub fn mark_gcs_ready(&mut self, notification_id: &str) {
        self.notification_id = notification_id.to_owned();
        GCS_CONDITION_SET.manage(self).mark_true(GCS_READY);
    }

    pub fn mark_gcs_not_ready(&mut self, reason: &str, message: &str) {
        GCS_CONDITION_SET
            .manage(self)
            .mark_false(GCS_READY, reason, message);
    }
}
