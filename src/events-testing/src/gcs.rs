use events_api::v1alpha1::Gcs;
use events_api::v1alpha1::GcsSpec;
use events_types::core::ObjectReference;
use events_types::core::SecretKeySelector;
use events_types::GroupVersionKind;
use events_types::SetDefaults;

use crate::meta::apply;
use crate::ObjectOption;

pub type GcsOption = ObjectOption<GcsSpec>;

pub const TEST_GCS_UID: &str = "test-gcs-uid";

/// GCS source named `name` in `namespace`, options applied in order, then defaulted
pub fn new_gcs(name: &str, namespace: &str, options: Vec<GcsOption>) -> Gcs {
    let mut gcs = Gcs::new(name, GcsSpec::default());
    gcs.metadata.namespace = namespace.to_owned();
    gcs.metadata.uid = TEST_GCS_UID.to_owned();
    apply(&mut gcs, options);
    gcs.set_defaults();
    gcs
}

pub fn with_gcs_bucket(bucket: &str) -> GcsOption {
    let bucket = bucket.to_owned();
    Box::new(move |gcs: &mut Gcs| gcs.spec.bucket = bucket)
}

pub fn with_gcs_project(project: &str) -> GcsOption {
    let project = project.to_owned();
    Box::new(move |gcs: &mut Gcs| gcs.spec.google_cloud_project = project)
}

pub fn with_gcs_event_types(event_types: &[&str]) -> GcsOption {
    let event_types: Vec<String> = event_types.iter().map(|e| e.to_string()).collect();
    Box::new(move |gcs: &mut Gcs| gcs.spec.event_types = event_types)
}

pub fn with_gcs_creds_secret(name: &str, key: &str) -> GcsOption {
    let secret = SecretKeySelector::new(name, key);
    Box::new(move |gcs: &mut Gcs| gcs.spec.gcs_creds_secret = secret)
}

pub fn with_gcs_sink(gvk: &GroupVersionKind, name: &str) -> GcsOption {
    let sink = ObjectReference::to_kind(gvk, name);
    Box::new(move |gcs: &mut Gcs| gcs.spec.sink = sink)
}

pub fn with_init_gcs_conditions() -> GcsOption {
    Box::new(|gcs: &mut Gcs| gcs.status.initialize_conditions())
}

pub fn with_gcs_pull_subscription_ready() -> GcsOption {
    Box::new(|gcs: &mut Gcs| gcs.status.mark_pull_subscription_ready())
}

pub fn with_gcs_pull_subscription_not_ready(reason: &str, message: &str) -> GcsOption {
    let (reason, message) = (reason.to_owned(), message.to_owned());
    Box::new(move |gcs: &mut Gcs| {
        gcs.status
            .mark_pull_subscription_not_ready(&reason, &message)
    })
}

pub fn with_gcs_topic_ready(topic: &str) -> GcsOption {
    let topic = topic.to_owned();
    Box::new(move |gcs: &mut Gcs| gcs.status.mark_pubsub_topic_ready(&topic))
}

pub fn with_gcs_topic_not_ready(reason: &str, message: &str) -> GcsOption {
    let (reason, message) = (reason.to_owned(), message.to_owned());
    Box::new(move |gcs: &mut Gcs| gcs.status.mark_pubsub_topic_not_ready(&reason, &message))
}

pub fn with_gcs_ready(notification_id: &str) -> GcsOption {
    let notification_id = notification_id.to_owned();
    Box::new(move |gcs: &mut Gcs| gcs.status.mark_gcs_ready(&notification_id))
}

pub fn with_gcs_not_ready(reason: &str, message: &str) -> GcsOption {
    let (reason, message) = (reason.to_owned(), message.to_owned());
    Box::new(move |gcs: &mut Gcs| gcs.status.mark_gcs_not_ready(&reason, &message))
}

pub fn with_gcs_sink_uri(uri: &str) -> GcsOption {
    let uri = uri.to_owned();
    Box::new(move |gcs: &mut Gcs| gcs.status.sink_uri = uri)
}

pub fn with_gcs_status_observed_generation(generation: i64) -> GcsOption {
    Box::new(move |gcs: &mut Gcs| gcs.status.status.observed_generation = generation)
}
