use url::Url;

use events_api::v1alpha1::Storage;
use events_api::v1alpha1::StorageSpec;
use events_types::core::ObjectReference;
use events_types::duck::Destination;
use events_types::GroupVersionKind;
use events_types::SetDefaults;

use crate::meta::apply;
use crate::ObjectOption;

pub type StorageOption = ObjectOption<StorageSpec>;

pub const TEST_STORAGE_UID: &str = "test-storage-uid";

/// Storage named `name` in `namespace`, options applied in order, then defaulted
pub fn new_storage(name: &str, namespace: &str, options: Vec<StorageOption>) -> Storage {
    let mut storage = Storage::new(name, StorageSpec::default());
    storage.metadata.namespace = namespace.to_owned();
    storage.metadata.uid = TEST_STORAGE_UID.to_owned();
    apply(&mut storage, options);
    storage.set_defaults();
    storage
}

pub fn with_storage_bucket(bucket: &str) -> StorageOption {
    let bucket = bucket.to_owned();
    Box::new(move |storage: &mut Storage| storage.spec.bucket = bucket)
}

pub fn with_storage_project(project: &str) -> StorageOption {
    let project = project.to_owned();
    Box::new(move |storage: &mut Storage| storage.spec.project = project)
}

pub fn with_storage_event_types(event_types: &[&str]) -> StorageOption {
    let event_types: Vec<String> = event_types.iter().map(|e| e.to_string()).collect();
    Box::new(move |storage: &mut Storage| storage.spec.event_types = event_types)
}

/// sink pointing at the object `name` of type `gvk`
pub fn with_storage_sink(gvk: &GroupVersionKind, name: &str) -> StorageOption {
    let sink = Destination::to_ref(ObjectReference::to_kind(gvk, name));
    Box::new(move |storage: &mut Storage| storage.spec.sink = sink)
}

pub fn with_init_storage_conditions() -> StorageOption {
    Box::new(|storage: &mut Storage| storage.status.initialize_conditions())
}

pub fn with_storage_topic_failed(reason: &str, message: &str) -> StorageOption {
    let (reason, message) = (reason.to_owned(), message.to_owned());
    Box::new(move |storage: &mut Storage| storage.status.mark_topic_failed(&reason, &message))
}

pub fn with_storage_topic_unknown(reason: &str, message: &str) -> StorageOption {
    let (reason, message) = (reason.to_owned(), message.to_owned());
    Box::new(move |storage: &mut Storage| storage.status.mark_topic_unknown(&reason, &message))
}

pub fn with_storage_topic_ready(topic_id: &str) -> StorageOption {
    let topic_id = topic_id.to_owned();
    Box::new(move |storage: &mut Storage| {
        storage.status.topic_id = topic_id;
        storage.status.mark_topic_ready();
    })
}

pub fn with_storage_topic_id(topic_id: &str) -> StorageOption {
    let topic_id = topic_id.to_owned();
    Box::new(move |storage: &mut Storage| storage.status.topic_id = topic_id)
}

pub fn with_storage_pull_subscription_failed(reason: &str, message: &str) -> StorageOption {
    let (reason, message) = (reason.to_owned(), message.to_owned());
    Box::new(move |storage: &mut Storage| {
        storage
            .status
            .mark_pull_subscription_failed(&reason, &message)
    })
}

pub fn with_storage_pull_subscription_unknown(reason: &str, message: &str) -> StorageOption {
    let (reason, message) = (reason.to_owned(), message.to_owned());
    Box::new(move |storage: &mut Storage| {
        storage
            .status
            .mark_pull_subscription_unknown(&reason, &message)
    })
}

pub fn with_storage_pull_subscription_ready() -> StorageOption {
    Box::new(|storage: &mut Storage| storage.status.mark_pull_subscription_ready())
}

pub fn with_storage_notification_not_ready(reason: &str, message: &str) -> StorageOption {
    let (reason, message) = (reason.to_owned(), message.to_owned());
    Box::new(move |storage: &mut Storage| {
        storage
            .status
            .mark_notification_not_ready(&reason, &message)
    })
}

pub fn with_storage_notification_ready(notification_id: &str) -> StorageOption {
    let notification_id = notification_id.to_owned();
    Box::new(move |storage: &mut Storage| storage.status.mark_notification_ready(&notification_id))
}

pub fn with_storage_notification_id(notification_id: &str) -> StorageOption {
    let notification_id = notification_id.to_owned();
    Box::new(move |storage: &mut Storage| storage.status.notification_id = notification_id)
}

pub fn with_storage_sink_uri(uri: Url) -> StorageOption {
    Box::new(move |storage: &mut Storage| storage.status.sink_uri = Some(uri))
}

pub fn with_storage_project_id(project_id: &str) -> StorageOption {
    let project_id = project_id.to_owned();
    Box::new(move |storage: &mut Storage| storage.status.project_id = project_id)
}

pub fn with_storage_status_observed_generation(generation: i64) -> StorageOption {
    Box::new(move |storage: &mut Storage| storage.status.status.observed_generation = generation)
}
