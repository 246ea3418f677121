use events_types::K8Obj;
use events_types::Spec;

/// mutation applied to a fixture object
pub type ObjectOption<S> = Box<dyn FnOnce(&mut K8Obj<S>)>;

/// unix second 1_000_000_000, stamped by [`with_deletion_timestamp`]
pub const DELETION_TIMESTAMP: &str = "2001-09-09T01:46:40Z";

pub(crate) fn apply<S: Spec>(object: &mut K8Obj<S>, options: Vec<ObjectOption<S>>) {
    for option in options {
        option(&mut *object);
    }
}

pub fn with_finalizers<S: Spec + 'static>(finalizers: &[&str]) -> ObjectOption<S> {
    let finalizers: Vec<String> = finalizers.iter().map(|f| f.to_string()).collect();
    Box::new(move |object: &mut K8Obj<S>| object.metadata.finalizers = finalizers)
}

pub fn with_labels<S: Spec + 'static>(labels: &[(&str, &str)]) -> ObjectOption<S> {
    let labels: Vec<(String, String)> = labels
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    Box::new(move |object: &mut K8Obj<S>| object.metadata.labels.extend(labels))
}

pub fn with_object_meta_generation<S: Spec + 'static>(generation: i64) -> ObjectOption<S> {
    Box::new(move |object: &mut K8Obj<S>| object.metadata.generation = Some(generation))
}

pub fn with_deletion_timestamp<S: Spec + 'static>() -> ObjectOption<S> {
    Box::new(|object: &mut K8Obj<S>| {
        object.metadata.deletion_timestamp = Some(DELETION_TIMESTAMP.to_owned())
    })
}
