use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use chrono::SecondsFormat;
use chrono::Utc;
use futures::channel::mpsc::unbounded;
use futures::channel::mpsc::UnboundedReceiver;
use futures::channel::mpsc::UnboundedSender;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;
use tracing::trace;

use events_types::GroupVersionResource;

use crate::TrackerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventType {
    Added,
    Modified,
    Deleted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchEvent {
    pub event_type: WatchEventType,
    pub object: Value,
}

/// result of deleting an object
#[derive(Debug, Clone, PartialEq)]
pub enum Removal {
    /// object is gone
    Deleted(Value),
    /// object has finalizers, it was only stamped with a deletion timestamp
    Finalizing(Value),
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ItemKey {
    resource: GroupVersionResource,
    namespace: String,
    name: String,
}

#[derive(Debug)]
struct Watcher {
    resource: GroupVersionResource,
    namespace: Option<String>,
    sender: UnboundedSender<WatchEvent>,
}

impl Watcher {
    fn wants(&self, key: &ItemKey) -> bool {
        self.resource == key.resource
            && self
                .namespace
                .as_ref()
                .map_or(true, |ns| *ns == key.namespace)
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    items: BTreeMap<ItemKey, Value>,
    resource_version: u64,
    watchers: Vec<Watcher>,
}

impl TrackerState {
    fn next_version(&mut self) -> String {
        self.resource_version += 1;
        self.resource_version.to_string()
    }

    fn notify(&mut self, key: &ItemKey, event_type: WatchEventType, object: &Value) {
        // dropped receivers are pruned whether or not they watch `key`
        self.watchers.retain(|watcher| {
            if watcher.sender.is_closed() {
                return false;
            }
            if !watcher.wants(key) {
                return true;
            }
            watcher
                .sender
                .unbounded_send(WatchEvent {
                    event_type,
                    object: object.clone(),
                })
                .is_ok()
        });
    }
}

/// In-memory store of objects as JSON, keyed by resource, namespace and name.
/// Every write gets a new resource version and is broadcast to watchers.
#[derive(Debug, Default)]
pub struct ObjectTracker {
    state: RwLock<TrackerState>,
}

impl ObjectTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, TrackerState>, TrackerError> {
        self.state.read().map_err(|_| TrackerError::LockPoison)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, TrackerState>, TrackerError> {
        self.state.write().map_err(|_| TrackerError::LockPoison)
    }

    /// store an object as is, replacing any existing one with the same name
    pub fn add(&self, resource: &GroupVersionResource, mut object: Value) -> Result<(), TrackerError> {
        let key = item_key(resource, meta_str(&object, "namespace"), &object)?;
        let mut state = self.write()?;
        let version = state.next_version();
        let meta = meta_mut(&mut object)?;
        if meta_field_empty(meta, "resourceVersion") {
            meta.insert("resourceVersion".to_owned(), Value::String(version));
        }

        debug!(%resource, name = %key.name, "tracker: add");
        let event_type = if state.items.contains_key(&key) {
            WatchEventType::Modified
        } else {
            WatchEventType::Added
        };
        state.notify(&key, event_type, &object);
        state.items.insert(key, object);
        Ok(())
    }

    pub fn get(
        &self,
        resource: &GroupVersionResource,
        namespace: &str,
        name: &str,
    ) -> Result<Value, TrackerError> {
        let state = self.read()?;
        let key = ItemKey {
            resource: resource.clone(),
            namespace: namespace.to_owned(),
            name: name.to_owned(),
        };
        state
            .items
            .get(&key)
            .cloned()
            .ok_or_else(|| not_found(resource, name))
    }

    /// objects of a resource, all namespaces when `namespace` is none,
    /// together with the current resource version
    pub fn list(
        &self,
        resource: &GroupVersionResource,
        namespace: Option<&str>,
    ) -> Result<(Vec<Value>, String), TrackerError> {
        let state = self.read()?;
        let items = state
            .items
            .iter()
            .filter(|(key, _)| {
                key.resource == *resource && namespace.map_or(true, |ns| key.namespace == ns)
            })
            .map(|(_, value)| value.clone())
            .collect();
        Ok((items, state.resource_version.to_string()))
    }

    pub fn create(
        &self,
        resource: &GroupVersionResource,
        namespace: &str,
        mut object: Value,
    ) -> Result<Value, TrackerError> {
        let key = item_key(resource, namespace, &object)?;
        let mut state = self.write()?;
        if state.items.contains_key(&key) {
            return Err(TrackerError::AlreadyExists {
                resource: resource.to_string(),
                name: key.name,
            });
        }

        let version = state.next_version();
        let meta = meta_mut(&mut object)?;
        meta.insert("namespace".to_owned(), Value::String(key.namespace.clone()));
        meta.insert("resourceVersion".to_owned(), Value::String(version));
        if meta_field_empty(meta, "creationTimestamp") {
            meta.insert("creationTimestamp".to_owned(), Value::String(now()));
        }
        if meta_field_empty(meta, "generation") {
            meta.insert("generation".to_owned(), Value::from(1));
        }

        debug!(%resource, name = %key.name, "tracker: create");
        trace!("created: {:#?}", object);
        state.notify(&key, WatchEventType::Added, &object);
        state.items.insert(key, object.clone());
        Ok(object)
    }

    /// Replace a stored object.
    /// A stale resource version is a conflict. Dropping the last finalizer of
    /// an object pending deletion removes it.
    pub fn update(
        &self,
        resource: &GroupVersionResource,
        namespace: &str,
        mut object: Value,
    ) -> Result<Value, TrackerError> {
        let key = item_key(resource, namespace, &object)?;
        let mut state = self.write()?;
        let stored = state
            .items
            .get(&key)
            .cloned()
            .ok_or_else(|| not_found(resource, &key.name))?;

        let requested_version = meta_str(&object, "resourceVersion").to_owned();
        let stored_version = meta_str(&stored, "resourceVersion");
        if !requested_version.is_empty() && requested_version != stored_version {
            return Err(TrackerError::Conflict {
                resource: resource.to_string(),
                name: key.name,
                reason: format!(
                    "resource version {} is stale, current is {}",
                    requested_version, stored_version
                ),
            });
        }

        if meta_present(&stored, "deletionTimestamp") && !has_finalizers(&object) {
            debug!(%resource, name = %key.name, "tracker: last finalizer removed, deleting");
            state.items.remove(&key);
            state.notify(&key, WatchEventType::Deleted, &object);
            return Ok(object);
        }

        let generation = stored
            .pointer("/metadata/generation")
            .and_then(Value::as_i64)
            .unwrap_or(1);
        let generation = if stored.get("spec") != object.get("spec") {
            generation + 1
        } else {
            generation
        };

        let version = state.next_version();
        let meta = meta_mut(&mut object)?;
        meta.insert("namespace".to_owned(), Value::String(key.namespace.clone()));
        meta.insert("resourceVersion".to_owned(), Value::String(version));
        meta.insert("generation".to_owned(), Value::from(generation));
        for field in &["uid", "creationTimestamp", "deletionTimestamp"] {
            if meta_field_empty(meta, field) {
                if let Some(value) = stored.pointer(&format!("/metadata/{}", field)) {
                    meta.insert((*field).to_owned(), value.clone());
                }
            }
        }

        debug!(%resource, name = %key.name, "tracker: update");
        state.notify(&key, WatchEventType::Modified, &object);
        state.items.insert(key, object.clone());
        Ok(object)
    }

    /// Delete by name, optionally only if the stored uid matches.
    pub fn delete(
        &self,
        resource: &GroupVersionResource,
        namespace: &str,
        name: &str,
        uid: Option<&str>,
    ) -> Result<Removal, TrackerError> {
        let key = ItemKey {
            resource: resource.clone(),
            namespace: namespace.to_owned(),
            name: name.to_owned(),
        };
        let mut state = self.write()?;
        let stored = state
            .items
            .get(&key)
            .cloned()
            .ok_or_else(|| not_found(resource, name))?;

        if let Some(uid) = uid {
            let stored_uid = meta_str(&stored, "uid");
            if stored_uid != uid {
                return Err(TrackerError::Conflict {
                    resource: resource.to_string(),
                    name: name.to_owned(),
                    reason: format!("uid precondition {} does not match {}", uid, stored_uid),
                });
            }
        }

        if has_finalizers(&stored) {
            if meta_present(&stored, "deletionTimestamp") {
                return Ok(Removal::Finalizing(stored));
            }
            let mut object = stored;
            let version = state.next_version();
            let meta = meta_mut(&mut object)?;
            meta.insert("deletionTimestamp".to_owned(), Value::String(now()));
            meta.insert("resourceVersion".to_owned(), Value::String(version));

            debug!(%resource, %name, "tracker: waiting on finalizers");
            state.notify(&key, WatchEventType::Modified, &object);
            state.items.insert(key, object.clone());
            return Ok(Removal::Finalizing(object));
        }

        debug!(%resource, %name, "tracker: delete");
        state.items.remove(&key);
        state.notify(&key, WatchEventType::Deleted, &stored);
        Ok(Removal::Deleted(stored))
    }

    /// receive every later change of the resource
    pub fn watch(
        &self,
        resource: &GroupVersionResource,
        namespace: Option<&str>,
    ) -> Result<UnboundedReceiver<WatchEvent>, TrackerError> {
        let (sender, receiver) = unbounded();
        let mut state = self.write()?;
        state.watchers.push(Watcher {
            resource: resource.clone(),
            namespace: namespace.map(str::to_owned),
            sender,
        });
        debug!(%resource, watchers = state.watchers.len(), "tracker: watch");
        Ok(receiver)
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn not_found(resource: &GroupVersionResource, name: &str) -> TrackerError {
    TrackerError::NotFound {
        resource: resource.to_string(),
        name: name.to_owned(),
    }
}

/// key of an object; the object's own namespace must agree with the request
fn item_key(
    resource: &GroupVersionResource,
    namespace: &str,
    object: &Value,
) -> Result<ItemKey, TrackerError> {
    let name = meta_str(object, "name");
    if name.is_empty() {
        return Err(TrackerError::Invalid("metadata.name is required".to_owned()));
    }
    let object_ns = meta_str(object, "namespace");
    if !object_ns.is_empty() && object_ns != namespace {
        return Err(TrackerError::Invalid(format!(
            "namespace {} does not match object namespace {}",
            namespace, object_ns
        )));
    }
    Ok(ItemKey {
        resource: resource.clone(),
        namespace: namespace.to_owned(),
        name: name.to_owned(),
    })
}

fn meta_str<'a>(object: &'a Value, field: &str) -> &'a str {
    object
        .get("metadata")
        .and_then(|meta| meta.get(field))
        .and_then(Value::as_str)
        .unwrap_or("")
}

fn meta_present(object: &Value, field: &str) -> bool {
    object
        .get("metadata")
        .and_then(|meta| meta.get(field))
        .map_or(false, |value| !value.is_null())
}

fn meta_field_empty(meta: &Map<String, Value>, field: &str) -> bool {
    match meta.get(field) {
        None | Some(Value::Null) => true,
        Some(Value::String(value)) => value.is_empty(),
        Some(_) => false,
    }
}

fn has_finalizers(object: &Value) -> bool {
    object
        .pointer("/metadata/finalizers")
        .and_then(Value::as_array)
        .map_or(false, |finalizers| !finalizers.is_empty())
}

fn meta_mut(object: &mut Value) -> Result<&mut Map<String, Value>, TrackerError> {
    let map = object
        .as_object_mut()
        .ok_or_else(|| TrackerError::Invalid("object is not a map".to_owned()))?;
    map.entry("metadata")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| TrackerError::Invalid("metadata is not a map".to_owned()))
}

#[cfg(test)]
mod test {

    use futures::StreamExt;
    use serde_json::json;

    use events_types::GroupVersionResource;

    use crate::TrackerError;

    use super::ObjectTracker;
    use super::Removal;
    use super::WatchEventType;

    fn storages() -> GroupVersionResource {
        GroupVersionResource {
            group: "events.cloud.google.com".to_owned(),
            version: "v1alpha1".to_owned(),
            resource: "storages".to_owned(),
        }
    }

    fn object(name: &str) -> serde_json::Value {
        json!({ "metadata": { "name": name }, "spec": { "bucket": "b" } })
    }

    #[test]
    fn test_create_get_and_duplicate() {
        let tracker = ObjectTracker::new();
        let created = tracker
            .create(&storages(), "default", object("s1"))
            .expect("create");
        assert_eq!(created["metadata"]["namespace"], json!("default"));
        assert_eq!(created["metadata"]["resourceVersion"], json!("1"));
        assert_eq!(created["metadata"]["generation"], json!(1));

        let fetched = tracker.get(&storages(), "default", "s1").expect("get");
        assert_eq!(fetched, created);

        assert!(matches!(
            tracker.create(&storages(), "default", object("s1")),
            Err(TrackerError::AlreadyExists { .. })
        ));
        assert!(matches!(
            tracker.get(&storages(), "other", "s1"),
            Err(TrackerError::NotFound { .. })
        ));
    }

    #[test]
    fn test_namespace_mismatch_is_invalid() {
        let tracker = ObjectTracker::new();
        let obj = json!({ "metadata": { "name": "s1", "namespace": "a" } });
        assert!(matches!(
            tracker.create(&storages(), "b", obj),
            Err(TrackerError::Invalid(_))
        ));
        assert!(matches!(
            tracker.create(&storages(), "b", json!({ "metadata": {} })),
            Err(TrackerError::Invalid(_))
        ));
    }

    #[test]
    fn test_update_bumps_generation_and_detects_conflict() {
        let tracker = ObjectTracker::new();
        let created = tracker
            .create(&storages(), "default", object("s1"))
            .expect("create");

        let mut changed = created.clone();
        changed["spec"]["bucket"] = json!("c");
        let updated = tracker
            .update(&storages(), "default", changed)
            .expect("update");
        assert_eq!(updated["metadata"]["generation"], json!(2));
        assert_eq!(updated["metadata"]["resourceVersion"], json!("2"));
        assert_eq!(
            updated["metadata"]["creationTimestamp"],
            created["metadata"]["creationTimestamp"]
        );

        // still carries version 1
        let stale = created;
        assert!(matches!(
            tracker.update(&storages(), "default", stale),
            Err(TrackerError::Conflict { .. })
        ));
    }

    #[test]
    fn test_list_scoped_by_namespace() {
        let tracker = ObjectTracker::new();
        tracker.create(&storages(), "a", object("s1")).expect("create");
        tracker.create(&storages(), "a", object("s2")).expect("create");
        tracker.create(&storages(), "b", object("s3")).expect("create");

        let (in_a, version) = tracker.list(&storages(), Some("a")).expect("list");
        assert_eq!(in_a.len(), 2);
        assert_eq!(version, "3");
        let (all, _) = tracker.list(&storages(), None).expect("list");
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_finalizers_defer_delete() {
        let tracker = ObjectTracker::new();
        let mut obj = object("s1");
        obj["metadata"]["finalizers"] = json!(["storages.events.cloud.google.com"]);
        tracker.create(&storages(), "default", obj).expect("create");

        let pending = match tracker
            .delete(&storages(), "default", "s1", None)
            .expect("delete")
        {
            Removal::Finalizing(obj) => obj,
            Removal::Deleted(_) => panic!("object with finalizers was removed"),
        };
        assert!(pending["metadata"]["deletionTimestamp"].is_string());
        assert!(tracker.get(&storages(), "default", "s1").is_ok());

        let mut released = pending;
        released["metadata"]["finalizers"] = json!([]);
        tracker
            .update(&storages(), "default", released)
            .expect("update");
        assert!(matches!(
            tracker.get(&storages(), "default", "s1"),
            Err(TrackerError::NotFound { .. })
        ));
    }

    #[test]
    fn test_delete_uid_precondition() {
        let tracker = ObjectTracker::new();
        let mut obj = object("s1");
        obj["metadata"]["uid"] = json!("uid-1");
        tracker.add(&storages(), obj).expect("add");

        // seeded objects without a namespace live in ""
        assert!(matches!(
            tracker.delete(&storages(), "", "s1", Some("uid-2")),
            Err(TrackerError::Conflict { .. })
        ));
        assert!(matches!(
            tracker.delete(&storages(), "", "s1", Some("uid-1")),
            Ok(Removal::Deleted(_))
        ));
    }

    #[fluvio_future::test]
    async fn test_watch_receives_changes() {
        let tracker = ObjectTracker::new();
        let mut events = tracker.watch(&storages(), Some("default")).expect("watch");
        let mut other = tracker.watch(&storages(), Some("other")).expect("watch");

        let created = tracker
            .create(&storages(), "default", object("s1"))
            .expect("create");
        tracker
            .update(&storages(), "default", created)
            .expect("update");
        tracker
            .delete(&storages(), "default", "s1", None)
            .expect("delete");

        let kinds: Vec<WatchEventType> = (&mut events)
            .take(3)
            .map(|event| event.event_type)
            .collect()
            .await;
        assert_eq!(
            kinds,
            vec![
                WatchEventType::Added,
                WatchEventType::Modified,
                WatchEventType::Deleted
            ]
        );
        assert!(other.try_next().is_err());
    }

    #[test]
    fn test_dropped_watchers_are_pruned() {
        let tracker = ObjectTracker::new();
        let _events = tracker.watch(&storages(), Some("default")).expect("watch");
        let other = tracker.watch(&storages(), Some("other")).expect("watch");
        assert_eq!(tracker.read().expect("read").watchers.len(), 2);

        drop(other);
        tracker
            .create(&storages(), "default", object("s1"))
            .expect("create");
        assert_eq!(tracker.read().expect("read").watchers.len(), 1);
    }
}
