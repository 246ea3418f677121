use std::fmt;
use std::fmt::Display;
use std::sync::Arc;
use std::sync::RwLock;

use async_trait::async_trait;
use futures::future::ready;
use futures::stream::once;
use futures::stream::BoxStream;
use futures::stream::StreamExt;
use serde_json::Value;
use tracing::debug;
use tracing::trace;

use events_types::labels::Selector;
use events_types::options::DeleteOptions;
use events_types::DeleteStatus;
use events_types::DeletedStatus;
use events_types::InputK8Obj;
use events_types::K8List;
use events_types::K8Meta;
use events_types::K8Obj;
use events_types::K8Watch;
use events_types::ObjectMeta;
use events_types::Spec;
use events_types::UpdateK8ObjStatus;
use events_types::UpdatedK8Obj;

use crate::as_token_stream_result;
use crate::merge_patch;
use crate::Action;
use crate::FakeClientError;
use crate::ListArg;
use crate::MetadataClient;
use crate::NameSpace;
use crate::ObjectTracker;
use crate::Removal;
use crate::TokenStreamResult;
use crate::TrackerError;
use crate::WatchEvent;
use crate::WatchEventType;

/// Intercepts an action.
/// `None` passes the action on to the next reactor and finally the tracker.
/// `Some(Ok(value))` answers with `value` decoded as the operation's result.
/// Reactions run without any client lock held and may register further reactors.
pub type Reaction = Arc<dyn Fn(&Action) -> Option<Result<Value, FakeClientError>> + Send + Sync>;

struct Reactor {
    verb: String,
    resource: String,
    reaction: Reaction,
}

/// In-memory client for tests.
/// Every call is recorded as an [`Action`] before reactors and the tracker see it.
pub struct FakeClient {
    tracker: ObjectTracker,
    actions: RwLock<Vec<Action>>,
    reactors: RwLock<Vec<Reactor>>,
}

impl fmt::Debug for FakeClient {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FakeClient")
            .field("tracker", &self.tracker)
            .field("actions", &self.actions)
            .finish()
    }
}

impl Default for FakeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            tracker: ObjectTracker::new(),
            actions: RwLock::new(vec![]),
            reactors: RwLock::new(vec![]),
        }
    }

    pub fn builder() -> FakeClientBuilder {
        FakeClientBuilder::default()
    }

    pub fn tracker(&self) -> &ObjectTracker {
        &self.tracker
    }

    /// actions recorded so far, oldest first
    pub fn actions(&self) -> Vec<Action> {
        match self.actions.read() {
            Ok(actions) => actions.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn clear_actions(&self) -> Result<(), FakeClientError> {
        self.actions
            .write()
            .map_err(|_| TrackerError::LockPoison)?
            .clear();
        Ok(())
    }

    /// run `reaction` before every reactor already registered
    pub fn prepend_reactor<V, R, F>(&self, verb: V, resource: R, reaction: F) -> Result<(), FakeClientError>
    where
        V: Into<String>,
        R: Into<String>,
        F: Fn(&Action) -> Option<Result<Value, FakeClientError>> + Send + Sync + 'static,
    {
        let reactor = Reactor {
            verb: verb.into(),
            resource: resource.into(),
            reaction: Arc::new(reaction),
        };
        self.reactors
            .write()
            .map_err(|_| TrackerError::LockPoison)?
            .insert(0, reactor);
        Ok(())
    }

    /// run `reaction` after every reactor already registered
    pub fn add_reactor<V, R, F>(&self, verb: V, resource: R, reaction: F) -> Result<(), FakeClientError>
    where
        V: Into<String>,
        R: Into<String>,
        F: Fn(&Action) -> Option<Result<Value, FakeClientError>> + Send + Sync + 'static,
    {
        let reactor = Reactor {
            verb: verb.into(),
            resource: resource.into(),
            reaction: Arc::new(reaction),
        };
        self.reactors
            .write()
            .map_err(|_| TrackerError::LockPoison)?
            .push(reactor);
        Ok(())
    }

    /// record the action and let reactors handle it
    fn invoke(&self, action: Action) -> Result<Option<Value>, FakeClientError> {
        debug!("fake client: {}", action);
        self.actions
            .write()
            .map_err(|_| TrackerError::LockPoison)?
            .push(action.clone());

        let reactions: Vec<Reaction> = self
            .reactors
            .read()
            .map_err(|_| TrackerError::LockPoison)?
            .iter()
            .filter(|reactor| action.matches(&reactor.verb, &reactor.resource))
            .map(|reactor| reactor.reaction.clone())
            .collect();
        for reaction in reactions {
            if let Some(result) = reaction(&action) {
                trace!("action {} handled by reactor", action);
                return result.map(Some);
            }
        }
        Ok(None)
    }

    fn get_object<S: Spec>(&self, namespace: &str, name: &str) -> Result<K8Obj<S>, FakeClientError> {
        let resource = S::group_version_resource();
        let action = Action::Get {
            resource: resource.clone(),
            namespace: namespace.to_owned(),
            name: name.to_owned(),
        };
        let value = match self.invoke(action)? {
            Some(value) => value,
            None => self.tracker.get(&resource, namespace, name)?,
        };
        Ok(serde_json::from_value(value)?)
    }

    /// every stored object of `S` in `namespace`, unfiltered
    fn tracked_objects<S: Spec>(&self, namespace: &NameSpace) -> Result<K8List<S>, FakeClientError> {
        let (values, resource_version) = self
            .tracker
            .list(&S::group_version_resource(), namespace.as_filter())?;
        let mut list = K8List::new();
        list.metadata.resource_version = resource_version;
        list.items = values
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<_, _>>()?;
        Ok(list)
    }

    fn list_objects<S: Spec>(
        &self,
        namespace: NameSpace,
        option: Option<ListArg>,
    ) -> Result<K8List<S>, FakeClientError> {
        let option = option.unwrap_or_default();
        let action = Action::List {
            resource: S::group_version_resource(),
            namespace: action_namespace(&namespace),
            list_arg: option.clone(),
        };
        let reacted = self.invoke(action)?;
        let filter = ListFilter::parse(&option)?;

        // reactor lists are filtered like stored ones
        let mut list: K8List<S> = match reacted {
            Some(value) => serde_json::from_value(value)?,
            None => self.tracked_objects(&namespace)?,
        };
        list.items.retain(|item| filter.matches(&item.metadata));
        debug!(
            "fake client: list {} returned {} items",
            S::label(),
            list.items.len()
        );
        Ok(list)
    }

    fn delete_object<S: Spec>(
        &self,
        namespace: &str,
        name: &str,
        option: Option<DeleteOptions>,
    ) -> Result<DeleteStatus<S>, FakeClientError> {
        let resource = S::group_version_resource();
        let action = Action::Delete {
            resource: resource.clone(),
            namespace: namespace.to_owned(),
            name: name.to_owned(),
        };
        if self.invoke(action)?.is_some() {
            return Ok(DeleteStatus::Deleted(DeletedStatus::success::<S>(name, "")));
        }

        let uid = option
            .and_then(|option| option.preconditions)
            .map(|precondition| precondition.uid);
        match self.tracker.delete(&resource, namespace, name, uid.as_deref())? {
            Removal::Deleted(value) => {
                let item: K8Obj<S> = serde_json::from_value(value)?;
                Ok(DeleteStatus::Deleted(DeletedStatus::success::<S>(
                    &item.metadata.name,
                    &item.metadata.uid,
                )))
            }
            Removal::Finalizing(value) => Ok(DeleteStatus::ForegroundDelete(
                serde_json::from_value(value)?,
            )),
        }
    }

    fn delete_objects<S: Spec>(
        &self,
        namespace: NameSpace,
        option: Option<ListArg>,
    ) -> Result<(), FakeClientError> {
        let option = option.unwrap_or_default();
        let resource = S::group_version_resource();
        let action = Action::DeleteCollection {
            resource: resource.clone(),
            namespace: action_namespace(&namespace),
            list_arg: option.clone(),
        };
        if self.invoke(action)?.is_some() {
            return Ok(());
        }

        let filter = ListFilter::parse(&option)?;
        let list: K8List<S> = self.tracked_objects(&namespace)?;
        for item in list
            .items
            .iter()
            .filter(|item| filter.matches(&item.metadata))
        {
            self.tracker.delete(
                &resource,
                &item.metadata.namespace,
                &item.metadata.name,
                None,
            )?;
        }
        Ok(())
    }

    fn create_object<S: Spec>(&self, input: InputK8Obj<S>) -> Result<K8Obj<S>, FakeClientError> {
        let resource = S::group_version_resource();
        let namespace = input.metadata.namespace.clone();
        let object = serde_json::to_value(&input)?;
        let action = Action::Create {
            resource: resource.clone(),
            namespace: namespace.clone(),
            object: object.clone(),
        };
        let value = match self.invoke(action)? {
            Some(value) => value,
            None => self.tracker.create(&resource, &namespace, object)?,
        };
        Ok(serde_json::from_value(value)?)
    }

    fn update_object<S: Spec>(&self, input: UpdatedK8Obj<S>) -> Result<K8Obj<S>, FakeClientError> {
        let resource = S::group_version_resource();
        let namespace = input.metadata.namespace.clone();
        let action = Action::Update {
            resource: resource.clone(),
            namespace: namespace.clone(),
            subresource: None,
            object: serde_json::to_value(&input)?,
        };
        if let Some(value) = self.invoke(action)? {
            return Ok(serde_json::from_value(value)?);
        }

        let stored = self.tracker.get(&resource, &namespace, &input.metadata.name)?;
        let mut current: K8Obj<S> = serde_json::from_value(stored)?;
        let meta = input.metadata;
        current.metadata.labels = meta.labels;
        current.metadata.annotations = meta.annotations;
        current.metadata.owner_references = meta.owner_references;
        current.metadata.finalizers = meta.finalizers;
        current.metadata.resource_version = meta.resource_version;
        current.spec = input.spec;
        current.header = input.header;

        let value = self
            .tracker
            .update(&resource, &namespace, serde_json::to_value(&current)?)?;
        Ok(serde_json::from_value(value)?)
    }

    fn update_object_status<S: Spec>(
        &self,
        input: &UpdateK8ObjStatus<S>,
    ) -> Result<K8Obj<S>, FakeClientError> {
        let resource = S::group_version_resource();
        let namespace = input.metadata.namespace.as_str();
        let action = Action::Update {
            resource: resource.clone(),
            namespace: namespace.to_owned(),
            subresource: Some("status".to_owned()),
            object: serde_json::to_value(input)?,
        };
        if let Some(value) = self.invoke(action)? {
            return Ok(serde_json::from_value(value)?);
        }

        let stored = self.tracker.get(&resource, namespace, &input.metadata.name)?;
        let mut current: K8Obj<S> = serde_json::from_value(stored)?;
        current.status = input.status.clone();
        current.metadata.resource_version = input.metadata.resource_version.clone();

        let value = self
            .tracker
            .update(&resource, namespace, serde_json::to_value(&current)?)?;
        Ok(serde_json::from_value(value)?)
    }

    fn patch_object<S: Spec>(
        &self,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<K8Obj<S>, FakeClientError> {
        let resource = S::group_version_resource();
        let action = Action::Patch {
            resource: resource.clone(),
            namespace: namespace.to_owned(),
            name: name.to_owned(),
            patch: patch.clone(),
        };
        if let Some(value) = self.invoke(action)? {
            return Ok(serde_json::from_value(value)?);
        }

        let mut object = self.tracker.get(&resource, namespace, name)?;
        merge_patch(&mut object, patch);
        // name and namespace can't be patched away
        if object.pointer("/metadata/name").and_then(Value::as_str) != Some(name) {
            return Err(FakeClientError::PatchError);
        }
        let value = self.tracker.update(&resource, namespace, object)?;
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl MetadataClient for FakeClient {
    type MetadataClientError = FakeClientError;

    async fn retrieve_item<S, M>(&self, metadata: &M) -> Result<K8Obj<S>, FakeClientError>
    where
        S: Spec,
        M: K8Meta + Send + Sync,
    {
        self.get_object(metadata.namespace(), metadata.name())
    }

    async fn retrieve_items_with_option<S, N>(
        &self,
        namespace: N,
        option: Option<ListArg>,
    ) -> Result<K8List<S>, FakeClientError>
    where
        S: Spec,
        N: Into<NameSpace> + Send + Sync,
    {
        self.list_objects(namespace.into(), option)
    }

    async fn delete_item_with_option<S, M>(
        &self,
        metadata: &M,
        option: Option<DeleteOptions>,
    ) -> Result<DeleteStatus<S>, FakeClientError>
    where
        S: Spec,
        M: K8Meta + Send + Sync,
    {
        self.delete_object(metadata.namespace(), metadata.name(), option)
    }

    async fn delete_collection<S, N>(
        &self,
        namespace: N,
        option: Option<ListArg>,
    ) -> Result<(), FakeClientError>
    where
        S: Spec,
        N: Into<NameSpace> + Send + Sync,
    {
        self.delete_objects::<S>(namespace.into(), option)
    }

    async fn create_item<S>(&self, value: InputK8Obj<S>) -> Result<K8Obj<S>, FakeClientError>
    where
        S: Spec,
    {
        self.create_object(value)
    }

    async fn update_item<S>(&self, value: UpdatedK8Obj<S>) -> Result<K8Obj<S>, FakeClientError>
    where
        S: Spec,
    {
        self.update_object(value)
    }

    async fn update_status<S>(
        &self,
        value: &UpdateK8ObjStatus<S>,
    ) -> Result<K8Obj<S>, FakeClientError>
    where
        S: Spec,
    {
        self.update_object_status(value)
    }

    async fn patch_spec<S, M>(&self, metadata: &M, patch: &Value) -> Result<K8Obj<S>, FakeClientError>
    where
        S: Spec,
        M: K8Meta + Display + Send + Sync,
    {
        debug!("patching {} with {}", metadata, patch);
        self.patch_object(metadata.namespace(), metadata.name(), patch)
    }

    /// Live changes only.
    /// The tracker keeps no history, so `resource_version` is recorded but not replayed from.
    fn watch_stream_since<S, N>(
        &self,
        namespace: N,
        resource_version: Option<String>,
    ) -> BoxStream<'_, TokenStreamResult<S, FakeClientError>>
    where
        S: Spec + 'static,
        N: Into<NameSpace>,
    {
        let namespace = namespace.into();
        let resource = S::group_version_resource();
        let action = Action::Watch {
            resource: resource.clone(),
            namespace: action_namespace(&namespace),
            resource_version,
        };

        match self.invoke(action) {
            Ok(Some(value)) => {
                let events = serde_json::from_value::<Vec<K8Watch<S>>>(value)
                    .map_err(FakeClientError::from)
                    .and_then(as_token_stream_result);
                once(ready(events)).boxed()
            }
            Ok(None) => match self.tracker.watch(&resource, namespace.as_filter()) {
                Ok(receiver) => receiver
                    .map(|event| Ok(vec![to_watch::<S>(event)]))
                    .boxed(),
                Err(err) => once(ready(Err(FakeClientError::from(err)))).boxed(),
            },
            Err(err) => once(ready(Err(err))).boxed(),
        }
    }
}

/// Seeds a [`FakeClient`] with objects and reactors.
#[derive(Default)]
pub struct FakeClientBuilder {
    client: FakeClient,
}

impl FakeClientBuilder {
    /// store a copy of `object` as is, keeping its uid and status
    pub fn with_object<S: Spec>(self, object: &K8Obj<S>) -> Result<Self, FakeClientError> {
        self.client
            .tracker
            .add(&S::group_version_resource(), serde_json::to_value(object)?)?;
        Ok(self)
    }

    pub fn with_objects<'a, S, I>(self, objects: I) -> Result<Self, FakeClientError>
    where
        S: Spec + 'a,
        I: IntoIterator<Item = &'a K8Obj<S>>,
    {
        let mut builder = self;
        for object in objects {
            builder = builder.with_object(object)?;
        }
        Ok(builder)
    }

    pub fn with_reactor<V, R, F>(self, verb: V, resource: R, reaction: F) -> Result<Self, FakeClientError>
    where
        V: Into<String>,
        R: Into<String>,
        F: Fn(&Action) -> Option<Result<Value, FakeClientError>> + Send + Sync + 'static,
    {
        self.client.add_reactor(verb, resource, reaction)?;
        Ok(self)
    }

    pub fn build(self) -> FakeClient {
        self.client
    }
}

fn action_namespace(namespace: &NameSpace) -> String {
    namespace.as_filter().unwrap_or_default().to_owned()
}

fn to_watch<S: Spec>(event: WatchEvent) -> Result<K8Watch<S>, FakeClientError> {
    let object: K8Obj<S> = serde_json::from_value(event.object)?;
    Ok(match event.event_type {
        WatchEventType::Added => K8Watch::ADDED(object),
        WatchEventType::Modified => K8Watch::MODIFIED(object),
        WatchEventType::Deleted => K8Watch::DELETED(object),
    })
}

/// Label and field selectors of a list call.
struct ListFilter {
    labels: Selector,
    fields: Vec<FieldTerm>,
}

/// `metadata.name` or `metadata.namespace` compared with `=`, `==` or `!=`
struct FieldTerm {
    field: MetaField,
    value: String,
    equal: bool,
}

enum MetaField {
    Name,
    Namespace,
}

impl ListFilter {
    fn parse(option: &ListArg) -> Result<Self, FakeClientError> {
        let labels = match &option.label_selector {
            Some(labels) => labels.parse()?,
            None => Selector::everything(),
        };
        let fields = match &option.field_selector {
            Some(fields) => fields
                .split(',')
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(FieldTerm::parse)
                .collect::<Result<_, _>>()?,
            None => vec![],
        };
        Ok(Self { labels, fields })
    }

    fn matches(&self, meta: &ObjectMeta) -> bool {
        self.labels.matches(&meta.labels) && self.fields.iter().all(|term| term.matches(meta))
    }
}

impl FieldTerm {
    fn parse(term: &str) -> Result<Self, FakeClientError> {
        let (field, value, equal) = if let Some((field, value)) = term.split_once("!=") {
            (field, value, false)
        } else if let Some((field, value)) = term.split_once("==") {
            (field, value, true)
        } else if let Some((field, value)) = term.split_once('=') {
            (field, value, true)
        } else {
            return Err(FakeClientError::FieldSelector(term.to_owned()));
        };

        let field = match field.trim() {
            "metadata.name" => MetaField::Name,
            "metadata.namespace" => MetaField::Namespace,
            _ => return Err(FakeClientError::FieldSelector(term.to_owned())),
        };
        Ok(Self {
            field,
            value: value.trim().to_owned(),
            equal,
        })
    }

    fn matches(&self, meta: &ObjectMeta) -> bool {
        let actual = match self.field {
            MetaField::Name => &meta.name,
            MetaField::Namespace => &meta.namespace,
        };
        (*actual == self.value) == self.equal
    }
}

#[cfg(test)]
mod test {

    use std::collections::HashMap;
    use std::sync::Arc;

    use futures::StreamExt;
    use rand::distributions::Alphanumeric;
    use rand::thread_rng;
    use rand::Rng;
    use serde_json::json;

    use events_api::v1alpha1::StorageSpec;
    use events_types::options::DeleteOptions;
    use events_types::DeleteStatus;
    use events_types::InputK8Obj;
    use events_types::InputObjectMeta;
    use events_types::K8List;
    use events_types::K8Obj;
    use events_types::K8Watch;
    use events_types::ObjectMeta;
    use events_types::Spec;

    use crate::Action;
    use crate::FakeClientError;
    use crate::ListArg;
    use crate::MetadataClient;
    use crate::MetadataClientError;
    use crate::Verb;

    use super::FakeClient;

    fn new_storage(labels: Vec<(&str, &str)>) -> InputK8Obj<StorageSpec> {
        let rname: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(5)
            .map(char::from)
            .collect();
        let name = format!("test{}", rname).to_lowercase();

        let labels: HashMap<String, String> = labels
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value.to_owned()))
            .collect();

        InputK8Obj {
            api_version: StorageSpec::api_version(),
            kind: StorageSpec::kind(),
            metadata: InputObjectMeta {
                name,
                labels,
                namespace: "default".to_owned(),
                ..Default::default()
            },
            spec: StorageSpec {
                bucket: "my-bucket".to_owned(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[fluvio_future::test]
    async fn test_create_and_delete_storage() {
        let client = FakeClient::new();
        let item = client
            .create_item::<StorageSpec>(new_storage(vec![]))
            .await
            .expect("storage should be created");
        assert_eq!(item.metadata.generation, Some(1));

        let status = client
            .delete_item::<StorageSpec, _>(&item.metadata)
            .await
            .expect("delete should work");
        match status {
            DeleteStatus::Deleted(deleted) => {
                let details = deleted.details.expect("details");
                assert_eq!(details.name, item.metadata.name);
                assert_eq!(details.kind, "storages");
            }
            DeleteStatus::ForegroundDelete(_) => panic!("no finalizers, should be gone"),
        }

        let err = client
            .retrieve_item::<StorageSpec, _>(&item.metadata)
            .await
            .expect_err("storage was deleted");
        assert!(err.not_founded());
    }

    #[fluvio_future::test]
    async fn test_create_twice_fails() {
        let client = FakeClient::new();
        let input = new_storage(vec![]);
        client
            .create_item::<StorageSpec>(input.clone())
            .await
            .expect("create");
        let err = client
            .create_item::<StorageSpec>(input)
            .await
            .expect_err("duplicate");
        assert!(err.already_exists());
    }

    #[fluvio_future::test]
    async fn test_list_with_label_and_field_selector() {
        let client = FakeClient::new();
        let first = client
            .create_item::<StorageSpec>(new_storage(vec![("app", "storage"), ("tier", "gold")]))
            .await
            .expect("create");
        client
            .create_item::<StorageSpec>(new_storage(vec![("app", "storage")]))
            .await
            .expect("create");
        client
            .create_item::<StorageSpec>(new_storage(vec![("app", "other")]))
            .await
            .expect("create");

        let all = client
            .retrieve_items::<StorageSpec, _>("default")
            .await
            .expect("list");
        assert_eq!(all.items.len(), 3);
        assert_eq!(all.kind, "StorageList");

        let storages = client
            .retrieve_items_with_option::<StorageSpec, _>("default", Some(ListArg::labels("app=storage")))
            .await
            .expect("list");
        assert_eq!(storages.items.len(), 2);

        let gold = client
            .retrieve_items_with_option::<StorageSpec, _>(
                "default",
                Some(ListArg::labels("app in (storage),tier")),
            )
            .await
            .expect("list");
        assert_eq!(gold.items.len(), 1);
        assert_eq!(gold.items[0].metadata.name, first.metadata.name);

        let by_name = client
            .retrieve_items_with_option::<StorageSpec, _>(
                "default",
                Some(ListArg::fields(format!("metadata.name!={}", first.metadata.name))),
            )
            .await
            .expect("list");
        assert_eq!(by_name.items.len(), 2);

        assert!(matches!(
            client
                .retrieve_items_with_option::<StorageSpec, _>("default", Some(ListArg::labels("a in b")))
                .await,
            Err(FakeClientError::Selector(_))
        ));
    }

    #[fluvio_future::test]
    async fn test_actions_are_recorded() {
        let client = FakeClient::new();
        let item = client
            .create_item::<StorageSpec>(new_storage(vec![]))
            .await
            .expect("create");
        let status = item.status.clone();
        client
            .update_status::<StorageSpec>(&item.as_status_update(status))
            .await
            .expect("update status");
        client
            .retrieve_items::<StorageSpec, _>("default")
            .await
            .expect("list");

        let actions = client.actions();
        let verbs: Vec<Verb> = actions.iter().map(Action::verb).collect();
        assert_eq!(verbs, vec![Verb::Create, Verb::Update, Verb::List]);
        assert_eq!(actions[1].subresource(), Some("status"));
        assert_eq!(actions[1].namespace(), "default");

        client.clear_actions().expect("clear");
        assert!(client.actions().is_empty());
    }

    #[fluvio_future::test]
    async fn test_reactor_injects_error() {
        let client = FakeClient::new();
        client
            .prepend_reactor("create", "storages", |_action| {
                Some(Err(FakeClientError::other("inducing failure for create storages")))
            })
            .expect("reactor");

        let err = client
            .create_item::<StorageSpec>(new_storage(vec![]))
            .await
            .expect_err("reactor should fail create");
        assert_eq!(err.to_string(), "inducing failure for create storages");
        // still recorded, but nothing stored
        assert_eq!(client.actions().len(), 1);
        let list = client
            .retrieve_items::<StorageSpec, _>("default")
            .await
            .expect("list");
        assert!(list.items.is_empty());
    }

    #[fluvio_future::test]
    async fn test_reactor_list_is_filtered() {
        let mut reacted: K8List<StorageSpec> = K8List::new();
        for (name, app) in [("s1", "a"), ("s2", "b")] {
            let mut item = K8Obj::new(name, StorageSpec::default());
            item.metadata = ObjectMeta::new(name, "default").with_labels(vec![("app", app)]);
            reacted.items.push(item);
        }
        let reacted = serde_json::to_value(&reacted).expect("serialize");

        let client = FakeClient::new();
        client
            .prepend_reactor("list", "storages", move |_action| Some(Ok(reacted.clone())))
            .expect("reactor");

        let list = client
            .retrieve_items_with_option::<StorageSpec, _>("default", Some(ListArg::labels("app=a")))
            .await
            .expect("list");
        let names: Vec<&str> = list.items.iter().map(|item| item.metadata.name.as_str()).collect();
        assert_eq!(names, vec!["s1"]);

        let list = client
            .retrieve_items_with_option::<StorageSpec, _>("default", Some(ListArg::fields("metadata.name=s2")))
            .await
            .expect("list");
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].metadata.name, "s2");

        let all = client
            .retrieve_items::<StorageSpec, _>("default")
            .await
            .expect("list");
        assert_eq!(all.items.len(), 2);
    }

    #[fluvio_future::test]
    async fn test_reactor_fails_delete_collection() {
        let client = FakeClient::new();
        client
            .create_item::<StorageSpec>(new_storage(vec![("app", "a")]))
            .await
            .expect("create");
        client
            .prepend_reactor("delete-collection", "storages", |_action| {
                Some(Err(FakeClientError::other("inducing failure for delete-collection storages")))
            })
            .expect("reactor");

        let err = client
            .delete_collection::<StorageSpec, _>("default", Some(ListArg::labels("app=a")))
            .await
            .expect_err("reactor should fail delete collection");
        assert!(matches!(err, FakeClientError::Other(_)));
        assert_eq!(err.to_string(), "inducing failure for delete-collection storages");

        let left = client
            .retrieve_items::<StorageSpec, _>("default")
            .await
            .expect("list");
        assert_eq!(left.items.len(), 1);
    }

    #[fluvio_future::test]
    async fn test_reaction_registers_reactor() {
        let client = Arc::new(FakeClient::new());
        let weak = Arc::downgrade(&client);
        client
            .prepend_reactor("create", "storages", move |_action| {
                if let Some(client) = weak.upgrade() {
                    client
                        .prepend_reactor("create", "storages", |_action| {
                            Some(Err(FakeClientError::other("second create rejected")))
                        })
                        .expect("nested reactor");
                }
                None
            })
            .expect("reactor");

        client
            .create_item::<StorageSpec>(new_storage(vec![]))
            .await
            .expect("first create reaches the tracker");
        let err = client
            .create_item::<StorageSpec>(new_storage(vec![]))
            .await
            .expect_err("reactor added during the first create");
        assert_eq!(err.to_string(), "second create rejected");
    }

    #[fluvio_future::test]
    async fn test_update_status_keeps_spec() {
        let client = FakeClient::new();
        let item = client
            .create_item::<StorageSpec>(new_storage(vec![]))
            .await
            .expect("create");

        let mut status = item.status.clone();
        status.mark_topic_ready();
        status.topic_id = "topic-1".to_owned();
        let updated = client
            .update_status::<StorageSpec>(&item.as_status_update(status))
            .await
            .expect("update status");
        assert_eq!(updated.spec, item.spec);
        assert_eq!(updated.status.topic_id, "topic-1");
        assert_eq!(updated.metadata.generation, Some(1));

        // stale resource version
        let err = client
            .update_status::<StorageSpec>(&item.as_status_update(item.status.clone()))
            .await
            .expect_err("conflict");
        assert!(matches!(err, FakeClientError::Tracker(_)));
    }

    #[fluvio_future::test]
    async fn test_update_and_patch_spec() {
        let client = FakeClient::new();
        let item = client
            .create_item::<StorageSpec>(new_storage(vec![]))
            .await
            .expect("create");

        let mut update = item.as_update();
        update.spec.bucket = "other-bucket".to_owned();
        let updated: K8Obj<StorageSpec> = client.update_item(update).await.expect("update");
        assert_eq!(updated.spec.bucket, "other-bucket");
        assert_eq!(updated.metadata.generation, Some(2));

        let patched = client
            .patch_spec::<StorageSpec, _>(
                &updated.metadata,
                &json!({ "spec": { "objectNamePrefix": "logs/" } }),
            )
            .await
            .expect("patch");
        assert_eq!(patched.spec.object_name_prefix, "logs/");
        assert_eq!(patched.spec.bucket, "other-bucket");
        assert_eq!(patched.metadata.generation, Some(3));
    }

    #[fluvio_future::test]
    async fn test_delete_with_finalizer_and_precondition() {
        let client = FakeClient::new();
        let mut input = new_storage(vec![]);
        input.metadata.finalizers = vec!["storages.events.cloud.google.com".to_owned()];
        let item = client
            .create_item::<StorageSpec>(input)
            .await
            .expect("create");

        let status = client
            .delete_item::<StorageSpec, _>(&item.metadata)
            .await
            .expect("delete");
        let pending = match status {
            DeleteStatus::ForegroundDelete(obj) => obj,
            DeleteStatus::Deleted(_) => panic!("finalizer should hold the object"),
        };
        assert!(pending.metadata.is_deleting());

        let mut release = pending.as_update();
        release.metadata.finalizers.clear();
        client
            .update_item::<StorageSpec>(release)
            .await
            .expect("remove finalizer");
        assert!(!client
            .exists::<StorageSpec, _>(&item.metadata)
            .await
            .expect("exists"));

        let other = client
            .create_item::<StorageSpec>(new_storage(vec![]))
            .await
            .expect("create");
        assert!(client
            .delete_item_with_option::<StorageSpec, _>(&other.metadata, Some(DeleteOptions::with_uid("nope")))
            .await
            .is_err());
    }

    #[fluvio_future::test]
    async fn test_delete_collection_by_label() {
        let client = FakeClient::new();
        for labels in vec![vec![("app", "a")], vec![("app", "a")], vec![("app", "b")]] {
            client
                .create_item::<StorageSpec>(new_storage(labels))
                .await
                .expect("create");
        }

        client
            .delete_collection::<StorageSpec, _>("default", Some(ListArg::labels("app=a")))
            .await
            .expect("delete collection");
        let left = client
            .retrieve_items::<StorageSpec, _>("default")
            .await
            .expect("list");
        assert_eq!(left.items.len(), 1);
        assert_eq!(left.items[0].metadata.labels["app"], "b");
    }

    #[fluvio_future::test]
    async fn test_watch_stream_now() {
        let client = FakeClient::new();
        let existing = client
            .create_item::<StorageSpec>(new_storage(vec![]))
            .await
            .expect("create");

        let mut stream = client.watch_stream_now::<StorageSpec>("default".to_owned());
        let first = stream
            .next()
            .await
            .expect("initial list")
            .expect("no error");
        assert_eq!(first.len(), 1);
        match &first[0] {
            Ok(K8Watch::ADDED(obj)) => assert_eq!(obj.metadata.name, existing.metadata.name),
            other => panic!("unexpected event {:?}", other),
        }

        let created = client
            .create_item::<StorageSpec>(new_storage(vec![]))
            .await
            .expect("create");
        let next = stream.next().await.expect("event").expect("no error");
        match &next[0] {
            Ok(K8Watch::ADDED(obj)) => assert_eq!(obj.metadata.name, created.metadata.name),
            other => panic!("unexpected event {:?}", other),
        }
    }
}
