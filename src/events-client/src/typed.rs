use std::marker::PhantomData;

use futures::stream::BoxStream;
use serde_json::Value;

use events_types::options::DeleteOptions;
use events_types::DeleteStatus;
use events_types::InputK8Obj;
use events_types::ItemMeta;
use events_types::K8List;
use events_types::K8Obj;
use events_types::Spec;
use events_types::UpdateK8ObjStatus;
use events_types::UpdatedK8Obj;

use crate::ListArg;
use crate::MetadataClient;
use crate::SharedClient;
use crate::TokenStreamResult;

/// Client for one resource type scoped to a namespace,
/// e.g. `storages` in `default`.
pub struct ResourceClient<C, S> {
    client: SharedClient<C>,
    namespace: String,
    data: PhantomData<S>,
}

impl<C, S> Clone for ResourceClient<C, S> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            namespace: self.namespace.clone(),
            data: PhantomData,
        }
    }
}

impl<C, S> ResourceClient<C, S>
where
    C: MetadataClient,
    S: Spec + 'static,
{
    pub fn new<N: Into<String>>(client: SharedClient<C>, namespace: N) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            data: PhantomData,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn item(&self, name: &str) -> ItemMeta {
        ItemMeta::new(name, self.namespace.as_str())
    }

    pub async fn get(&self, name: &str) -> Result<K8Obj<S>, C::MetadataClientError> {
        self.client.retrieve_item::<S, _>(&self.item(name)).await
    }

    pub async fn list(&self, option: Option<ListArg>) -> Result<K8List<S>, C::MetadataClientError> {
        self.client
            .retrieve_items_with_option::<S, _>(self.namespace.as_str(), option)
            .await
    }

    pub fn watch(&self) -> BoxStream<'_, TokenStreamResult<S, C::MetadataClientError>> {
        self.client.watch_stream_now::<S>(self.namespace.clone())
    }

    /// objects without a namespace are created in this client's namespace
    pub async fn create(&self, mut input: InputK8Obj<S>) -> Result<K8Obj<S>, C::MetadataClientError> {
        if input.metadata.namespace.is_empty() {
            input.metadata.namespace = self.namespace.clone();
        }
        self.client.create_item(input).await
    }

    pub async fn update(&self, mut input: UpdatedK8Obj<S>) -> Result<K8Obj<S>, C::MetadataClientError> {
        if input.metadata.namespace.is_empty() {
            input.metadata.namespace = self.namespace.clone();
        }
        self.client.update_item(input).await
    }

    pub async fn update_status(
        &self,
        input: &UpdateK8ObjStatus<S>,
    ) -> Result<K8Obj<S>, C::MetadataClientError> {
        self.client.update_status(input).await
    }

    pub async fn delete(&self, name: &str) -> Result<DeleteStatus<S>, C::MetadataClientError> {
        self.client.delete_item::<S, _>(&self.item(name)).await
    }

    pub async fn delete_with_option(
        &self,
        name: &str,
        option: DeleteOptions,
    ) -> Result<DeleteStatus<S>, C::MetadataClientError> {
        self.client
            .delete_item_with_option::<S, _>(&self.item(name), Some(option))
            .await
    }

    pub async fn delete_collection(&self, option: Option<ListArg>) -> Result<(), C::MetadataClientError> {
        self.client
            .delete_collection::<S, _>(self.namespace.as_str(), option)
            .await
    }

    /// JSON merge patch
    pub async fn patch(&self, name: &str, patch: &Value) -> Result<K8Obj<S>, C::MetadataClientError> {
        self.client.patch_spec::<S, _>(&self.item(name), patch).await
    }
}
