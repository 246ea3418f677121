use std::fmt;

use serde_json::Value;

use events_types::GroupVersionResource;

use crate::ListArg;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    List,
    Watch,
    Create,
    Update,
    Delete,
    DeleteCollection,
    Patch,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::List => "list",
            Self::Watch => "watch",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::DeleteCollection => "delete-collection",
            Self::Patch => "patch",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recorded call against the fake client.
/// Namespace is empty for calls spanning all namespaces.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Get {
        resource: GroupVersionResource,
        namespace: String,
        name: String,
    },
    List {
        resource: GroupVersionResource,
        namespace: String,
        list_arg: ListArg,
    },
    Watch {
        resource: GroupVersionResource,
        namespace: String,
        resource_version: Option<String>,
    },
    Create {
        resource: GroupVersionResource,
        namespace: String,
        object: Value,
    },
    Update {
        resource: GroupVersionResource,
        namespace: String,
        subresource: Option<String>,
        object: Value,
    },
    Delete {
        resource: GroupVersionResource,
        namespace: String,
        name: String,
    },
    DeleteCollection {
        resource: GroupVersionResource,
        namespace: String,
        list_arg: ListArg,
    },
    Patch {
        resource: GroupVersionResource,
        namespace: String,
        name: String,
        patch: Value,
    },
}

impl Action {
    pub fn verb(&self) -> Verb {
        match self {
            Self::Get { .. } => Verb::Get,
            Self::List { .. } => Verb::List,
            Self::Watch { .. } => Verb::Watch,
            Self::Create { .. } => Verb::Create,
            Self::Update { .. } => Verb::Update,
            Self::Delete { .. } => Verb::Delete,
            Self::DeleteCollection { .. } => Verb::DeleteCollection,
            Self::Patch { .. } => Verb::Patch,
        }
    }

    pub fn resource(&self) -> &GroupVersionResource {
        match self {
            Self::Get { resource, .. }
            | Self::List { resource, .. }
            | Self::Watch { resource, .. }
            | Self::Create { resource, .. }
            | Self::Update { resource, .. }
            | Self::Delete { resource, .. }
            | Self::DeleteCollection { resource, .. }
            | Self::Patch { resource, .. } => resource,
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            Self::Get { namespace, .. }
            | Self::List { namespace, .. }
            | Self::Watch { namespace, .. }
            | Self::Create { namespace, .. }
            | Self::Update { namespace, .. }
            | Self::Delete { namespace, .. }
            | Self::DeleteCollection { namespace, .. }
            | Self::Patch { namespace, .. } => namespace,
        }
    }

    pub fn subresource(&self) -> Option<&str> {
        match self {
            Self::Update { subresource, .. } => subresource.as_deref(),
            _ => None,
        }
    }

    /// object carried by create and update
    pub fn object(&self) -> Option<&Value> {
        match self {
            Self::Create { object, .. } | Self::Update { object, .. } => Some(object),
            _ => None,
        }
    }

    /// `*` matches any verb or resource
    pub fn matches(&self, verb: &str, resource: &str) -> bool {
        (verb == "*" || verb == self.verb().as_str())
            && (resource == "*" || resource == self.resource().resource)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.verb(), self.resource().resource)?;
        if let Some(subresource) = self.subresource() {
            write!(f, "/{}", subresource)?;
        }
        if !self.namespace().is_empty() {
            write!(f, " in {}", self.namespace())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {

    use serde_json::json;

    use events_types::GroupVersionResource;

    use super::Action;
    use super::Verb;

    fn storages() -> GroupVersionResource {
        GroupVersionResource {
            group: "events.cloud.google.com".to_owned(),
            version: "v1alpha1".to_owned(),
            resource: "storages".to_owned(),
        }
    }

    #[test]
    fn test_action_matching() {
        let action = Action::Update {
            resource: storages(),
            namespace: "default".to_owned(),
            subresource: Some("status".to_owned()),
            object: json!({}),
        };

        assert_eq!(action.verb(), Verb::Update);
        assert!(action.matches("update", "storages"));
        assert!(action.matches("*", "storages"));
        assert!(action.matches("update", "*"));
        assert!(!action.matches("create", "storages"));
        assert!(!action.matches("update", "gcses"));
        assert_eq!(action.subresource(), Some("status"));
        assert_eq!(action.to_string(), "update storages/status in default");
    }
}
