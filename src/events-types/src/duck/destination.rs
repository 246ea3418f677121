use serde::Deserialize;
use serde::Serialize;
use url::Url;

use crate::core::ObjectReference;

/// Where events are delivered: an addressable object, a URI, or both
/// (the URI is then resolved relative to the object's address)
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ObjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<Url>,
}

impl Destination {
    pub fn to_ref(reference: ObjectReference) -> Self {
        Self {
            reference: Some(reference),
            uri: None,
        }
    }

    pub fn to_uri(uri: Url) -> Self {
        Self {
            reference: None,
            uri: Some(uri),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reference.is_none() && self.uri.is_none()
    }
}

#[cfg(test)]
mod test {

    use serde_json::json;

    use crate::core::ObjectReference;
    use crate::GroupVersionKind;

    use super::Destination;

    #[test]
    fn test_destination_wire() {
        let gvk = GroupVersionKind::new("serving.knative.dev", "v1", "Service");
        let dest = Destination::to_ref(ObjectReference::to_kind(&gvk, "display"));
        let value = serde_json::to_value(&dest).expect("json");
        assert_eq!(
            value,
            json!({ "ref": { "apiVersion": "serving.knative.dev/v1", "kind": "Service", "name": "display" } })
        );

        let parsed: Destination =
            serde_json::from_value(json!({ "uri": "http://sink.default.svc.cluster.local/" }))
                .expect("parse");
        assert!(parsed.reference.is_none());
        assert_eq!(
            parsed.uri.map(|uri| uri.host_str().map(str::to_owned)),
            Some(Some("sink.default.svc.cluster.local".to_owned()))
        );
        assert!(Destination::default().is_empty());
    }
}
