use serde::Deserialize;
use serde::Serialize;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOptions {
    pub kind: String,
    pub api_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace_period_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preconditions: Option<Precondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub propagation_policy: Option<PropagationPolicy>,
}

impl Default for DeleteOptions {
    fn default() -> Self {
        Self {
            kind: "DeleteOptions".to_owned(),
            api_version: "v1".to_owned(),
            dry_run: None,
            grace_period_seconds: None,
            preconditions: None,
            propagation_policy: None,
        }
    }
}

impl DeleteOptions {
    /// only delete if the stored object still has this uid
    pub fn with_uid<S: Into<String>>(uid: S) -> Self {
        Self {
            preconditions: Some(Precondition { uid: uid.into() }),
            ..Default::default()
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationPolicy {
    Orphan,
    Background,
    Foreground,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Precondition {
    pub uid: String,
}
