mod crd;
mod copy;
mod metadata;
pub mod labels;
pub mod options;
#[cfg(feature = "core")]
pub mod core;
#[cfg(feature = "duck")]
pub mod duck;

pub use self::crd::*;
pub use self::copy::DeepCopy;
pub use self::metadata::*;
pub use self::spec_def::*;

mod spec_def {

    use std::fmt::Debug;

    use serde::de::DeserializeOwned;
    use serde::Deserialize;
    use serde::Serialize;

    use super::Crd;
    use super::GroupVersionKind;
    use super::GroupVersionResource;

    pub trait Status:
        Sized + Debug + Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync
    {
    }

    pub trait Header:
        Sized + Debug + Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync
    {
    }

    /// Kubernetes Spec
    pub trait Spec:
        Sized + Debug + Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync
    {
        type Status: Status;

        type Header: Header;

        /// if true, spec is namespaced
        const NAME_SPACED: bool = true;

        /// static resource identity
        fn metadata() -> &'static Crd;

        fn label() -> &'static str {
            Self::metadata().names.kind
        }

        fn api_version() -> String {
            Self::metadata().api_version()
        }

        fn kind() -> String {
            Self::metadata().names.kind.to_owned()
        }

        /// type identity used for generic client dispatch
        fn group_version_kind() -> GroupVersionKind {
            Self::metadata().group_version_kind()
        }

        fn group_version_resource() -> GroupVersionResource {
            Self::metadata().group_version_resource()
        }
    }

    /// Fills in values the user left empty.
    /// Applied before an object is handed to a controller.
    pub trait SetDefaults {
        fn set_defaults(&mut self);
    }

    #[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
    pub struct DefaultHeader {}

    impl Header for DefaultHeader {}
}
