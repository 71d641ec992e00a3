use crate::container::{Fetch, Fetcher, Name, RegistryId, Value};
use crate::errors::CoreError;
use crate::exports::spec::{NormalizedExports, Visibility};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Where an accessor is being read from, relative to the type that exports
/// the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// The exporting type itself: every accessor is visible
    Owner,
    /// Another instance of the exporting type: protected and public
    Peer,
    /// Any other caller: public only
    External,
}

impl Access {
    pub fn can_read(&self, visibility: Visibility) -> bool {
        match self {
            Access::Owner => true,
            Access::Peer => visibility != Visibility::Private,
            Access::External => visibility == Visibility::Public,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Owner => "owner",
            Access::Peer => "peer",
            Access::External => "external",
        }
    }
}

#[derive(Debug, Clone)]
struct Accessor {
    dependency: Name,
    visibility: Visibility,
}

/// A bundle of named accessors over registry entries.
///
/// Each accessor fetches its dependency through the registry on every read,
/// so factory entries stay fresh and singleton entries stay shared.
#[derive(Debug)]
pub struct ExportView {
    exports: NormalizedExports,
    accessors: BTreeMap<Name, Accessor>,
    fetcher: Fetcher,
}

impl ExportView {
    pub(crate) fn new(exports: NormalizedExports, fetcher: Fetcher) -> Self {
        let mut accessors = BTreeMap::new();
        for visibility in Visibility::ALL {
            for (dependency, accessor) in exports.at(visibility) {
                accessors.insert(
                    accessor.clone(),
                    Accessor {
                        dependency: dependency.clone(),
                        visibility,
                    },
                );
            }
        }

        Self {
            exports,
            accessors,
            fetcher,
        }
    }

    /// The normalized specification this view was generated from
    pub fn exports(&self) -> &NormalizedExports {
        &self.exports
    }

    pub fn registry_id(&self) -> RegistryId {
        self.fetcher.registry_id()
    }

    /// Accessor names with their visibility, in name order
    pub fn accessors(&self) -> impl Iterator<Item = (&Name, Visibility)> {
        self.accessors
            .iter()
            .map(|(name, accessor)| (name, accessor.visibility))
    }

    pub fn visibility(&self, accessor: &str) -> Option<Visibility> {
        self.accessors.get(accessor).map(|a| a.visibility)
    }

    /// The dependency an accessor reads
    pub fn dependency(&self, accessor: &str) -> Option<&Name> {
        self.accessors.get(accessor).map(|a| &a.dependency)
    }

    pub fn get_value(&self, accessor: &str, access: Access) -> Result<Value, CoreError> {
        let entry = self.accessors.get(accessor).ok_or_else(|| {
            CoreError::not_found(
                accessor,
                Some(format!("ExportView(registry={})", self.fetcher.registry_id())),
            )
        })?;

        if !access.can_read(entry.visibility) {
            return Err(CoreError::AccessDenied {
                accessor: Name::from(accessor),
                visibility: entry.visibility.to_string(),
                access: access.as_str().to_string(),
            });
        }

        self.fetcher.fetch_value(entry.dependency.clone())
    }

    pub fn get<T>(&self, accessor: &str, access: Access) -> Result<Arc<T>, CoreError>
    where
        T: Any + Send + Sync,
    {
        self.get_value(accessor, access)?
            .downcast::<T>()
            .map_err(|_| CoreError::TypeMismatch {
                name: Name::from(accessor),
                expected: std::any::type_name::<T>(),
            })
    }
}
