use crate::container::chain::ProductionChain;
use crate::container::resolver::{Resolver, Value};
use crate::container::store::SynchronizedStore;
use crate::container::Name;
use crate::errors::CoreError;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// The registration table shared by a registry and every lookup handle
/// derived from it
pub type ResolverTable = SynchronizedStore<Name, Arc<Resolver>>;

/// Unique identifier of a registry instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistryId(uuid::Uuid);

impl RegistryId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for RegistryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RegistryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fetching by name, shared by [`crate::Registry`] and [`Fetcher`].
///
/// Implementors supply the table, the production chain they fetch from and a
/// description of themselves for error reports; the lookup algorithm itself
/// lives in the provided methods and is the same at every depth.
pub trait Fetch {
    fn resolvers(&self) -> &Arc<ResolverTable>;

    fn registry_id(&self) -> RegistryId;

    /// Names being produced on the path that led to this receiver
    fn chain(&self) -> &ProductionChain;

    /// Identifies the receiver in not found errors
    fn receiver(&self) -> String;

    /// Fetch the type-erased value registered under `name`.
    ///
    /// Fails with a cycle error if `name` is already being produced on this
    /// path, or a not found error if nothing is registered under it. Errors
    /// raised by the producer, including those of nested fetches, are
    /// returned unchanged.
    fn fetch_value(&self, name: impl Into<Name>) -> Result<Value, CoreError> {
        let name = name.into();
        let chain = self.chain();

        if chain.contains(&name) {
            let path = chain.cycle_path(&name);
            tracing::debug!(name = %name, path = %path, "dependency cycle rejected");
            return Err(CoreError::Cycle { name, path });
        }

        let resolver = match self.resolvers().lookup(&name) {
            Some(resolver) => resolver,
            None => {
                let receiver = self.receiver();
                tracing::debug!(name = %name, receiver = %receiver, "dependency not found");
                return Err(CoreError::not_found(name, Some(receiver)));
            }
        };

        tracing::trace!(name = %name, depth = chain.len(), lifetime = %resolver.lifetime(), "fetching dependency");
        let fetcher = Fetcher {
            table: self.resolvers().clone(),
            registry_id: self.registry_id(),
            chain: chain.extend(&name),
        };
        resolver.produce(&fetcher)
    }

    /// Fetch the value registered under `name` as a `T`
    fn fetch<T>(&self, name: impl Into<Name>) -> Result<Arc<T>, CoreError>
    where
        T: Any + Send + Sync,
    {
        let name = name.into();
        self.fetch_value(name.clone())?
            .downcast::<T>()
            .map_err(|_| CoreError::TypeMismatch {
                name,
                expected: std::any::type_name::<T>(),
            })
    }
}

/// The lookup handle passed to producers.
///
/// A read-only view of the registry's table tied to one production chain:
/// it can fetch, never register.
#[derive(Clone)]
pub struct Fetcher {
    table: Arc<ResolverTable>,
    registry_id: RegistryId,
    chain: ProductionChain,
}

impl Fetcher {
    pub(crate) fn root(table: Arc<ResolverTable>, registry_id: RegistryId) -> Self {
        Self {
            table,
            registry_id,
            chain: ProductionChain::empty(),
        }
    }

    /// The name whose producer received this handle
    pub fn current_name(&self) -> Option<&Name> {
        self.chain.names().last()
    }

    #[cfg(test)]
    pub(crate) fn detached(name: Name) -> Self {
        Self {
            table: Arc::new(ResolverTable::new("resolver_table")),
            registry_id: RegistryId::new(),
            chain: ProductionChain::empty().extend(&name),
        }
    }
}

impl Fetch for Fetcher {
    fn resolvers(&self) -> &Arc<ResolverTable> {
        &self.table
    }

    fn registry_id(&self) -> RegistryId {
        self.registry_id
    }

    fn chain(&self) -> &ProductionChain {
        &self.chain
    }

    fn receiver(&self) -> String {
        format!(
            "Fetcher(registry={}, chain={})",
            self.registry_id,
            self.chain.path_string()
        )
    }
}

impl fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher")
            .field("registry_id", &self.registry_id)
            .field("chain", &self.chain)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::lifetime::Lifetime;
    use crate::container::resolver::Producer;

    fn table_with(entries: Vec<(&str, Lifetime, Producer)>) -> Arc<ResolverTable> {
        let table = Arc::new(ResolverTable::new("resolver_table"));
        for (name, lifetime, producer) in entries {
            let resolver = Resolver::new(lifetime, Some(producer)).unwrap();
            table.insert(Name::from(name), Arc::new(resolver)).unwrap();
        }
        table
    }

    #[test]
    fn test_producer_sees_chain_extended_with_its_name() {
        let table = table_with(vec![
            (
                "outer",
                Lifetime::Factory,
                Producer::new(|f: &Fetcher| f.fetch::<String>("inner").map(|s| (*s).clone())),
            ),
            (
                "inner",
                Lifetime::Factory,
                Producer::new(|f: &Fetcher| Ok(f.chain().path_string())),
            ),
        ]);

        let root = Fetcher::root(table, RegistryId::new());
        let path = root.fetch::<String>("outer").unwrap();
        assert_eq!(path.as_str(), "outer -> inner");
        assert!(root.chain().is_empty());
    }

    #[test]
    fn test_not_found_reports_the_fetcher_as_receiver() {
        let table = table_with(vec![(
            "needs_missing",
            Lifetime::Factory,
            Producer::new(|f: &Fetcher| f.fetch_value("missing")),
        )]);
        let registry_id = RegistryId::new();

        let err = Fetcher::root(table, registry_id)
            .fetch_value("needs_missing")
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.name().map(Name::as_str), Some("missing"));
        assert_eq!(
            err.receiver(),
            Some(format!("Fetcher(registry={}, chain=needs_missing)", registry_id).as_str())
        );
    }

    #[test]
    fn test_cycle_rejected_before_resolver_runs() {
        let fetcher = Fetcher::detached(Name::from("a"));
        let err = fetcher.fetch_value("a").unwrap_err();
        assert!(err.is_cycle());
        assert_eq!(err.to_string(), "cycle detected: a -> a");
    }

    #[test]
    fn test_typed_fetch_reports_mismatch() {
        let table = table_with(vec![("port", Lifetime::Singleton, Producer::thunk(|| 8080u16))]);
        let root = Fetcher::root(table, RegistryId::new());

        assert_eq!(*root.fetch::<u16>("port").unwrap(), 8080);
        let err = root.fetch::<String>("port").unwrap_err();
        assert!(matches!(err, CoreError::TypeMismatch { .. }));
    }
}
