use crate::config::RegistryConfig;
use crate::container::chain::ProductionChain;
use crate::container::fetch::{Fetch, Fetcher, RegistryId, ResolverTable};
use crate::container::lifetime::Lifetime;
use crate::container::resolver::{Producer, Resolver};
use crate::container::store::SynchronizedStore;
use crate::container::Name;
use crate::errors::CoreError;
use crate::exports::{ExportSpec, ExportView, NormalizedExports};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Maps names to lazily produced dependencies.
///
/// Entries are registered as factories (produced on every fetch) or
/// singletons (produced on the first fetch, then cached). A producer may
/// fetch other entries through the [`Fetcher`] it receives; requesting a name
/// that is already being produced on the same path fails with a cycle error.
///
/// ```
/// use switchboard_core::prelude::*;
///
/// let registry = Registry::new();
/// registry
///     .singleton("greeting", |_| Ok("hello".to_string()))?
///     .factory("message", |f| {
///         let greeting = f.fetch::<String>("greeting")?;
///         Ok(format!("{}, world", greeting))
///     })?;
///
/// assert_eq!(*registry.fetch::<String>("message")?, "hello, world");
/// # Ok::<(), CoreError>(())
/// ```
pub struct Registry {
    id: RegistryId,
    config: RegistryConfig,
    resolvers: Arc<ResolverTable>,
    views: SynchronizedStore<NormalizedExports, Arc<ExportView>>,
    root: ProductionChain,
}

impl Registry {
    /// Create an empty registry with the default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            id: RegistryId::new(),
            config,
            resolvers: Arc::new(ResolverTable::new("resolver_table")),
            views: SynchronizedStore::new("export_views"),
            root: ProductionChain::empty(),
        }
    }

    /// Create a registry and run `setup` against it, returning the first
    /// registration error
    pub fn build<F>(setup: F) -> Result<Self, CoreError>
    where
        F: FnOnce(&Registry) -> Result<(), CoreError>,
    {
        Self::build_with_config(RegistryConfig::default(), setup)
    }

    /// Like [`Registry::build`], starting from `config`
    pub fn build_with_config<F>(config: RegistryConfig, setup: F) -> Result<Self, CoreError>
    where
        F: FnOnce(&Registry) -> Result<(), CoreError>,
    {
        let registry = Self::with_config(config);
        setup(&registry)?;
        Ok(registry)
    }

    pub fn id(&self) -> RegistryId {
        self.id
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register `name` with the given lifetime.
    ///
    /// Fails with an invalid argument error when no producer is supplied and
    /// with a duplicate name error when `name` is taken; in both cases the
    /// table is left as it was.
    pub fn register(
        &self,
        name: impl Into<Name>,
        lifetime: Lifetime,
        producer: Option<Producer>,
    ) -> Result<&Self, CoreError> {
        let name = name.into();
        let resolver = Resolver::new(lifetime, producer)?;

        self.resolvers.insert(name.clone(), Arc::new(resolver))?;
        tracing::debug!(registry = %self.id, name = %name, lifetime = %lifetime, "dependency registered");
        Ok(self)
    }

    /// Register a dependency which is produced every time it is fetched
    pub fn factory<T, F>(&self, name: impl Into<Name>, produce: F) -> Result<&Self, CoreError>
    where
        T: Any + Send + Sync,
        F: Fn(&Fetcher) -> Result<T, CoreError> + Send + Sync + 'static,
    {
        self.register(name, Lifetime::Factory, Some(Producer::new(produce)))
    }

    /// Register a dependency which is produced the first time it is fetched.
    /// Later fetches return the cached value.
    pub fn singleton<T, F>(&self, name: impl Into<Name>, produce: F) -> Result<&Self, CoreError>
    where
        T: Any + Send + Sync,
        F: Fn(&Fetcher) -> Result<T, CoreError> + Send + Sync + 'static,
    {
        self.register(name, Lifetime::Singleton, Some(Producer::new(produce)))
    }

    /// Alias of [`Registry::factory`]
    pub fn on<T, F>(&self, name: impl Into<Name>, produce: F) -> Result<&Self, CoreError>
    where
        T: Any + Send + Sync,
        F: Fn(&Fetcher) -> Result<T, CoreError> + Send + Sync + 'static,
    {
        self.factory(name, produce)
    }

    /// Alias of [`Registry::singleton`]
    pub fn once<T, F>(&self, name: impl Into<Name>, produce: F) -> Result<&Self, CoreError>
    where
        T: Any + Send + Sync,
        F: Fn(&Fetcher) -> Result<T, CoreError> + Send + Sync + 'static,
    {
        self.singleton(name, produce)
    }

    pub fn factory_fn<T, F>(&self, name: impl Into<Name>, produce: F) -> Result<&Self, CoreError>
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register(name, Lifetime::Factory, Some(Producer::thunk(produce)))
    }

    pub fn singleton_fn<T, F>(&self, name: impl Into<Name>, produce: F) -> Result<&Self, CoreError>
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register(name, Lifetime::Singleton, Some(Producer::thunk(produce)))
    }

    /// Register a factory which default-constructs `T`
    pub fn factory_type<T>(&self, name: impl Into<Name>) -> Result<&Self, CoreError>
    where
        T: Default + Any + Send + Sync,
    {
        self.register(name, Lifetime::Factory, Some(Producer::of::<T>()))
    }

    /// Register a singleton which default-constructs `T`
    pub fn singleton_type<T>(&self, name: impl Into<Name>) -> Result<&Self, CoreError>
    where
        T: Default + Any + Send + Sync,
    {
        self.register(name, Lifetime::Singleton, Some(Producer::of::<T>()))
    }

    /// Check if a dependency is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.resolvers.contains(name)
    }

    /// Get the number of registered dependencies
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return a view exposing the entries named by `spec` as accessors.
    ///
    /// Views are cached per normalized specification, so equivalent
    /// specifications share one view.
    pub fn exports(&self, spec: impl Into<ExportSpec>) -> Result<Arc<ExportView>, CoreError> {
        let exports = spec.into().normalize(self.config.default_visibility);
        self.views.get_or_create(exports.clone(), || {
            tracing::debug!(registry = %self.id, "export view generated");
            Ok(Arc::new(ExportView::new(
                exports,
                Fetcher::root(self.resolvers.clone(), self.id),
            )))
        })
    }
}

impl Fetch for Registry {
    fn resolvers(&self) -> &Arc<ResolverTable> {
        &self.resolvers
    }

    fn registry_id(&self) -> RegistryId {
        self.id
    }

    fn chain(&self) -> &ProductionChain {
        &self.root
    }

    fn receiver(&self) -> String {
        match &self.config.label {
            Some(label) => format!("Registry({})", label),
            None => format!("Registry({})", self.id),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("len", &self.len())
            .finish()
    }
}
