use crate::errors::CoreError;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A `HashMap` wrapper whose every operation runs under one mutex.
///
/// Implemented as a wrapper rather than exposing the map so the only
/// mutators are the ones below: entries can be added but never replaced
/// or removed.
pub struct SynchronizedStore<K, V> {
    resource: &'static str,
    entries: Mutex<HashMap<K, V>>,
}

impl<K, V> SynchronizedStore<K, V>
where
    K: Eq + Hash,
{
    /// Create an empty store. `resource` names the store in lock errors.
    pub fn new(resource: &'static str) -> Self {
        Self {
            resource,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Entries are only ever written by a single `insert` after any
    /// caller code has returned, so a panic while the lock was held cannot
    /// leave the map half-updated and a poisoned lock is taken over.
    fn guard(&self) -> MutexGuard<'_, HashMap<K, V>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            tracing::warn!(resource = self.resource, "recovering poisoned store lock");
            PoisonError::into_inner(poisoned)
        })
    }

    /// Retrieve a value
    pub fn lookup<Q>(&self, key: &Q) -> Option<V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
        V: Clone,
    {
        self.guard().get(key).cloned()
    }

    /// Returns true if the store contains the key
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.guard().contains_key(key)
    }

    /// Return the value stored under `key`, creating it with `create` first
    /// if it is missing.
    ///
    /// `create` runs while the lock is held, so it is invoked at most once per
    /// key. It must not call back into this store.
    pub fn get_or_create<F>(&self, key: K, create: F) -> Result<V, CoreError>
    where
        V: Clone,
        F: FnOnce() -> Result<V, CoreError>,
    {
        let mut entries = self.guard();
        if let Some(existing) = entries.get(&key) {
            return Ok(existing.clone());
        }

        let value = create()?;
        entries.insert(key, value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }
}

impl<K, V> SynchronizedStore<K, V>
where
    K: Eq + Hash + fmt::Display,
{
    /// Add a value. Fails with a duplicate name error if the key is taken;
    /// the existing entry is left untouched.
    pub fn insert(&self, key: K, value: V) -> Result<(), CoreError> {
        let mut entries = self.guard();
        if entries.contains_key(&key) {
            return Err(CoreError::duplicate_name(key.to_string()));
        }

        entries.insert(key, value);
        Ok(())
    }
}

impl<K, V> fmt::Debug for SynchronizedStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("SynchronizedStore")
            .field("resource", &self.resource)
            .field("len", &len)
            .finish()
    }
}
