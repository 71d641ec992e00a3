use crate::container::fetch::Fetcher;
use crate::container::lifetime::Lifetime;
use crate::errors::CoreError;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A produced dependency, type-erased
pub type Value = Arc<dyn Any + Send + Sync>;

type ProduceFn = dyn Fn(&Fetcher) -> Result<Value, CoreError> + Send + Sync;

/// Where a producer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerSource {
    /// A closure receiving the lookup handle
    Closure,
    /// A closure taking no arguments
    Thunk,
    /// Default construction of the named type
    Type(&'static str),
}

/// The callable a resolver runs to produce its value.
///
/// Every source is normalized at construction into the same shape, a
/// function of the lookup handle, so resolvers never inspect what kind of
/// producer they hold.
pub struct Producer {
    source: ProducerSource,
    call: Box<ProduceFn>,
}

impl Producer {
    /// A producer that may fetch other dependencies through the lookup handle
    pub fn new<T, F>(produce: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Fetcher) -> Result<T, CoreError> + Send + Sync + 'static,
    {
        Self {
            source: ProducerSource::Closure,
            call: Box::new(move |fetcher: &Fetcher| produce(fetcher).map(|value| Arc::new(value) as Value)),
        }
    }

    /// A producer that ignores the lookup handle
    pub fn thunk<T, F>(produce: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            source: ProducerSource::Thunk,
            call: Box::new(move |_: &Fetcher| Ok(Arc::new(produce()) as Value)),
        }
    }

    /// A producer that default-constructs `T`
    pub fn of<T>() -> Self
    where
        T: Default + Any + Send + Sync,
    {
        Self {
            source: ProducerSource::Type(std::any::type_name::<T>()),
            call: Box::new(|_: &Fetcher| Ok(Arc::new(T::default()) as Value)),
        }
    }

    pub fn source(&self) -> ProducerSource {
        self.source
    }

    fn call(&self, fetcher: &Fetcher) -> Result<Value, CoreError> {
        (self.call)(fetcher)
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Runs its producer on every fetch
#[derive(Debug)]
pub struct Factory {
    producer: Producer,
}

impl Factory {
    pub fn produce(&self, fetcher: &Fetcher) -> Result<Value, CoreError> {
        self.producer.call(fetcher)
    }
}

/// Runs its producer on the first fetch and caches the value.
#[derive(Debug)]
pub struct Singleton {
    producer: Producer,
    cell: Mutex<Option<Value>>,
}

impl Singleton {
    /// The cell only ever holds nothing or a finished value. A producer that
    /// panicked poisons the lock without writing, so the next fetch takes the
    /// lock over and runs the producer again, as after a returned error.
    fn cell(&self) -> MutexGuard<'_, Option<Value>> {
        self.cell.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("recovering singleton cell after a producer panic");
            PoisonError::into_inner(poisoned)
        })
    }

    /// Production and the cache write happen under one lock, so racing first
    /// fetches see a single producer call. Nested fetches go to the
    /// registration table, not this cell; a producer fetching its own name is
    /// rejected as a cycle before it gets here again.
    pub fn produce(&self, fetcher: &Fetcher) -> Result<Value, CoreError> {
        let mut cell = self.cell();

        if let Some(value) = cell.as_ref() {
            return Ok(value.clone());
        }

        let value = self.producer.call(fetcher)?;
        tracing::debug!(name = ?fetcher.current_name(), "singleton produced");
        *cell = Some(value.clone());
        Ok(value)
    }

    pub fn is_cached(&self) -> bool {
        self.cell().is_some()
    }
}

/// Strategy for producing one registered dependency
#[derive(Debug)]
pub enum Resolver {
    Factory(Factory),
    Singleton(Singleton),
}

impl Resolver {
    /// Build a resolver. A missing producer is rejected here, not on first use.
    pub fn new(lifetime: Lifetime, producer: Option<Producer>) -> Result<Self, CoreError> {
        let producer = producer.ok_or_else(|| {
            CoreError::invalid_argument(format!(
                "invalid argument: {} registration requires a producer closure or a type",
                lifetime
            ))
        })?;

        Ok(match lifetime {
            Lifetime::Factory => Resolver::Factory(Factory { producer }),
            Lifetime::Singleton => Resolver::Singleton(Singleton {
                producer,
                cell: Mutex::new(None),
            }),
        })
    }

    pub fn lifetime(&self) -> Lifetime {
        match self {
            Resolver::Factory(_) => Lifetime::Factory,
            Resolver::Singleton(_) => Lifetime::Singleton,
        }
    }

    pub fn produce(&self, fetcher: &Fetcher) -> Result<Value, CoreError> {
        match self {
            Resolver::Factory(factory) => factory.produce(fetcher),
            Resolver::Singleton(singleton) => singleton.produce(fetcher),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Name;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fetcher_for(name: &str) -> Fetcher {
        Fetcher::detached(Name::from(name))
    }

    #[test]
    fn test_missing_producer_is_rejected_at_construction() {
        let err = Resolver::new(Lifetime::Factory, None).unwrap_err();
        assert!(err.is_invalid_argument());

        let err = Resolver::new(Lifetime::Singleton, None).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_factory_invokes_producer_every_time() {
        let counter = Arc::new(AtomicUsize::new(0));
        let calls = counter.clone();
        let resolver = Resolver::new(
            Lifetime::Factory,
            Some(Producer::thunk(move || calls.fetch_add(1, Ordering::SeqCst) + 1)),
        )
        .unwrap();

        let fetcher = fetcher_for("counter");
        let values: Vec<usize> = (0..3)
            .map(|_| *resolver.produce(&fetcher).unwrap().downcast::<usize>().unwrap())
            .collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_singleton_caches_first_value() {
        let counter = Arc::new(AtomicUsize::new(0));
        let calls = counter.clone();
        let resolver = Resolver::new(
            Lifetime::Singleton,
            Some(Producer::thunk(move || calls.fetch_add(1, Ordering::SeqCst))),
        )
        .unwrap();

        let fetcher = fetcher_for("once");
        let first = resolver.produce(&fetcher).unwrap();
        let second = resolver.produce(&fetcher).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        match &resolver {
            Resolver::Singleton(singleton) => assert!(singleton.is_cached()),
            Resolver::Factory(_) => panic!("expected a singleton"),
        }
    }

    #[test]
    fn test_singleton_failure_is_not_cached() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = attempts.clone();
        let resolver = Resolver::new(
            Lifetime::Singleton,
            Some(Producer::new(move |_| {
                if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(CoreError::producer("flaky", "first attempt fails"))
                } else {
                    Ok("ready")
                }
            })),
        )
        .unwrap();

        let fetcher = fetcher_for("flaky");
        assert!(resolver.produce(&fetcher).is_err());
        let value = resolver.produce(&fetcher).unwrap();
        assert_eq!(*value.downcast::<&str>().unwrap(), "ready");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_singleton_retries_after_producer_panic() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = attempts.clone();
        let resolver = Resolver::new(
            Lifetime::Singleton,
            Some(Producer::thunk(move || {
                if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                    panic!("first attempt panics");
                }
                "ready"
            })),
        )
        .unwrap();

        let fetcher = fetcher_for("fragile");
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            resolver.produce(&fetcher)
        }));
        assert!(outcome.is_err());

        let first = resolver.produce(&fetcher).unwrap();
        let second = resolver.produce(&fetcher).unwrap();
        assert_eq!(*first.clone().downcast::<&str>().unwrap(), "ready");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        match &resolver {
            Resolver::Singleton(singleton) => assert!(singleton.is_cached()),
            Resolver::Factory(_) => panic!("expected a singleton"),
        }
    }

    #[test]
    fn test_type_producer_default_constructs() {
        #[derive(Default, Debug, PartialEq)]
        struct Settings {
            retries: u32,
        }

        let producer = Producer::of::<Settings>();
        assert!(matches!(producer.source(), ProducerSource::Type(name) if name.ends_with("Settings")));

        let resolver = Resolver::new(Lifetime::Factory, Some(producer)).unwrap();
        let value = resolver.produce(&fetcher_for("settings")).unwrap();
        assert_eq!(*value.downcast::<Settings>().unwrap(), Settings { retries: 0 });
    }
}
