pub mod chain;
pub mod fetch;
pub mod lifetime;
pub mod name;
pub mod registry;
pub mod resolver;
pub mod store;

pub use chain::ProductionChain;
pub use fetch::{Fetch, Fetcher, RegistryId, ResolverTable};
pub use lifetime::Lifetime;
pub use name::Name;
pub use registry::Registry;
pub use resolver::{Producer, ProducerSource, Value};
pub use store::SynchronizedStore;
