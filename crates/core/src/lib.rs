pub mod config;
pub mod container;
pub mod errors;
pub mod exports;

// Re-export key types for convenience
pub use config::{ConfigError, RegistryConfig};
pub use container::{Fetch, Fetcher, Lifetime, Name, Producer, Registry, SynchronizedStore, Value};
pub use errors::{CoreError, ErrorKind};
pub use exports::{Access, ExportSpec, ExportView, Import, Visibility};

/// Everything needed to register and fetch dependencies
pub mod prelude {
    pub use crate::container::{Fetch, Fetcher, Lifetime, Name, Producer, Registry};
    pub use crate::errors::CoreError;
    pub use crate::exports::{Access, ExportSpec, Visibility};
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get crate version
pub fn version() -> &'static str {
    VERSION
}
