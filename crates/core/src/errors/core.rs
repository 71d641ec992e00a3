use crate::container::Name;
use thiserror::Error;

/// Core error type for the switchboard registry
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("resolver already exists: {name}")]
    DuplicateName { name: Name },

    #[error("dependency not found: {name}")]
    NotFound {
        name: Name,
        receiver: Option<String>,
    },

    #[error("cycle detected: {path}")]
    Cycle { name: Name, path: String },

    #[error("Dependency '{name}' is not a {expected}")]
    TypeMismatch { name: Name, expected: &'static str },

    #[error("Accessor '{accessor}' is {visibility} and cannot be read with {access} access")]
    AccessDenied {
        accessor: Name,
        visibility: String,
        access: String,
    },

    #[error("Producer for '{name}' failed: {source}")]
    Producer {
        name: Name,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Discriminant of a [`CoreError`], for callers that branch on the failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    DuplicateName,
    NotFound,
    Cycle,
    TypeMismatch,
    AccessDenied,
    Producer,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::DuplicateName => "duplicate_name",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Cycle => "cycle",
            ErrorKind::TypeMismatch => "type_mismatch",
            ErrorKind::AccessDenied => "access_denied",
            ErrorKind::Producer => "producer",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CoreError {
    /// Create a new invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a new duplicate name error
    pub fn duplicate_name(name: impl Into<Name>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    /// Create a new not found error
    pub fn not_found(name: impl Into<Name>, receiver: Option<String>) -> Self {
        Self::NotFound {
            name: name.into(),
            receiver,
        }
    }

    /// Wrap a failure raised by user producer code
    pub fn producer(
        name: impl Into<Name>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Producer {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::DuplicateName { .. } => ErrorKind::DuplicateName,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Cycle { .. } => ErrorKind::Cycle,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::AccessDenied { .. } => ErrorKind::AccessDenied,
            Self::Producer { .. } => ErrorKind::Producer,
        }
    }

    /// The name the failed lookup or registration was about, if any
    pub fn name(&self) -> Option<&Name> {
        match self {
            Self::DuplicateName { name }
            | Self::NotFound { name, .. }
            | Self::Cycle { name, .. }
            | Self::TypeMismatch { name, .. }
            | Self::Producer { name, .. } => Some(name),
            Self::AccessDenied { accessor, .. } => Some(accessor),
            Self::InvalidArgument { .. } => None,
        }
    }

    /// Identifier of the object that performed a failed lookup
    pub fn receiver(&self) -> Option<&str> {
        match self {
            Self::NotFound { receiver, .. } => receiver.as_deref(),
            _ => None,
        }
    }

    /// Check if the error is a cycle error
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::Cycle { .. })
    }

    /// Check if the error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if the error is a duplicate name error
    pub fn is_duplicate_name(&self) -> bool {
        matches!(self, Self::DuplicateName { .. })
    }

    /// Check if the error is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}
