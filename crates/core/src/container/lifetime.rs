/// How a registered dependency's value is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifetime {
    /// Fresh value on every fetch
    Factory,
    /// Value produced on first fetch and cached
    Singleton,
}

impl Lifetime {
    pub fn is_factory(&self) -> bool {
        matches!(self, Lifetime::Factory)
    }

    pub fn is_singleton(&self) -> bool {
        matches!(self, Lifetime::Singleton)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Lifetime::Factory => "factory",
            Lifetime::Singleton => "singleton",
        }
    }
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Lifetime {
    type Err = crate::errors::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "factory" | "on" => Ok(Lifetime::Factory),
            "singleton" | "once" => Ok(Lifetime::Singleton),
            _ => Err(crate::errors::CoreError::invalid_argument(format!(
                "invalid lifetime: expected factory or singleton, got: {}",
                s
            ))),
        }
    }
}
