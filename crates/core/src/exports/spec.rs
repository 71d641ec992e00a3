//! Export specifications: which registry entries a view exposes, under
//! which accessor names and at which visibility.
//!
//! Human-written specifications come in two shapes. A list of imports uses
//! the registry's default visibility:
//!
//! ```yaml
//! [foo, bar, { baz: quux }]
//! ```
//!
//! A map assigns visibilities explicitly. A single import may stand in for a
//! one-element list:
//!
//! ```yaml
//! private: foo
//! protected: [bar, baz]
//! public: { quux: four }
//! ```
//!
//! An import is either a dependency name (the accessor shares its name) or a
//! map of `dependency: accessor` aliases. Both shapes normalize into
//! [`NormalizedExports`].

use crate::container::Name;
use crate::errors::CoreError;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Visibility of a generated accessor
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Protected,
    Public,
}

impl Visibility {
    /// All visibilities, in the order accessors are defined
    pub const ALL: [Visibility; 3] = [Visibility::Private, Visibility::Protected, Visibility::Public];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Protected => "protected",
            Visibility::Public => "public",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Visibility::Private),
            "protected" => Ok(Visibility::Protected),
            "public" => Ok(Visibility::Public),
            _ => Err(CoreError::invalid_argument(format!(
                "invalid visibility: expected private, protected or public, got: {}",
                s
            ))),
        }
    }
}

/// One entry of an export list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Import {
    /// Export a dependency under its own name
    Name(Name),
    /// Export dependencies under other names, as `(dependency, accessor)`
    Aliases(Vec<(Name, Name)>),
}

impl Import {
    pub fn alias(dependency: impl Into<Name>, accessor: impl Into<Name>) -> Self {
        Import::Aliases(vec![(dependency.into(), accessor.into())])
    }

    fn pairs(&self) -> Vec<(Name, Name)> {
        match self {
            Import::Name(name) => vec![(name.clone(), name.clone())],
            Import::Aliases(aliases) => aliases.clone(),
        }
    }

    fn from_json(value: &JsonValue) -> Result<Self, CoreError> {
        match value {
            JsonValue::String(name) => Ok(Import::Name(Name::from(name.as_str()))),
            JsonValue::Object(aliases) => aliases
                .iter()
                .map(|(dependency, accessor)| match accessor {
                    JsonValue::String(accessor) => {
                        Ok((Name::from(dependency.as_str()), Name::from(accessor.as_str())))
                    }
                    other => Err(CoreError::invalid_argument(format!(
                        "invalid alias for '{}': expected a name, got: {}",
                        dependency,
                        json_type(other)
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Import::Aliases),
            other => Err(CoreError::invalid_argument(format!(
                "invalid import: expected a name or an alias map, got: {}",
                json_type(other)
            ))),
        }
    }
}

impl From<&str> for Import {
    fn from(name: &str) -> Self {
        Import::Name(Name::from(name))
    }
}

impl From<String> for Import {
    fn from(name: String) -> Self {
        Import::Name(Name::from(name))
    }
}

impl From<Name> for Import {
    fn from(name: Name) -> Self {
        Import::Name(name)
    }
}

impl From<(&str, &str)> for Import {
    fn from((dependency, accessor): (&str, &str)) -> Self {
        Import::alias(dependency, accessor)
    }
}

/// An export specification as written by a caller, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportSpec {
    /// Imports exported at the registry's default visibility
    List(Vec<Import>),
    /// Imports grouped by visibility. A `None` group takes the registry's
    /// default visibility.
    ByVisibility(Vec<(Option<Visibility>, Vec<Import>)>),
}

impl ExportSpec {
    pub fn list<I>(imports: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Import>,
    {
        ExportSpec::List(imports.into_iter().map(Into::into).collect())
    }

    /// An empty visibility map, to be filled with [`ExportSpec::with`]
    pub fn by_visibility() -> Self {
        ExportSpec::ByVisibility(Vec::new())
    }

    /// Add imports at `visibility`. A list specification is first turned
    /// into a map, its imports left at the registry's default visibility.
    pub fn with<I>(self, visibility: Visibility, imports: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Import>,
    {
        let imports: Vec<Import> = imports.into_iter().map(Into::into).collect();
        let mut groups = match self {
            ExportSpec::ByVisibility(groups) => groups,
            ExportSpec::List(list) => vec![(None, list)],
        };
        groups.push((Some(visibility), imports));
        ExportSpec::ByVisibility(groups)
    }

    /// Parse a specification from its JSON representation
    pub fn from_value(value: &JsonValue) -> Result<Self, CoreError> {
        match value {
            JsonValue::Array(items) => items
                .iter()
                .map(Import::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(ExportSpec::List),
            JsonValue::Object(groups) => groups
                .iter()
                .map(|(visibility, imports)| {
                    let visibility: Visibility = visibility.parse()?;
                    let imports = match imports {
                        JsonValue::Array(items) => items
                            .iter()
                            .map(Import::from_json)
                            .collect::<Result<Vec<_>, _>>()?,
                        JsonValue::Null => Vec::new(),
                        single => vec![Import::from_json(single)?],
                    };
                    Ok((Some(visibility), imports))
                })
                .collect::<Result<Vec<_>, CoreError>>()
                .map(ExportSpec::ByVisibility),
            other => Err(CoreError::invalid_argument(format!(
                "invalid export argument: expected array or hash, got: {}",
                json_type(other)
            ))),
        }
    }

    pub fn from_json_str(source: &str) -> Result<Self, CoreError> {
        let value: JsonValue = serde_json::from_str(source).map_err(|e| {
            CoreError::invalid_argument(format!("invalid export specification: {}", e))
        })?;
        Self::from_value(&value)
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, CoreError> {
        let value: JsonValue = serde_yaml::from_str(source).map_err(|e| {
            CoreError::invalid_argument(format!("invalid export specification: {}", e))
        })?;
        Self::from_value(&value)
    }

    /// Resolve into the canonical `visibility -> { dependency -> accessor }`
    /// form. `default` is the visibility used by list specifications.
    pub fn normalize(&self, default: Visibility) -> NormalizedExports {
        let mut normalized = NormalizedExports::empty();
        let groups: Vec<(Visibility, &[Import])> = match self {
            ExportSpec::List(imports) => vec![(default, imports.as_slice())],
            ExportSpec::ByVisibility(groups) => groups
                .iter()
                .map(|(visibility, imports)| {
                    (visibility.unwrap_or(default), imports.as_slice())
                })
                .collect(),
        };

        for (visibility, imports) in groups {
            let entries = normalized.groups.entry(visibility).or_default();
            for import in imports {
                entries.extend(import.pairs());
            }
        }

        normalized
    }
}

impl<T: Into<Import>> From<Vec<T>> for ExportSpec {
    fn from(imports: Vec<T>) -> Self {
        ExportSpec::list(imports)
    }
}

/// Canonical export specification: every visibility present, each mapping
/// dependency names to accessor names. Equal specifications normalize to
/// equal values, which is what views are cached by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedExports {
    groups: BTreeMap<Visibility, BTreeMap<Name, Name>>,
}

impl NormalizedExports {
    fn empty() -> Self {
        Self {
            groups: Visibility::ALL
                .iter()
                .map(|visibility| (*visibility, BTreeMap::new()))
                .collect(),
        }
    }

    /// `dependency -> accessor` pairs exported at `visibility`
    pub fn at(&self, visibility: Visibility) -> &BTreeMap<Name, Name> {
        // every visibility is inserted by `empty`
        &self.groups[&visibility]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Visibility, &Name, &Name)> {
        self.groups.iter().flat_map(|(visibility, entries)| {
            entries
                .iter()
                .map(move |(dependency, accessor)| (*visibility, dependency, accessor))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(BTreeMap::is_empty)
    }
}

fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
