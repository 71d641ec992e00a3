use crate::container::Name;

/// The names currently being produced along one fetch call path, outermost
/// first.
///
/// A chain is never mutated once built: nested fetches derive a new chain
/// with [`ProductionChain::extend`], so concurrent fetches never share state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductionChain {
    names: Vec<Name>,
}

impl ProductionChain {
    /// The chain of a top-level fetch
    pub fn empty() -> Self {
        Self::default()
    }

    /// A copy of this chain with `name` appended
    pub fn extend(&self, name: &Name) -> Self {
        let mut names = Vec::with_capacity(self.names.len() + 1);
        names.extend_from_slice(&self.names);
        names.push(name.clone());
        Self { names }
    }

    /// Check if the chain contains a name (for cycle detection)
    pub fn contains(&self, name: &Name) -> bool {
        self.names.contains(name)
    }

    pub fn names(&self) -> &[Name] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The chain rendered for error messages, e.g. `foo -> bar`
    pub fn path_string(&self) -> String {
        self.names
            .iter()
            .map(Name::as_str)
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// The path reported when `name` is requested again: the chain followed by
    /// the repeated name, e.g. `foo -> bar -> foo`.
    pub fn cycle_path(&self, name: &Name) -> String {
        self.extend(name).path_string()
    }
}
