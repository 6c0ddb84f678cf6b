//! Declarative action definitions owned by each service module.
//!
//! An [`ActionDefinition`] describes one command group: its name, aliases,
//! help text, the operations it exposes (schema map) and nested groups.
//! Definitions are built once at start-up and never mutated afterwards.

use crate::schema::{ArgumentSchema, SchemaRef};
use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct ActionDefinition {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub version: String,
    /// Operation name -> argument schema (`None` for operations without arguments).
    pub schemas: IndexMap<String, Option<SchemaRef>>,
    pub children: Vec<ActionDefinition>,
}

impl ActionDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Declares an operation taking the argument record `T`.
    #[must_use]
    pub fn operation<T: ArgumentSchema>(mut self, name: impl Into<String>) -> Self {
        self.schemas.insert(name.into(), Some(SchemaRef::of::<T>()));
        self
    }

    /// Declares an operation that takes no arguments.
    #[must_use]
    pub fn operation_without_args(mut self, name: impl Into<String>) -> Self {
        self.schemas.insert(name.into(), None);
        self
    }

    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Total number of operations in this definition and all nested ones.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.schemas.len()
            + self
                .children
                .iter()
                .map(Self::operation_count)
                .sum::<usize>()
    }
}
