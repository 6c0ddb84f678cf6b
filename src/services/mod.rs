//! Service modules: the units that contribute commands and dispatch targets.
//!
//! Each module owns a declarative [`ActionDefinition`] tree that the command
//! compiler turns into `exec` subcommands, and knows how to build a live
//! [`ServiceHandle`] once a profile has been authenticated.

pub mod directory;

use crate::action::ActionDefinition;
use crate::auth::Session;
use crate::config::models::Profile;
use crate::engine::locator::{locate, ServiceHandle};
use crate::error::Error;
use indexmap::IndexMap;

/// A pluggable service contributing one top-level `exec` command group.
pub trait ServiceModule: Send + Sync {
    /// The action tree compiled into commands at start-up.
    fn definition(&self) -> ActionDefinition;

    /// Builds a service handle for one invocation.
    ///
    /// # Errors
    ///
    /// Returns an error if the module cannot be used with the given sessions.
    fn connect(&self, profile: &Profile, sessions: &[Session]) -> Result<ServiceHandle, Error>;
}

/// Registered modules keyed by top-level action name.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: IndexMap<String, Box<dyn ServiceModule>>,
}

impl ModuleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module under its definition's name, replacing any earlier one.
    #[must_use]
    pub fn with_module(mut self, module: Box<dyn ServiceModule>) -> Self {
        let name = module.definition().name;
        self.modules.insert(name, module);
        self
    }

    /// Looks up a module by top-level action name.
    ///
    /// # Errors
    ///
    /// Returns a dispatch error if no module is registered under `name`.
    pub fn module_named(&self, name: &str) -> Result<&dyn ServiceModule, Error> {
        locate(&self.modules, name)
            .map(|module| &**module)
            .ok_or_else(|| Error::not_found("service", name))
    }

    /// Definitions of every module, in registration order.
    #[must_use]
    pub fn definitions(&self) -> Vec<ActionDefinition> {
        self.modules.values().map(|m| m.definition()).collect()
    }
}

/// Modules shipped with the binary.
#[must_use]
pub fn builtin_modules() -> ModuleRegistry {
    ModuleRegistry::new().with_module(Box::new(directory::DirectoryModule))
}
