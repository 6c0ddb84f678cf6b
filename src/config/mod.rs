pub mod manager;
pub mod models;
pub mod profile_name;

use crate::error::Error;
use models::Profile;

/// Loads named profiles; the orchestrator's view of profile storage.
pub trait ProfileLoader {
    /// Loads the profile called `name`.
    ///
    /// # Errors
    ///
    /// Returns a profile error if the profile is missing or malformed.
    fn load_profile(&self, name: &str) -> Result<Profile, Error>;
}
