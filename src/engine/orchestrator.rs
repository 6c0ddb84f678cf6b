//! Per-invocation execution: profile -> authenticators -> service handle ->
//! invoke under retry.
//!
//! Only failures of the invoked operation are retried. Profile, credential,
//! connection and dispatch problems surface immediately because repeating
//! them would reproduce the same failure.

use crate::auth::{AuthenticatorProvider, Session};
use crate::config::models::Profile;
use crate::config::ProfileLoader;
use crate::engine::invoker;
use crate::error::Error;
use crate::invocation::{DispatchPath, ExecOptions, ExecSettings};
use crate::output::Reporter;
use crate::resilience::{execute_with_retry, RetryConfig};
use crate::services::ServiceModule;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

pub struct Orchestrator<'a, P: ProfileLoader, A: AuthenticatorProvider> {
    profiles: &'a P,
    authenticators: &'a A,
    settings: ExecSettings,
}

impl<'a, P: ProfileLoader, A: AuthenticatorProvider> Orchestrator<'a, P, A> {
    pub const fn new(profiles: &'a P, authenticators: &'a A, settings: ExecSettings) -> Self {
        Self {
            profiles,
            authenticators,
            settings,
        }
    }

    /// Runs one invocation and returns the rendered result.
    ///
    /// `args` is the resolved argument map, or `None` for operations
    /// without an argument schema.
    ///
    /// # Errors
    ///
    /// Returns a profile error, an authentication error when no authenticator
    /// holds a valid credential, any error from connecting the service
    /// module, a dispatch error when the operation is not registered, or the
    /// operation's own error once every retry attempt has failed.
    pub async fn execute(
        &self,
        module: &dyn ServiceModule,
        path: &DispatchPath,
        args: Option<&Map<String, Value>>,
        options: &ExecOptions,
        reporter: &dyn Reporter,
    ) -> Result<String, Error> {
        let profile_name = options
            .profile_name
            .as_deref()
            .unwrap_or(&self.settings.default_profile);
        let profile = self.profiles.load_profile(profile_name)?;

        let sessions = self.collect_sessions(&profile, options.refresh_auth, reporter)?;

        if let Some(output_path) = &options.output_path {
            debug!(
                target: "portico::orchestrator",
                "output path {} is not used by exec commands",
                output_path.display()
            );
        }

        let handle = module.connect(&profile, &sessions)?;
        let operation = handle.locate_operation(&path.sub_service, &path.operation)?;

        let retry = RetryConfig::new(options.retry_count, self.settings.retry_delay);
        let cancel = &self.settings.cancel;
        let target_name = format!("{}.{}", path.sub_service, path.operation);
        execute_with_retry(
            &retry,
            &target_name,
            |notice| reporter.notice(&notice.to_string()),
            move || invoker::invoke(operation, path, args, cancel),
        )
        .await
    }

    /// Collects sessions for every configured authenticator with a valid credential.
    ///
    /// # Errors
    ///
    /// Returns an authentication error when no authenticator is usable.
    pub fn collect_sessions(
        &self,
        profile: &Profile,
        refresh: bool,
        reporter: &dyn Reporter,
    ) -> Result<Vec<Session>, Error> {
        let mut sessions = Vec::new();
        let mut unusable = Vec::new();

        for (name, settings) in &profile.authenticators {
            let Some(authenticator) = self.authenticators.authenticator(name, settings) else {
                warn!(target: "portico::orchestrator", "unknown authenticator '{name}' in profile '{}'", profile.name);
                unusable.push(name.clone());
                continue;
            };
            if !authenticator.is_authenticated(profile) {
                debug!(target: "portico::orchestrator", "authenticator '{name}' has no credentials");
                unusable.push(name.clone());
                continue;
            }
            match authenticator.load_authentication(profile, refresh) {
                Ok(token) if !token.is_expired() => sessions.push(Session {
                    authenticator: authenticator.name().to_string(),
                    token,
                }),
                Ok(_) => {
                    debug!(target: "portico::orchestrator", "credentials for '{name}' have expired");
                    unusable.push(name.clone());
                }
                Err(err) => {
                    debug!(target: "portico::orchestrator", "could not load credentials for '{name}': {err}");
                    unusable.push(name.clone());
                }
            }
        }

        if sessions.is_empty() {
            return Err(Error::not_authenticated(&profile.name));
        }

        if !unusable.is_empty() && self.settings.interactive {
            reporter.warn(&format!(
                "not authenticated with {}; some operations may be unavailable",
                unusable.join(", ")
            ));
        }

        info!(
            target: "portico::orchestrator",
            "profile '{}' has {} valid authenticator(s)",
            profile.name,
            sessions.len()
        );
        Ok(sessions)
    }
}
