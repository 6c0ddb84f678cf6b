//! Service handles and name-based operation lookup.
//!
//! A [`ServiceHandle`] is an explicit registry built by a service module
//! once per invocation: sub-service name -> [`SubService`], and within each
//! sub-service, operation name -> [`Operation`]. Lookup is an exact map hit
//! with a case-insensitive scan as fallback.

use crate::engine::resolver::decode_record;
use crate::engine::serializer::Outcome;
use crate::error::Error;
use crate::schema::ArgumentSchema;
use futures_util::future::BoxFuture;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// What a registered operation returns: a list of renderable outcomes, or
/// the error reported by the service.
pub type OperationResult = anyhow::Result<Vec<Outcome>>;

type HandlerResult = Result<BoxFuture<'static, OperationResult>, Error>;
type Handler = Arc<dyn Fn(Option<Map<String, Value>>) -> HandlerResult + Send + Sync>;

/// A callable operation on a sub-service.
#[derive(Clone)]
pub struct Operation {
    name: String,
    takes_args: bool,
    handler: Handler,
}

impl Operation {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn takes_args(&self) -> bool {
        self.takes_args
    }

    /// Starts the operation with zero or one resolved argument map.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if the map does not decode into the
    /// operation's argument record.
    pub fn call(
        &self,
        args: Option<Map<String, Value>>,
    ) -> HandlerResult {
        (self.handler)(args)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("takes_args", &self.takes_args)
            .finish_non_exhaustive()
    }
}

/// A group of operations reachable through one accessor on the service handle.
#[derive(Debug, Clone, Default)]
pub struct SubService {
    operations: IndexMap<String, Operation>,
}

impl SubService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an operation taking the argument record `A`.
    #[must_use]
    pub fn operation<A, F, Fut>(mut self, name: impl Into<String>, f: F) -> Self
    where
        A: ArgumentSchema,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OperationResult> + Send + 'static,
    {
        let name = name.into();
        let type_name = std::any::type_name::<A>();
        let handler: Handler = Arc::new(move |args: Option<Map<String, Value>>| -> HandlerResult {
            let record: A = match args {
                Some(map) => decode_record(type_name, map)?,
                None => A::default(),
            };
            let future: BoxFuture<'static, OperationResult> = Box::pin(f(record));
            Ok(future)
        });
        self.operations.insert(
            name.clone(),
            Operation {
                name,
                takes_args: true,
                handler,
            },
        );
        self
    }

    /// Registers an operation that takes no arguments.
    #[must_use]
    pub fn operation_without_args<F, Fut>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OperationResult> + Send + 'static,
    {
        let name = name.into();
        let handler: Handler = Arc::new(move |_args: Option<Map<String, Value>>| -> HandlerResult {
            let future: BoxFuture<'static, OperationResult> = Box::pin(f());
            Ok(future)
        });
        self.operations.insert(
            name.clone(),
            Operation {
                name,
                takes_args: false,
                handler,
            },
        );
        self
    }

    /// Operation names in registration order.
    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    /// Looks up an operation by name.
    ///
    /// # Errors
    ///
    /// Returns a dispatch error if no operation matches.
    pub fn operation_named(&self, name: &str) -> Result<&Operation, Error> {
        locate(&self.operations, name).ok_or_else(|| Error::not_found("operation", name))
    }
}

/// Live, authenticated handle for one service, built per invocation.
#[derive(Debug, Clone, Default)]
pub struct ServiceHandle {
    name: String,
    sub_services: IndexMap<String, SubService>,
}

impl ServiceHandle {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sub_services: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn sub_service(mut self, name: impl Into<String>, sub_service: SubService) -> Self {
        self.sub_services.insert(name.into(), sub_service);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sub-service names in registration order.
    pub fn sub_service_names(&self) -> impl Iterator<Item = &str> {
        self.sub_services.keys().map(String::as_str)
    }

    /// Looks up a sub-service accessor by name.
    ///
    /// # Errors
    ///
    /// Returns a dispatch error if no sub-service matches.
    pub fn sub_service_named(&self, name: &str) -> Result<&SubService, Error> {
        locate(&self.sub_services, name).ok_or_else(|| {
            Error::not_found("sub-service", &format!("{}.{name}", self.name))
        })
    }

    /// Resolves `sub_service.operation` in two lookups.
    ///
    /// # Errors
    ///
    /// Returns a dispatch error naming whichever lookup failed.
    pub fn locate_operation(&self, sub_service: &str, operation: &str) -> Result<&Operation, Error> {
        let sub = self.sub_service_named(sub_service)?;
        sub.operation_named(operation).map_err(|_| {
            Error::not_found("operation", &format!("{}.{sub_service}.{operation}", self.name))
        })
    }
}

/// Exact-name lookup, falling back to the first case-insensitive match in
/// registration order.
pub fn locate<'a, T>(entries: &'a IndexMap<String, T>, name: &str) -> Option<&'a T> {
    entries.get(name).or_else(|| {
        entries
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, entry)| entry)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> IndexMap<String, u8> {
        let mut map = IndexMap::new();
        map.insert("GetWidget".to_string(), 1);
        map.insert("GETWIDGET".to_string(), 2);
        map.insert("ListWidgets".to_string(), 3);
        map
    }

    #[test]
    fn test_exact_match_wins_over_case_variant() {
        assert_eq!(locate(&entries(), "GETWIDGET"), Some(&2));
        assert_eq!(locate(&entries(), "GetWidget"), Some(&1));
    }

    #[test]
    fn test_case_insensitive_fallback_takes_first_registered() {
        assert_eq!(locate(&entries(), "getwidget"), Some(&1));
        assert_eq!(locate(&entries(), "listwidgets"), Some(&3));
    }

    #[test]
    fn test_missing_name() {
        assert_eq!(locate(&entries(), "DeleteWidget"), None);
    }
}
