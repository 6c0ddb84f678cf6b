//! Portico compiles declarative action definitions into a command tree and
//! dispatches each command to a registered service operation by name.
//!
//! Start-up: [`services`] modules contribute [`action::ActionDefinition`]
//! trees, which [`engine::generator`] compiles into clap commands.
//! Per invocation: [`engine::resolver`] merges defaults, the request file and
//! explicit flags, [`engine::orchestrator`] authenticates and builds a
//! service handle, and [`engine::invoker`] calls the located operation and
//! hands its outcomes to [`engine::serializer`].

pub mod action;
pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod fs;
pub mod invocation;
pub mod logging;
pub mod output;
pub mod resilience;
pub mod schema;
pub mod services;
pub mod utils;
