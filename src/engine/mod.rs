pub mod generator;
pub mod invoker;
pub mod locator;
pub mod orchestrator;
pub mod resolver;
pub mod serializer;
