//! Command execution engine.

pub mod dispatcher;

pub use dispatcher::{CommandDispatcher, Inbound};
