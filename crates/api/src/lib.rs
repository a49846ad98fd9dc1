//! Slotkeeper bot service library.
//!
//! Exposes the building blocks (config, state, command dispatch, update
//! polling, HTTP routes) so integration tests and the binary entrypoint can
//! both access them.

pub mod background;
pub mod config;
pub mod engine;
pub mod error;
pub mod routes;
pub mod state;
