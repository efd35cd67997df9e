// Library crate for integration tests.
// main.rs has its own mod declarations; this re-exports all modules.

pub mod config;
pub mod decoder;
pub mod envelope;
pub mod error;
pub mod poller;
pub mod report;
pub mod transport;
