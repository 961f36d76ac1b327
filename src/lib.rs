//! Receives AWS Health events and decodes their `detail` payload into typed
//! values for the notification pipeline.

#[macro_use]
extern crate log;

pub mod config;
pub mod envelope;
pub mod error;
pub mod healthevent;
pub mod receiver;
