//! Parley daemon library - exposes modules for testing.

pub mod composer;
pub mod config;
pub mod hosted;
pub mod ollama;
pub mod routes;
pub mod server;
pub mod tiers;
