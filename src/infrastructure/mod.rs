//! Configuration, composition root and process lifecycle.

pub mod bootstrap;
pub mod config;
pub mod runtime;
