// ABOUTME: Configuration management module for centralized server settings and parameters
// ABOUTME: Handles environment parsing, database/cache URLs, and auth/rate-limit knobs
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Configuration module for the Altus4 search service.
//!
//! All deployment-tunable settings are loaded once at startup via
//! [`ServerConfig::from_env`] and passed down by reference; nothing in this
//! module re-reads the environment after boot.

/// Environment variable parsing and the [`ServerConfig`] aggregate
pub mod environment;

pub use environment::{CacheUrl, DatabaseUrl, Environment, LogLevel, ServerConfig};
