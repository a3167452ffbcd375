// ABOUTME: Cryptography module providing secure encryption and hashing primitives
// ABOUTME: Centralizes all cryptographic operations for the Altus4 search service
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Cryptographic utilities for Altus4.

/// `AES-256-GCM` encryption at rest for tenant database credentials
pub mod encryption;
/// `API` key and password hashing
pub mod hashing;

pub use encryption::{decrypt_secret, encrypt_secret};
pub use hashing::{hash_api_key, hash_password, verify_password};
