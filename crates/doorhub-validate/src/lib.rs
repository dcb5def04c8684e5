//! Genuineness check for decrypted telemetry records.
//!
//! The cipher carries no authentication tag, so the only thing separating a
//! genuine plaintext from a wrong-key or corrupted decryption is a 16-bit
//! marker field. Roughly one garbage record in 65536 will pass. That weakness
//! is part of the sensor protocol and is kept as-is.

pub mod config;
pub mod validator;

pub use config::{ValidatorConfig, DEFAULT_EXPECTED_TAG};
pub use validator::{Classification, Validator};
