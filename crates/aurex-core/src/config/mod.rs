//! Configuration management for aurex.
//!
//! Explorer preferences ([`settings::Config`]) are stored as a TOML file
//! and loaded at startup.

pub mod settings;
