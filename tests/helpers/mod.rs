//! Shared fixtures and setup helpers for integration tests.

pub mod decoder_helpers;
pub mod schema_fixtures;
