//! HIR layer tests
//!
//! - Target collection for attributes, blocks and implied bodies
//! - Properties of collection (idempotence, determinism, degradation)
//! - Origin/target matching across files

pub mod tests_matching;
pub mod tests_properties;
pub mod tests_scenarios;
