//! Component integration tests

pub mod resolver;
pub mod verification;
