//! allure-upgrade library
//!
//! Command implementations behind the `allure-upgrade` binary.

pub mod cli;
pub mod commands;
pub mod utils;
