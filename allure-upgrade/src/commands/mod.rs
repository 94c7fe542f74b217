//! Command implementations

pub mod diff;
pub mod info;
pub mod patch;
pub mod plugin;
