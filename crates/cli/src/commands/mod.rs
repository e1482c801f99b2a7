//! CLI command handlers

pub mod backup;
pub mod info;
pub mod lifecycle;
pub mod resources;
pub mod status;
