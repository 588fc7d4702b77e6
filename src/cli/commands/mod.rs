//! CLI command implementations

pub mod export;
pub mod status;
pub mod table;
pub mod validate;
