//! Home Log Tools module
//!
//! MCP tool implementations for the pantry and the race log.

pub mod pantry;
pub mod races;
pub mod recipes;
pub mod status;
