//! Home Log Library
//!
//! Kitchen pantry ledger and personal race log, served over MCP.

pub mod build_info;
pub mod db;
pub mod generation;
pub mod mcp;
pub mod measure;
pub mod models;
pub mod pantry;
pub mod races;
pub mod tools;
