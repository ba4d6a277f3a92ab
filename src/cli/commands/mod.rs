//! CLI command implementations

pub mod alerts;
pub mod completions;
pub mod config;
pub mod dashboard;
pub mod export;
pub mod init;
pub mod lang;
pub mod notify;
pub mod phase;
pub mod project;
pub mod report;
pub mod resource;
