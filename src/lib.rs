//! MPT: Municipal Project Tracker
//!
//! A bilingual (Arabic/English) dashboard for municipal development
//! projects. All data lives in an in-memory SQLite database that is
//! snapshotted, base64-encoded, into a workspace key-value file after
//! every change.

pub mod cli;
pub mod core;
pub mod entities;
