//! Data models for identity scanning.

pub mod config;
pub mod record;
pub mod region;
