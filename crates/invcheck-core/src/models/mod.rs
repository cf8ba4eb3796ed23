//! Data models for invoice checking.

pub mod config;
pub mod report;
pub mod text;
