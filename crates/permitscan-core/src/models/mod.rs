//! Data models for permit extraction and configuration.

pub mod config;
pub mod permit;
