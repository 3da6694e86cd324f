//! services/api/src/lib.rs
//!
//! The library root of the `api` service, shared by the `api` and `openapi`
//! binaries.

pub mod adapters;
pub mod config;
pub mod error;
pub mod ingest;
pub mod web;
