//! # mixci-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the mixci workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and holds the hard-coded values the pipeline is built from.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
