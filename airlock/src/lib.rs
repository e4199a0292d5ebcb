//! Model airlock library.
//!
//! This crate provides a pre-upload gate for machine-learning model
//! artefacts. A manifest is parsed and checked for shape and numeric
//! constraints, the artefact's signature bytes are checked against its
//! extension, and only then may both be uploaded to an object store. It is
//! used by the `model-airlock` CLI binary and can be consumed
//! programmatically.
//!
//! # Modules
//!
//! - [`cli`] - Command-line argument definitions
//! - [`dirs`] - Directory resolution abstraction for platform-specific paths
//! - [`error`] - Airlock error type and error categories
//! - [`logic`] - Input tensor volume constraints
//! - [`manifest`] - Manifest model and schema validation
//! - [`output`] - Console and JSON output formatting
//! - [`pipeline`] - Fail-fast admission pipeline
//! - [`settings`] - TOML settings discovery and validation
//! - [`sniff`] - Binary signature checks per model format
//! - [`status`] - Process exit statuses
//! - [`transfer`] - Upload gateways for admitted artefacts

pub mod cli;
pub mod dirs;
pub mod error;
pub mod logic;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod settings;
pub mod sniff;
pub mod status;
pub mod transfer;
