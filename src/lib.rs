// Main library entry point for jast.
// JavaScript AST ingestion and syntactic feature extraction.

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

pub use error::{JastError, Result};
