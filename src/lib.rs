//! Postman collection normalization for documentation generators.
//!
//! This crate ingests collection export files from the Postman API client
//! — both the legacy v1 schema (flat, ID-referenced `order` arrays) and the
//! v2.1 schema (recursively nested `item` trees) — and produces one
//! canonical in-memory [`Collection`] model. On the way it substitutes
//! `{{variable}}` placeholders from an environment export, filters noise
//! headers through configurable deny-lists, and mines request test scripts
//! for embedded structure definitions by executing the delimited fragments
//! in a restricted script engine.
//!
//! # Architecture
//!
//! - **models**: the normalized document model (collections, folders,
//!   requests, responses, structure definitions)
//! - **builder**: the public entry point; orchestrates the pipeline
//! - **parser**: the format-detection registry and both wire-format parsers
//! - **variables**: byte-level environment variable substitution
//! - **environment**: environment export file loading
//! - **headers**: header deny-list filtering
//! - **script**: the restricted script engine fragments execute in
//! - **structures**: fragment mining and structure harvesting
//!
//! Data flows one direction: raw bytes → substituted bytes → parsed tree →
//! collection with structures attached. The pipeline is synchronous and
//! single-threaded; each build owns its own script engine, so no state
//! crosses build invocations.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use postdoc::builder::{BuilderOptions, CollectionBuilder};
//! use postdoc::environment::load_environment;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = BuilderOptions {
//!     ignored_request_headers: vec!["Authorization".to_string()],
//!     environment_variables: Some(load_environment(Path::new("env.json"))?),
//!     ..BuilderOptions::default()
//! };
//!
//! let collection = CollectionBuilder::new()
//!     .from_file(Path::new("collection.json"), &options)?;
//!
//! for request in &collection.requests {
//!     println!("{} {}", request.method, request.url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod environment;
pub mod headers;
pub mod models;
pub mod parser;
pub mod script;
pub mod structures;
pub mod variables;

pub use builder::{BuilderOptions, CollectionBuilder};
pub use models::{
    Collection, Folder, KeyValuePair, Request, Response, StructureDefinition,
    StructureFieldDefinition,
};
pub use parser::error::BuildError;
