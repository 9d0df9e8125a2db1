//! Collection builder: the public entry point of the crate.
//!
//! The builder strings the pipeline together: read the export file, apply
//! environment variable substitution to the raw bytes, let the parser
//! registry pick and run a wire-format parser, then mine the result for
//! structure definitions. Everything up to parsing is fail-fast; the
//! structure-mining step is best-effort and can only log, never fail the
//! build.

use std::fs;
use std::path::Path;

use crate::models::Collection;
use crate::parser::error::BuildError;
use crate::parser::ParserRegistry;
use crate::structures;
use crate::variables::{self, Environment};

/// Options controlling one build.
#[derive(Debug, Clone, Default)]
pub struct BuilderOptions {
    /// Request header names excluded from the normalized model.
    /// Case-sensitive exact matches.
    pub ignored_request_headers: Vec<String>,

    /// Response header names excluded from the normalized model.
    /// Case-sensitive exact matches.
    pub ignored_response_headers: Vec<String>,

    /// Environment variable substitution map. `None` means no environment
    /// file was given; both `None` and an empty map leave the file bytes
    /// unmodified.
    pub environment_variables: Option<Environment>,
}

/// Builds normalized collections from export files.
pub struct CollectionBuilder {
    registry: ParserRegistry,
}

impl CollectionBuilder {
    /// Creates a builder with the standard parser registry (v2.1 before
    /// the v1 fallback).
    pub fn new() -> Self {
        Self {
            registry: ParserRegistry::default(),
        }
    }

    /// Creates a builder with a caller-assembled registry. Registry order
    /// encodes format preference.
    pub fn with_registry(registry: ParserRegistry) -> Self {
        Self { registry }
    }

    /// Builds a collection from an export file on disk.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the collection export file
    /// * `options` - Header deny-lists and the substitution environment
    ///
    /// # Returns
    ///
    /// The normalized collection, or the first fatal error: the file was
    /// unreadable, no parser accepted the content, or the matched parser
    /// found the content structurally broken.
    pub fn from_file(&self, path: &Path, options: &BuilderOptions) -> Result<Collection, BuildError> {
        let contents = fs::read(path)?;
        self.from_slice(&contents, options)
    }

    /// Builds a collection from in-memory export bytes.
    ///
    /// Same pipeline as [`CollectionBuilder::from_file`] minus the read;
    /// useful when the caller already holds the document.
    pub fn from_slice(
        &self,
        contents: &[u8],
        options: &BuilderOptions,
    ) -> Result<Collection, BuildError> {
        let contents = match &options.environment_variables {
            Some(environment) => variables::substitute(contents, environment),
            None => contents.to_vec(),
        };

        let mut collection = self.registry.parse(&contents, options)?;
        structures::extract(&mut collection);
        Ok(collection)
    }
}

impl Default for CollectionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
