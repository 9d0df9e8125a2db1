//! Collection wire-format parsers and the format-detection registry.
//!
//! Two incompatible schema generations are supported: the legacy v1 export
//! (a flat request array referenced by ID from `order` arrays, implemented
//! in [`v1`]) and the v2.1 export (a recursive `item` tree, implemented in
//! [`v21`]). Each parser self-declares whether it can consume a byte
//! buffer; the registry probes them in order and the first acceptor wins.

pub mod error;
pub mod v1;
pub mod v21;

use serde::Deserialize;

use crate::builder::BuilderOptions;
use crate::models::Collection;
use error::BuildError;

pub use v1::CollectionV1Parser;
pub use v21::CollectionV21Parser;

/// A parser for one collection wire format.
pub trait CollectionParser {
    /// Probes whether this parser can consume the given content.
    ///
    /// Probes are expected to be cheap and conservative; a `true` answer
    /// commits the registry to this parser, so structural errors found
    /// later surface as [`BuildError`]s rather than falling through to the
    /// next parser.
    fn can_parse(&self, contents: &[u8]) -> bool;

    /// Parses the content into a normalized [`Collection`].
    fn parse(&self, contents: &[u8], options: &BuilderOptions) -> Result<Collection, BuildError>;
}

/// An ordered list of parsers probed until the first acceptor.
///
/// Registry order encodes preference: the v2.1 parser performs a real
/// schema sniff, while the v1 parser keeps its historical accept-anything
/// probe and therefore belongs last.
pub struct ParserRegistry {
    parsers: Vec<Box<dyn CollectionParser>>,
}

impl ParserRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Registers a parser at the end of the probe order.
    pub fn register(&mut self, parser: Box<dyn CollectionParser>) {
        self.parsers.push(parser);
    }

    /// Returns the number of registered parsers.
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    /// Returns whether the registry has no parsers.
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Parses content with the first parser whose probe accepts it.
    ///
    /// # Returns
    ///
    /// The parsed collection, [`BuildError::NoParserMatched`] when every
    /// probe declines, or the matched parser's structural error.
    pub fn parse(
        &self,
        contents: &[u8],
        options: &BuilderOptions,
    ) -> Result<Collection, BuildError> {
        for parser in &self.parsers {
            if parser.can_parse(contents) {
                return parser.parse(contents, options);
            }
        }
        Err(BuildError::NoParserMatched)
    }
}

impl Default for ParserRegistry {
    /// The standard registry: v2.1 (schema-sniffing probe) before v1
    /// (accept-anything fallback).
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(CollectionV21Parser));
        registry.register(Box::new(CollectionV1Parser));
        registry
    }
}

/// The slice of a collection document the v2.1 probe inspects.
#[derive(Debug, Deserialize)]
struct ProbeDocument {
    #[serde(default)]
    info: Option<ProbeInfo>,
    #[serde(default)]
    item: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ProbeInfo {
    #[serde(default)]
    schema: Option<String>,
}

/// Returns whether the content looks like a v2.x export: an `info.schema`
/// URL mentioning a v2 collection schema, or a top-level `item` array.
pub(crate) fn looks_like_v2(contents: &[u8]) -> bool {
    let Ok(probe) = serde_json::from_slice::<ProbeDocument>(contents) else {
        return false;
    };

    if let Some(schema) = probe.info.and_then(|info| info.schema) {
        if schema.contains("/collection/v2") {
            return true;
        }
    }

    matches!(probe.item, Some(serde_json::Value::Array(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_v2_by_schema_url() {
        let contents = br#"{
            "info": {
                "name": "x",
                "schema": "https://schema.getpostman.com/json/collection/v2.1.0/collection.json"
            }
        }"#;
        assert!(looks_like_v2(contents));
    }

    #[test]
    fn test_looks_like_v2_by_item_array() {
        assert!(looks_like_v2(br#"{"item": []}"#));
    }

    #[test]
    fn test_v1_document_is_not_v2() {
        let contents = br#"{"name": "x", "order": [], "requests": []}"#;
        assert!(!looks_like_v2(contents));
    }

    #[test]
    fn test_invalid_json_is_not_v2() {
        assert!(!looks_like_v2(b"not json"));
    }

    #[test]
    fn test_empty_registry_matches_nothing() {
        let registry = ParserRegistry::new();
        let result = registry.parse(br#"{"name": "x"}"#, &BuilderOptions::default());
        assert!(matches!(result, Err(BuildError::NoParserMatched)));
    }

    #[test]
    fn test_default_registry_dispatches_v1() {
        let contents = br#"{"name": "legacy", "order": [], "requests": [], "folders": []}"#;
        let collection = ParserRegistry::default()
            .parse(contents, &BuilderOptions::default())
            .unwrap();
        assert_eq!(collection.name, "legacy");
    }

    #[test]
    fn test_default_registry_dispatches_v21() {
        let contents = br#"{"info": {"name": "modern", "description": ""}, "item": []}"#;
        let collection = ParserRegistry::default()
            .parse(contents, &BuilderOptions::default())
            .unwrap();
        assert_eq!(collection.name, "modern");
    }
}
