//! Structure-definition mining from request test scripts.
//!
//! Collection authors document API response shapes by embedding small
//! script fragments in request test scripts, delimited by marker comments:
//!
//! ```text
//! /*[[start postdoc]]*/
//! APIStructures['dog'] = {
//!     name: 'Dog',
//!     description: 'A greater animal',
//!     fields: [
//!         {name: 'id', description: 'A unique identifier', type: 'int'}
//!     ]
//! };
//! /*[[end postdoc]]*/
//! ```
//!
//! The extractor walks the built collection, collects every fragment in
//! encounter order, executes them sequentially in one script engine, and
//! harvests the `APIStructures` global into [`StructureDefinition`]s.
//! This whole layer is best-effort: a failing fragment or an invalid
//! registration costs only itself, never the build.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::{Collection, Folder, Request, StructureDefinition, StructureFieldDefinition};
use crate::script::Engine;

/// Marker opening a structure-registration fragment.
const START_TAG: &str = "/*[[start postdoc]]*/";

/// Marker closing a structure-registration fragment.
const END_TAG: &str = "/*[[end postdoc]]*/";

/// Name of the global container fragments register structures into.
const GLOBAL_CONTAINER: &str = "APIStructures";

/// Fixed epilogue appended after every fragment body. Invokes the
/// registration hook when the global scope holds one; the scope is shared
/// across fragments, so a hook declared earlier still fires here.
const EPILOGUE: &str = "\
if (typeof populateNewAPIStructures === 'function') {
    populateNewAPIStructures();
}";

/// Matches either marker; used only to test whether scanning should
/// continue.
static MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/\*\[\[(start|end) postdoc\]\]\*/").expect("marker regex must compile")
});

/// Validation failures for one harvested container entry.
#[derive(Debug, PartialEq, Eq)]
pub enum StructureError {
    /// The registered value is not an object.
    NotAnObject,
    /// The object has no string `name` attribute.
    MissingName,
    /// The object has no string `description` attribute.
    MissingDescription,
    /// The `fields` attribute is absent or not an array of objects.
    InvalidFields,
    /// A field object has no string `name` attribute. Invalidates the
    /// whole structure, not just the field.
    FieldMissingName,
}

impl std::fmt::Display for StructureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StructureError::NotAnObject => write!(f, "value is not an object"),
            StructureError::MissingName => write!(f, "structures must have a name"),
            StructureError::MissingDescription => {
                write!(f, "structures must have a description")
            }
            StructureError::InvalidFields => {
                write!(f, "fields attribute must be an array of objects")
            }
            StructureError::FieldMissingName => {
                write!(f, "structure fields must have a name")
            }
        }
    }
}

impl std::error::Error for StructureError {}

/// Mines the collection's test scripts and fills `collection.structures`.
///
/// Fragments execute in encounter order: top-level requests first, then
/// folders depth-first, a folder's requests before its sub-folders. One
/// engine serves the whole pass; nothing of it survives the call.
/// Failures inside the pass are logged and swallowed.
pub fn extract(collection: &mut Collection) {
    let fragments = collect_fragments(collection);

    let mut engine = Engine::new();
    engine.set_global(GLOBAL_CONTAINER, Value::Object(serde_json::Map::new()));

    for fragment in &fragments {
        let source = format!("{}\n{}", fragment, EPILOGUE);
        if let Err(err) = engine.run(&source) {
            log::debug!("structure fragment skipped: {}", err);
        }
    }

    let mut structures = Vec::new();
    if let Some(Value::Object(container)) = engine.global(GLOBAL_CONTAINER) {
        for (key, value) in container {
            match structure_from_value(value) {
                Ok(structure) => structures.push(structure),
                Err(err) => log::warn!("structure '{}' dropped: {}", key, err),
            }
        }
    }

    collection.structures = structures;
}

/// Collects every marker-delimited fragment in the collection, in
/// traversal order.
fn collect_fragments(collection: &Collection) -> Vec<String> {
    let mut fragments = Vec::new();
    for request in &collection.requests {
        collect_from_request(request, &mut fragments);
    }
    for folder in &collection.folders {
        collect_from_folder(folder, &mut fragments);
    }
    fragments
}

fn collect_from_folder(folder: &Folder, fragments: &mut Vec<String>) {
    for request in &folder.requests {
        collect_from_request(request, fragments);
    }
    for child in &folder.folders {
        collect_from_folder(child, fragments);
    }
}

fn collect_from_request(request: &Request, fragments: &mut Vec<String>) {
    fragments.extend(extract_code_fragments(&request.tests));
}

/// Scans test-script text for marker pairs, left to right, non-overlapping.
///
/// Fragments are trimmed of leading and trailing newlines. Text outside
/// marker pairs is ignored entirely.
pub fn extract_code_fragments(input: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut rest = input.to_string();
    while MARKER_REGEX.is_match(&rest) {
        let (fragment, remaining) = next_code_fragment(&rest);
        fragments.push(fragment);
        rest = remaining;
    }
    fragments
}

/// Splits off the first fragment: everything between the first start tag
/// and the next end tag. Returns the fragment and the unscanned remainder.
fn next_code_fragment(input: &str) -> (String, String) {
    let parts: Vec<&str> = input.split(START_TAG).collect();
    let after_start = parts[1..].join(START_TAG);

    let parts: Vec<&str> = after_start.split(END_TAG).collect();
    let fragment = parts[0].trim_matches('\n').to_string();
    let remainder = parts[1..].join(END_TAG);
    (fragment, remainder)
}

/// Converts one harvested container entry into a structure definition.
///
/// Validation is asymmetric on purpose: a structure missing optional
/// attributes normalizes them to empty strings, but a single field without
/// a name invalidates the entire structure.
fn structure_from_value(value: &Value) -> Result<StructureDefinition, StructureError> {
    let object = value.as_object().ok_or(StructureError::NotAnObject)?;

    let name = object
        .get("name")
        .and_then(Value::as_str)
        .ok_or(StructureError::MissingName)?;
    let description = object
        .get("description")
        .and_then(Value::as_str)
        .ok_or(StructureError::MissingDescription)?;
    let fields_value = object
        .get("fields")
        .and_then(Value::as_array)
        .ok_or(StructureError::InvalidFields)?;

    let mut fields = Vec::with_capacity(fields_value.len());
    for field_value in fields_value {
        let field_object = field_value
            .as_object()
            .ok_or(StructureError::InvalidFields)?;
        let field_name = field_object
            .get("name")
            .and_then(Value::as_str)
            .ok_or(StructureError::FieldMissingName)?;

        fields.push(StructureFieldDefinition {
            name: field_name.to_string(),
            description: field_object
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            field_type: field_object
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        });
    }

    Ok(StructureDefinition {
        name: name.to_string(),
        description: description.to_string(),
        fields,
    })
}
