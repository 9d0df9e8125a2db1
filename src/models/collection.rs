//! Collection and folder models.
//!
//! A [`Collection`] is the root of the normalized document: the ordered
//! top-level requests, the folder tree, and any structure definitions mined
//! from test scripts. It is built once per invocation and handed to the
//! caller by value; nothing in this crate retains a reference to it.

use serde::{Deserialize, Serialize};

use super::request::Request;
use super::structure::StructureDefinition;

/// The root normalized document produced by the collection builder.
///
/// Ordering is significant everywhere: `requests`, `folders`, and
/// `structures` all preserve source declaration order (the `order` array in
/// the v1 schema, array order in the v2.1 schema, discovery order for
/// structures).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection display name.
    pub name: String,

    /// Collection-level description, usually markdown.
    pub description: String,

    /// Requests declared at the top level of the collection, in order.
    pub requests: Vec<Request>,

    /// Folder tree, in declared order. Folders may nest (v2.1 schema).
    pub folders: Vec<Folder>,

    /// Structure definitions harvested from request test scripts, in
    /// discovery order. Empty when no test script registers any.
    pub structures: Vec<StructureDefinition>,
}

/// A named group of requests within a collection.
///
/// Folders form a tree: a folder never references a request or folder
/// outside its own subtree. The v1 schema references requests by ID from a
/// flat array; the v2.1 schema nests them directly. Both normalize here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    /// Folder identifier. Taken from the source document (v1) or freshly
    /// generated at parse time (v2.1 supplies none).
    pub id: String,

    /// Folder display name.
    pub name: String,

    /// Folder description, usually markdown.
    pub description: String,

    /// Requests belonging to this folder, in declared order.
    pub requests: Vec<Request>,

    /// Nested sub-folders, in declared order.
    pub folders: Vec<Folder>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_default_is_empty() {
        let col = Collection::default();
        assert!(col.requests.is_empty());
        assert!(col.folders.is_empty());
        assert!(col.structures.is_empty());
    }

    #[test]
    fn test_collection_serialization_round_trip() {
        let col = Collection {
            name: "Books API".to_string(),
            description: "A small API".to_string(),
            requests: Vec::new(),
            folders: vec![Folder {
                id: "f1".to_string(),
                name: "Authors".to_string(),
                description: String::new(),
                requests: Vec::new(),
                folders: Vec::new(),
            }],
            structures: Vec::new(),
        };

        let json = serde_json::to_string(&col).unwrap();
        let back: Collection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, col);
    }
}
