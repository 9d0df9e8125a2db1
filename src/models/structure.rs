//! Structure definition models.
//!
//! Structure definitions describe API response shapes. They are authored as
//! script fragments inside request test scripts and recovered by the
//! structure extractor; they never appear in the formal collection schema.

use serde::{Deserialize, Serialize};

/// A named data-structure description registered by a test-script fragment.
///
/// Absent optional attributes normalize to empty strings, never null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureDefinition {
    /// Structure name (e.g. "Dog").
    pub name: String,

    /// Human-readable description.
    pub description: String,

    /// Fields of the structure, in declared order.
    pub fields: Vec<StructureFieldDefinition>,
}

/// A single field of a [`StructureDefinition`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureFieldDefinition {
    /// Field name. Required: a registered field without one invalidates
    /// the whole structure it belongs to.
    pub name: String,

    /// Field description. Defaults to empty.
    pub description: String,

    /// Declared field type (free-form, e.g. "int"). Defaults to empty.
    #[serde(rename = "type")]
    pub field_type: String,
}
