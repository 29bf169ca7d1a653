//! Attribute schema snapshots and comparison.
//!
//! The index keeps every record's source layer on one attribute schema
//! unless the operator accepts differing schemas. The schema of the
//! first accepted layer (or of the source behind the first pre-existing
//! record) is captured as an owned [`SchemaSnapshot`] and later layers
//! are compared against it field by field.

use gdal::vector::{Defn, OGRFieldType};

/// Definition of a single attribute field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    /// Field name, compared case-insensitively.
    pub name: String,
    /// OGR field type code.
    pub field_type: OGRFieldType::Type,
    /// Declared field width.
    pub width: i32,
    /// Declared field precision.
    pub precision: i32,
}

impl FieldSchema {
    fn matches(&self, other: &FieldSchema) -> bool {
        self.field_type == other.field_type
            && self.width == other.width
            && self.precision == other.precision
            && self.name.eq_ignore_ascii_case(&other.name)
    }
}

/// First difference found between two schemas.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaMismatch {
    /// The layers declare a different number of fields.
    FieldCount {
        /// Field count of the established schema.
        expected: usize,
        /// Field count of the candidate layer.
        found: usize,
    },
    /// A field's type, width, precision, or name differs.
    Field {
        /// Name of the differing field in the established schema.
        name: String,
    },
}

/// Owned copy of a layer's attribute schema.
#[derive(Debug, Clone)]
pub struct SchemaSnapshot {
    fields: Vec<FieldSchema>,
}

impl SchemaSnapshot {
    /// Capture the schema of a layer definition.
    pub fn from_defn(defn: &Defn) -> Self {
        let fields = defn
            .fields()
            .map(|field| FieldSchema {
                name: field.name(),
                field_type: field.field_type(),
                width: field.width(),
                precision: field.precision(),
            })
            .collect();
        Self { fields }
    }

    /// Compare against another snapshot, returning the first mismatch.
    ///
    /// The field count is checked first; equal-length schemas are then
    /// compared positionally on type, width, precision, and name.
    pub fn diff(&self, other: &SchemaSnapshot) -> Option<SchemaMismatch> {
        if self.fields.len() != other.fields.len() {
            return Some(SchemaMismatch::FieldCount {
                expected: self.fields.len(),
                found: other.fields.len(),
            });
        }
        for (mine, theirs) in self.fields.iter().zip(&other.fields) {
            if !mine.matches(theirs) {
                return Some(SchemaMismatch::Field {
                    name: mine.name.clone(),
                });
            }
        }
        None
    }
}
