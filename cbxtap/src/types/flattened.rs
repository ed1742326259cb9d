//! flattened module parses the path-flattened schema served by the API.
//!
//! The API describes a resource as a mapping from field paths to field
//! definitions, where nesting is encoded in the path string itself: `.`
//! separates object levels and a literal `[*]` marks an array segment
//! (`hqLocation.city`, `industries[*].name`). This module collapses those
//! paths into the flat, ordered [`PropertiesList`] the extraction pipeline
//! works with.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::in_memory::{is_known_json_type, Any, List, Primitive, PropertiesList, Property};

/// Marker the API puts on a path segment that is an array of the following
/// element type.
const ARRAY_MARKER: &str = "[*]";

/// Field names that are always typed as DateTime, whatever the source schema
/// declares for them. Matched against the final flattened name, not the raw
/// path.
static DATETIME_FIELDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from(["createdAt", "updatedAt", "dataUpdatedAt"]));

/// A single field definition from the flattened wire schema.
#[derive(Deserialize, Default, Debug)]
#[serde(default)]
pub struct FieldDef {
    #[serde(rename = "type")]
    typ: Option<String>,
    /// Allowed literal values. Inert in this version: accepted and carried
    /// for future validation, never constrains the mapped type.
    #[serde(rename = "enum")]
    enum_values: Option<Vec<Value>>,
}

impl FieldDef {
    /// Lenient read of a wire value: malformed definitions degrade to the
    /// default definition instead of failing discovery.
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    /// The declared JSON Schema type, if any.
    pub fn declared_type(&self) -> Option<&str> {
        self.typ.as_deref()
    }

    /// The declared enum values, if any.
    pub fn declared_enum(&self) -> Option<&[Value]> {
        self.enum_values.as_deref()
    }
}

/// Diagnostic counters accumulated while flattening one schema.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlattenReport {
    /// Number of field definitions whose declared type was missing or not a
    /// recognized JSON Schema type name; each was defaulted to String.
    pub unknown_types: usize,
}

/// Flattens the wire schema into an ordered property list.
///
/// Total over arbitrary input: malformed definitions default to String,
/// nothing in here fails. Output order is deterministic: scalar fields in
/// document order first, then array fields in the order their base names
/// were first observed.
pub fn flatten_schema(flattened: &Map<String, Value>) -> PropertiesList {
    flatten_schema_with_report(flattened).0
}

/// Flattens the wire schema, also returning diagnostic counters.
pub fn flatten_schema_with_report(
    flattened: &Map<String, Value>,
) -> (PropertiesList, FlattenReport) {
    let mut report = FlattenReport::default();
    let mut properties: Vec<Property> = Vec::with_capacity(flattened.len());

    // Pass 1: scalar and nested-object paths. Nested paths collapse to flat
    // names by joining levels with `_`; no object reconstruction is
    // attempted.
    for (path, raw_def) in flattened {
        if path.contains(ARRAY_MARKER) {
            continue;
        }

        let name = if path.contains('.') {
            path.replace('.', "_")
        } else {
            path.clone()
        };

        let field_type = if DATETIME_FIELDS.contains(name.as_str()) {
            Any::Primitive(Primitive::DateTime)
        } else {
            let def = FieldDef::from_value(raw_def);
            map_declared_type(def.declared_type(), &mut report)
        };

        properties.push(Property::new(name, field_type));
    }

    // Pass 2: array paths. The base name is everything before the first
    // marker; the first entry seen for a base name fixes the element type,
    // later entries for the same base are skipped. Structure behind the
    // marker is discarded.
    let mut array_fields: Vec<(String, Any)> = Vec::new();
    for (path, raw_def) in flattened {
        if !path.contains(ARRAY_MARKER) {
            continue;
        }

        let base_name = path.split(ARRAY_MARKER).next().unwrap_or_default();
        if array_fields.iter().any(|(name, _)| name == base_name) {
            continue;
        }

        let def = FieldDef::from_value(raw_def);
        let element_type = map_declared_type(def.declared_type(), &mut report);
        array_fields.push((
            base_name.to_string(),
            Any::List(List {
                element_type: Box::new(element_type),
            }),
        ));
    }

    // Merge: a scalar property from pass 1 keeps its name, the array variant
    // is dropped on collision.
    for (name, field_type) in array_fields {
        if properties.iter().all(|p| p.name != name) {
            properties.push(Property::new(name, field_type));
        }
    }

    (PropertiesList::from_properties(properties), report)
}

fn map_declared_type(declared: Option<&str>, report: &mut FlattenReport) -> Any {
    match declared {
        Some(json_type) if is_known_json_type(json_type) => Any::from_json_type(json_type),
        Some(json_type) => {
            report.unknown_types += 1;
            Any::from_json_type(json_type)
        }
        None => {
            report.unknown_types += 1;
            Any::from_json_type("string")
        }
    }
}
