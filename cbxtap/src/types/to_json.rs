//! to_json module converts between the in-memory property list and the JSON
//! Schema document emitted on the output stream.
//!
//! The emitted document is a plain object schema: every property carries a
//! single `type` string, DateTime is expressed as a string with the
//! `date-time` format, arrays carry an `items` definition.

use serde_json::{json, Map, Value};

use super::in_memory::{Any, List, Primitive, PropertiesList, Property};
use crate::error::{Error, ErrorKind, Result};

/// Builds the JSON Schema document for an ordered property list.
///
/// Property order in the document follows the list order.
pub fn to_json_schema(properties: &PropertiesList) -> Value {
    let mut map = Map::with_capacity(properties.len());
    for property in properties.iter() {
        map.insert(property.name.clone(), type_to_json(&property.field_type));
    }

    json!({
        "type": "object",
        "properties": map,
    })
}

/// Parses a JSON Schema document produced by [`to_json_schema`] back into a
/// property list.
pub fn parse_json_schema(schema: &Value) -> Result<PropertiesList> {
    let properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            Error::new(
                ErrorKind::SchemaInvalid,
                "schema document has no properties map",
            )
        })?;

    let mut parsed = Vec::with_capacity(properties.len());
    for (name, def) in properties {
        let field_type = type_from_json(def).map_err(|err| err.with_context("property", name))?;
        parsed.push(Property::new(name.clone(), field_type));
    }

    Ok(PropertiesList::from_properties(parsed))
}

fn type_to_json(field_type: &Any) -> Value {
    match field_type {
        Any::Primitive(Primitive::String) => json!({ "type": "string" }),
        Any::Primitive(Primitive::Integer) => json!({ "type": "integer" }),
        Any::Primitive(Primitive::Number) => json!({ "type": "number" }),
        Any::Primitive(Primitive::Boolean) => json!({ "type": "boolean" }),
        Any::Primitive(Primitive::DateTime) => json!({
            "type": "string",
            "format": "date-time",
        }),
        Any::List(list) => json!({
            "type": "array",
            "items": type_to_json(&list.element_type),
        }),
    }
}

fn type_from_json(def: &Value) -> Result<Any> {
    let json_type = def.get("type").and_then(Value::as_str).ok_or_else(|| {
        Error::new(ErrorKind::SchemaInvalid, "field definition has no type")
    })?;

    match json_type {
        "string" => {
            if def.get("format").and_then(Value::as_str) == Some("date-time") {
                Ok(Any::Primitive(Primitive::DateTime))
            } else {
                Ok(Any::Primitive(Primitive::String))
            }
        }
        "integer" => Ok(Any::Primitive(Primitive::Integer)),
        "number" => Ok(Any::Primitive(Primitive::Number)),
        "boolean" => Ok(Any::Primitive(Primitive::Boolean)),
        "array" => {
            let items = def.get("items").ok_or_else(|| {
                Error::new(
                    ErrorKind::SchemaInvalid,
                    "array field definition has no items",
                )
            })?;
            Ok(Any::List(List {
                element_type: Box::new(type_from_json(items)?),
            }))
        }
        v => Err(
            Error::new(ErrorKind::SchemaInvalid, "unsupported type in field definition")
                .with_context("type", v),
        ),
    }
}
