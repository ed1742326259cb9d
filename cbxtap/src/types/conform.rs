//! conform module casts raw API records to the shape a derived schema
//! declares.

use serde_json::{Map, Value};

use super::in_memory::{Any, Primitive, PropertiesList};

/// Casts a raw record against the declared properties.
///
/// Undeclared fields are dropped, missing declared fields are omitted rather
/// than nulled, and the output follows the declared property order. A value
/// that cannot be cast to its declared type passes through unchanged;
/// downstream consumers decide how strict to be about those.
pub fn conform_record(
    properties: &PropertiesList,
    record: &Map<String, Value>,
) -> Map<String, Value> {
    let mut conformed = Map::with_capacity(properties.len());
    for property in properties.iter() {
        if let Some(value) = record.get(&property.name) {
            conformed.insert(
                property.name.clone(),
                conform_value(&property.field_type, value),
            );
        }
    }
    conformed
}

fn conform_value(field_type: &Any, value: &Value) -> Value {
    if value.is_null() {
        return Value::Null;
    }

    match field_type {
        Any::Primitive(Primitive::Integer) => conform_integer(value),
        Any::Primitive(Primitive::Number) => conform_number(value),
        Any::Primitive(Primitive::Boolean) => conform_boolean(value),
        Any::Primitive(Primitive::String) | Any::Primitive(Primitive::DateTime) => {
            conform_string(value)
        }
        // Arrays pass through as-is, elements are not cast.
        Any::List(_) => value.clone(),
    }
}

fn conform_integer(value: &Value) -> Value {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Value::from(i),
            None => value.clone(),
        },
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(i) => Value::from(i),
            Err(_) => value.clone(),
        },
        _ => value.clone(),
    }
}

fn conform_number(value: &Value) -> Value {
    match value {
        Value::Number(_) => value.clone(),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or_else(|| value.clone()),
            Err(_) => value.clone(),
        },
        _ => value.clone(),
    }
}

fn conform_boolean(value: &Value) -> Value {
    match value {
        Value::Bool(_) => value.clone(),
        Value::String(s) => match s.trim() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}

fn conform_string(value: &Value) -> Value {
    match value {
        Value::String(_) => value.clone(),
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        // Structured values are not stringified.
        _ => value.clone(),
    }
}
