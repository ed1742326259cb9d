//! in_memory module provides the definition of the tap's semantic data types.
//!
//! A discovered resource schema is an ordered list of named properties, each
//! tagged with a semantic type. Semantic types are deliberately small: the
//! downstream replication pipeline only distinguishes strings, integers,
//! numbers, booleans, datetimes and lists thereof.

/// All semantic types are either primitives or lists of another semantic type.
#[derive(Debug, PartialEq, Clone, Eq)]
pub enum Any {
    /// A Primitive type.
    Primitive(Primitive),
    /// A List type.
    List(List),
}

/// Primitive types within a derived schema.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Primitive {
    /// Arbitrary-length character sequence. Also the safe fallback for any
    /// type the API declares that the tap does not recognize.
    String,
    /// Whole number.
    Integer,
    /// Floating point number.
    Number,
    /// True or False.
    Boolean,
    /// Timestamp, carried as an RFC 3339 string on the wire.
    ///
    /// The API never declares this type itself; it is assigned through the
    /// flattener's override table for well-known audit fields.
    DateTime,
}

impl From<Primitive> for Any {
    fn from(value: Primitive) -> Self {
        Any::Primitive(value)
    }
}

/// A List type.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct List {
    /// The semantic type of every element in the list.
    pub element_type: Box<Any>,
}

/// Returns true if `json_type` is one of the JSON Schema type names the
/// mapper recognizes.
///
/// Anything else still maps (to String); callers use this to count
/// occurrences of drifted or missing type declarations.
pub fn is_known_json_type(json_type: &str) -> bool {
    matches!(
        json_type,
        "string" | "integer" | "number" | "boolean" | "array"
    )
}

impl Any {
    /// Maps a primitive JSON Schema type name to its semantic type.
    ///
    /// Total: unknown names map to String so that schema discovery never
    /// fails on a type the API starts serving later. `"array"` maps to a
    /// list of strings; the declared item type is not inspected on this
    /// default path, element types are inferred by the flattener from the
    /// indexed path entries instead.
    pub fn from_json_type(json_type: &str) -> Self {
        match json_type {
            "integer" => Any::Primitive(Primitive::Integer),
            "number" => Any::Primitive(Primitive::Number),
            "boolean" => Any::Primitive(Primitive::Boolean),
            "array" => Any::List(List {
                element_type: Box::new(Any::Primitive(Primitive::String)),
            }),
            // "string", enums and everything unknown or absent.
            _ => Any::Primitive(Primitive::String),
        }
    }
}

/// A named property of a discovered resource schema.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Property {
    /// Flattened field name, unique within its list.
    pub name: String,
    /// Property can have any semantic type.
    pub field_type: Any,
}

impl Property {
    /// Creates a property.
    pub fn new(name: impl Into<String>, field_type: Any) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// An ordered list of properties describing one discovered resource.
///
/// Property names are unique: when the same name is produced twice, the
/// first occurrence wins and later ones are dropped. The list is immutable
/// once constructed; callers derive it fresh on every discovery cycle.
#[derive(Default, Debug, PartialEq, Clone, Eq)]
pub struct PropertiesList {
    properties: Vec<Property>,
}

impl PropertiesList {
    /// Builds a list from properties, keeping the first occurrence of every
    /// name.
    pub fn from_properties(properties: Vec<Property>) -> Self {
        let mut deduped: Vec<Property> = Vec::with_capacity(properties.len());
        for property in properties {
            if deduped.iter().all(|p| p.name != property.name) {
                deduped.push(property);
            }
        }
        Self {
            properties: deduped,
        }
    }

    /// Return the number of properties in the list.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Iterate properties in derivation order.
    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    /// Lookup a property by name.
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Property names in derivation order.
    pub fn names(&self) -> Vec<&str> {
        self.properties.iter().map(|p| p.name.as_str()).collect()
    }
}
