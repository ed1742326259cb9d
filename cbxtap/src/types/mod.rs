//! Types module provides the definition of derived schema types and functions
//! to build them from the API's flattened wire format.

mod in_memory;
pub use in_memory::*;

mod flattened;
pub use flattened::*;

mod to_json;
pub use to_json::*;

mod conform;
pub use conform::*;
