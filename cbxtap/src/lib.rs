//! cbxtap is a Singer-style tap extracting account and contact data from the
//! CBX1 REST API, deriving each stream's schema from the API's path-flattened
//! schema documents.

// Make sure all our public APIs have docs.
#![deny(missing_docs)]

mod error;
pub use error::Error;
pub use error::ErrorKind;
pub use error::Result;

pub mod auth;
pub mod catalog;
pub mod config;
pub mod singer;
pub mod state;
pub mod stream;
pub mod sync;
pub mod types;
