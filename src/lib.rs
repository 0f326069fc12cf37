// Lets generated code name this crate as `::assistant` from inside it too
extern crate self as assistant;

// Type-to-JSON-Schema derivation
pub mod schema;

// Tool declarations and execution
pub mod tools;

pub use assistant_macros::tool;
pub use schema::{schema_for, Describe, Schema, SchemaError, SchemaGenerator, SchemaSettings};
