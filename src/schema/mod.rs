//! Type-to-JSON-Schema derivation
//!
//! This module describes Rust types to the remote model as JSON Schema, so the
//! model can produce well-typed call arguments for registered tools.
//!
//! A derivation walks the [`TypeDescriptor`] tree of a type exactly once per
//! distinct record, applies the `#[schema(...)]` constraint tags of every field
//! and validates `enum`/`example` literals against the inferred shape. It is
//! synchronous and keeps no state between calls.
//!
//! Nesting depth is bounded only by the stack: a type nested thousands of
//! levels deep without a cycle will exhaust it.
//!
//! # Example
//!
//! ```ignore
//! use assistant::schema::{schema_for, Describe};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Describe)]
//! struct Args {
//!     #[schema(minimum = 1, maximum = 10)]
//!     count: u32,
//! }
//!
//! let schema = schema_for::<Args>()?;
//! ```

mod binder;
mod descriptor;
mod document;
mod error;
mod impls;
mod literal;
mod settings;
mod walker;

use std::any::type_name;

use tracing::debug;

pub use assistant_macros::Describe;
pub use descriptor::{
    canonical_tag, Describe, FieldDescriptor, RecordDescriptor, TypeDescriptor, TypeRef,
    WellKnown, OMIT, TAGS,
};
pub use document::{AdditionalProperties, DataType, Schema};
pub use error::SchemaError;
pub use settings::{SchemaSettings, DRAFT_2020_12};
pub use walker::{DEFINITIONS_PREFIX, ROOT_REFERENCE};

use walker::Walker;

/// Derives schema documents according to a set of [`SchemaSettings`]
#[derive(Debug, Clone, Default)]
pub struct SchemaGenerator {
    settings: SchemaSettings,
}

impl SchemaGenerator {
    pub fn new(settings: SchemaSettings) -> Self {
        Self { settings }
    }

    /// Derive the schema document for `T`
    pub fn root_schema_for<T: Describe + ?Sized>(&self) -> Result<Schema, SchemaError> {
        let schema = self.root_schema_for_descriptor(T::describe());
        if let Ok(schema) = &schema {
            debug!(
                root = type_name::<T>(),
                definitions = schema.definitions.len(),
                "derived schema"
            );
        }
        schema
    }

    /// Derive the schema document for an explicitly built descriptor
    pub fn root_schema_for_descriptor(
        &self,
        descriptor: TypeDescriptor,
    ) -> Result<Schema, SchemaError> {
        let title = match descriptor.clone().resolve() {
            TypeDescriptor::Record(record) if self.settings.root_title => Some(record.name),
            _ => None,
        };

        let (mut schema, definitions) = Walker::default().derive(descriptor)?;
        schema.definitions = definitions;
        schema.meta_schema = self.settings.meta_schema.clone();
        if title.is_some() {
            schema.title = title;
        }

        Ok(schema)
    }
}

/// Derive the schema document for `T` with the default settings
pub fn schema_for<T: Describe + ?Sized>() -> Result<Schema, SchemaError> {
    SchemaGenerator::default().root_schema_for::<T>()
}
