//! Type walker
//!
//! Turns a [`TypeDescriptor`] tree into a [`Schema`]. Named records are
//! registered in a per-call [`Definitions`] table *before* their fields are
//! walked, so a record that reaches itself (directly or through other records)
//! resolves to a `$ref` instead of recursing forever.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::Number;
use tracing::trace;

use super::binder;
use super::descriptor::{RecordDescriptor, TypeDescriptor, TypeRef, WellKnown};
use super::document::{AdditionalProperties, DataType, Schema};
use super::error::SchemaError;

/// Reference used for the root record
pub const ROOT_REFERENCE: &str = "#";

/// Prefix of references into the definitions table
pub const DEFINITIONS_PREFIX: &str = "#/$defs/";

struct Definition {
    name: String,
    reference: String,
    /// `None` while the record is still being walked, and for the root
    schema: Option<Schema>,
}

/// Per-call table of named record schemas
#[derive(Default)]
pub(crate) struct Definitions {
    by_identity: HashMap<&'static str, Definition>,
    by_reference: HashMap<String, &'static str>,
    names: HashSet<String>,
}

impl Definitions {
    /// Reference of an already registered record
    fn reference_of(&self, identity: &str) -> Option<&str> {
        self.by_identity
            .get(identity)
            .map(|definition| definition.reference.as_str())
    }

    /// Register `record` and return the reference that addresses it
    fn register(&mut self, record: &RecordDescriptor, root: bool) -> String {
        let (name, reference) = if root {
            (String::new(), ROOT_REFERENCE.to_string())
        } else {
            let name = self.unique_name(record.identity);
            let reference = format!("{DEFINITIONS_PREFIX}{name}");
            (name, reference)
        };

        trace!(record = record.identity, reference = %reference, "registered record");
        self.names.insert(name.clone());
        self.by_reference
            .insert(reference.clone(), record.identity);
        self.by_identity.insert(
            record.identity,
            Definition {
                name,
                reference: reference.clone(),
                schema: None,
            },
        );
        reference
    }

    /// Store the finished schema of a registered record
    fn complete(&mut self, identity: &str, schema: Schema) {
        if let Some(definition) = self.by_identity.get_mut(identity) {
            definition.schema = Some(schema);
        }
    }

    fn unique_name(&self, identity: &str) -> String {
        let base = definition_name(identity);
        if !self.names.contains(&base) {
            return base;
        }
        (2..)
            .map(|n| format!("{base}{n}"))
            .find(|candidate| !self.names.contains(candidate))
            .unwrap_or(base)
    }

    /// Follow a `$ref` to its finished definition
    ///
    /// Inline nodes resolve to themselves. Returns `None` for references
    /// whose target is the root or is still being walked.
    pub(crate) fn resolve<'a>(&'a self, schema: &'a Schema) -> Option<&'a Schema> {
        if !schema.is_reference() {
            return Some(schema);
        }
        schema
            .reference
            .as_deref()
            .and_then(|reference| self.by_reference.get(reference))
            .and_then(|identity| self.by_identity.get(identity))
            .and_then(|definition| definition.schema.as_ref())
    }

    /// Finished definitions keyed by name, without the root
    pub(crate) fn into_map(self) -> BTreeMap<String, Schema> {
        self.by_identity
            .into_values()
            .filter(|definition| definition.reference != ROOT_REFERENCE)
            .filter_map(|definition| Some((definition.name, definition.schema?)))
            .collect()
    }
}

/// Name under `$defs` for a record: its type name stripped of module paths,
/// with generic arguments joined by `_` (`a::Page<b::Item>` → `Page_Item`)
pub(crate) fn definition_name(identity: &str) -> String {
    let mut name = String::new();
    let mut segment = String::new();
    let mut chars = identity.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            segment.clear();
        } else if c.is_alphanumeric() || c == '_' {
            segment.push(c);
        } else {
            name.push_str(&segment);
            segment.clear();
            if !name.is_empty() && !name.ends_with('_') {
                name.push('_');
            }
        }
    }
    name.push_str(&segment);

    name.trim_end_matches('_').to_string()
}

/// One derivation: a depth-first walk with a private definitions table
#[derive(Default)]
pub(crate) struct Walker {
    definitions: Definitions,
    at_root: bool,
}

impl Walker {
    /// Walk `descriptor` as the document root
    ///
    /// Returns the root schema and the definitions reachable from it.
    pub(crate) fn derive(
        mut self,
        descriptor: TypeDescriptor,
    ) -> Result<(Schema, BTreeMap<String, Schema>), SchemaError> {
        self.at_root = true;
        let schema = self.walk(descriptor)?;
        Ok((schema, self.definitions.into_map()))
    }

    fn walk(&mut self, descriptor: TypeDescriptor) -> Result<Schema, SchemaError> {
        let root = std::mem::take(&mut self.at_root);

        match descriptor {
            TypeDescriptor::Boolean => Ok(Schema::typed(DataType::Boolean)),
            TypeDescriptor::Integer { signed, bits } => Ok(integer_schema(signed, bits)),
            TypeDescriptor::Float { bits } => {
                let mut schema = Schema::typed(DataType::Number);
                schema.format = Some(if bits <= 32 { "float" } else { "double" }.to_string());
                Ok(schema)
            }
            TypeDescriptor::String => Ok(Schema::typed(DataType::String)),
            TypeDescriptor::Bytes => Ok(bytes_schema()),
            TypeDescriptor::Array { items, len } => {
                if is_byte(items) {
                    return Ok(bytes_schema());
                }
                let mut schema = self.array_schema(items)?;
                let len = len as u64;
                schema.min_items = Some(len);
                schema.max_items = Some(len);
                Ok(schema)
            }
            TypeDescriptor::Sequence { items } => {
                if is_byte(items) {
                    return Ok(bytes_schema());
                }
                self.array_schema(items)
            }
            TypeDescriptor::Map { values } => {
                let mut schema = Schema::typed(DataType::Object);
                schema.additional_properties =
                    Some(AdditionalProperties::Schema(Box::new(self.walk(values())?)));
                Ok(schema)
            }
            TypeDescriptor::Record(record) => self.walk_record(record, root),
            TypeDescriptor::WellKnown(known) => Ok(well_known_schema(known)),
            TypeDescriptor::Unsupported(kind) => Err(SchemaError::unsupported(kind)),
            TypeDescriptor::Indirect(inner) => {
                // Wrappers are transparent, including to root-ness.
                self.at_root = root;
                self.walk(inner())
            }
        }
    }

    fn array_schema(&mut self, items: TypeRef) -> Result<Schema, SchemaError> {
        let mut schema = Schema::typed(DataType::Array);
        schema.items = Some(Box::new(self.walk(items())?));
        Ok(schema)
    }

    fn walk_record(&mut self, record: RecordDescriptor, root: bool) -> Result<Schema, SchemaError> {
        if let Some(reference) = self.definitions.reference_of(record.identity) {
            trace!(record = record.identity, reference = %reference, "reusing definition");
            return Ok(Schema::reference(reference));
        }
        let reference = self.definitions.register(&record, root);

        let mut schema = Schema::typed(DataType::Object);
        schema.additional_properties = Some(AdditionalProperties::Allowed(
            binder::additional_properties(&record)?,
        ));

        for field in binder::flatten_fields(&record)? {
            let Some(name) = field.target_name() else {
                continue;
            };
            let required = binder::is_required(&field)?;
            let base = self
                .walk((field.ty)())
                .map_err(|err| err.in_field(&field.ident))?;
            let property = binder::bind(&field, base, &self.definitions)?;

            let name = name.to_string();
            if required {
                schema.required.push(name.clone());
            }
            schema.properties.insert(name, property);
        }

        if root {
            return Ok(schema);
        }
        self.definitions.complete(record.identity, schema);
        Ok(Schema::reference(reference))
    }
}

fn integer_schema(signed: bool, bits: u32) -> Schema {
    let mut schema = Schema::typed(DataType::Integer);
    schema.format = match bits {
        b if b <= 32 => Some("int32".to_string()),
        64 => Some("int64".to_string()),
        _ => None,
    };
    if !signed {
        schema.minimum = Some(Number::from(0u8));
    }
    schema
}

fn bytes_schema() -> Schema {
    let mut schema = Schema::typed(DataType::String);
    schema.content_encoding = Some("base64".to_string());
    schema
}

fn well_known_schema(known: WellKnown) -> Schema {
    match known.format() {
        Some(format) => {
            let mut schema = Schema::typed(DataType::String);
            schema.format = Some(format.to_string());
            schema
        }
        None => Schema::default(),
    }
}

/// Sequences of `u8` are byte strings; wrapped bytes (`Vec<Option<u8>>`) are not
fn is_byte(items: TypeRef) -> bool {
    matches!(
        items(),
        TypeDescriptor::Integer {
            signed: false,
            bits: 8
        }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::descriptor::{Describe, FieldDescriptor};
    use serde_json::json;

    fn derive(descriptor: TypeDescriptor) -> Result<serde_json::Value, SchemaError> {
        let (mut schema, definitions) = Walker::default().derive(descriptor)?;
        schema.definitions = definitions;
        Ok(schema.to_value().unwrap())
    }

    struct Node;

    impl Describe for Node {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::Record(
                RecordDescriptor::new::<Node>("Node")
                    .field(FieldDescriptor::new("value", i64::describe))
                    .field(FieldDescriptor::new("next", Option::<Box<Node>>::describe).omit_empty()),
            )
        }
    }

    struct Holder;

    impl Describe for Holder {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::Record(
                RecordDescriptor::new::<Holder>("Holder")
                    .field(FieldDescriptor::new("first", Node::describe))
                    .field(FieldDescriptor::new("second", Vec::<Node>::describe)),
            )
        }
    }

    #[test]
    fn test_scalars() {
        assert_eq!(derive(bool::describe()).unwrap(), json!({"type": "boolean"}));
        assert_eq!(
            derive(i32::describe()).unwrap(),
            json!({"type": "integer", "format": "int32"})
        );
        assert_eq!(
            derive(u64::describe()).unwrap(),
            json!({"type": "integer", "format": "int64", "minimum": 0})
        );
        assert_eq!(
            derive(u8::describe()).unwrap(),
            json!({"type": "integer", "format": "int32", "minimum": 0})
        );
        assert_eq!(
            derive(i128::describe()).unwrap(),
            json!({"type": "integer"})
        );
        assert_eq!(
            derive(f32::describe()).unwrap(),
            json!({"type": "number", "format": "float"})
        );
        assert_eq!(
            derive(f64::describe()).unwrap(),
            json!({"type": "number", "format": "double"})
        );
        assert_eq!(derive(String::describe()).unwrap(), json!({"type": "string"}));
    }

    #[test]
    fn test_bytes_are_never_arrays() {
        let expected = json!({"type": "string", "contentEncoding": "base64"});
        assert_eq!(derive(Vec::<u8>::describe()).unwrap(), expected);
        assert_eq!(derive(<[u8; 16]>::describe()).unwrap(), expected);
        assert_eq!(derive(bytes::Bytes::describe()).unwrap(), expected);
        assert_eq!(derive(Option::<Vec<u8>>::describe()).unwrap(), expected);
    }

    #[test]
    fn test_fixed_array_bounds() {
        assert_eq!(
            derive(<[i64; 2]>::describe()).unwrap(),
            json!({
                "type": "array",
                "items": {"type": "integer", "format": "int64"},
                "minItems": 2,
                "maxItems": 2
            })
        );
        assert_eq!(
            derive(Vec::<i64>::describe()).unwrap(),
            json!({"type": "array", "items": {"type": "integer", "format": "int64"}})
        );
    }

    #[test]
    fn test_map() {
        assert_eq!(
            derive(HashMap::<String, String>::describe()).unwrap(),
            json!({"type": "object", "additionalProperties": {"type": "string"}})
        );
    }

    #[test]
    fn test_unsupported() {
        let err = derive(<()>::describe()).unwrap_err();
        assert_eq!(err, SchemaError::unsupported("unit"));

        let err = derive(Vec::<()>::describe()).unwrap_err();
        assert_eq!(err, SchemaError::unsupported("unit"));
    }

    #[test]
    fn test_unsupported_field_is_located() {
        struct Leaf;

        impl Describe for Leaf {
            fn describe() -> TypeDescriptor {
                TypeDescriptor::Record(
                    RecordDescriptor::new::<Leaf>("Leaf")
                        .field(FieldDescriptor::new("name", String::describe))
                        .field(FieldDescriptor::new("mode", Vec::<()>::describe)),
                )
            }
        }

        struct Trunk;

        impl Describe for Trunk {
            fn describe() -> TypeDescriptor {
                TypeDescriptor::Record(
                    RecordDescriptor::new::<Trunk>("Trunk")
                        .field(FieldDescriptor::new("id", i64::describe))
                        .field(FieldDescriptor::new("leaf", Leaf::describe)),
                )
            }
        }

        let err = derive(Trunk::describe()).unwrap_err();
        assert_eq!(err.to_string(), "unsupported type: unit in field 'leaf.mode'");
    }

    #[test]
    fn test_root_self_reference() {
        assert_eq!(
            derive(Node::describe()).unwrap(),
            json!({
                "type": "object",
                "properties": {
                    "value": {"type": "integer", "format": "int64"},
                    "next": {"$ref": "#"}
                },
                "additionalProperties": false,
                "required": ["value"]
            })
        );
    }

    #[test]
    fn test_shared_record_goes_to_definitions() {
        assert_eq!(
            derive(Holder::describe()).unwrap(),
            json!({
                "type": "object",
                "properties": {
                    "first": {"$ref": "#/$defs/Node"},
                    "second": {"type": "array", "items": {"$ref": "#/$defs/Node"}}
                },
                "additionalProperties": false,
                "required": ["first", "second"],
                "$defs": {
                    "Node": {
                        "type": "object",
                        "properties": {
                            "value": {"type": "integer", "format": "int64"},
                            "next": {"$ref": "#/$defs/Node"}
                        },
                        "additionalProperties": false,
                        "required": ["value"]
                    }
                }
            })
        );
    }

    #[test]
    fn test_record_under_sequence_root_is_a_definition() {
        let value = derive(Vec::<Node>::describe()).unwrap();
        assert_eq!(value["items"], json!({"$ref": "#/$defs/Node"}));
        assert!(value["$defs"]["Node"].is_object());
    }

    #[test]
    fn test_definition_name() {
        assert_eq!(definition_name("crate::models::Node"), "Node");
        assert_eq!(definition_name("a::Page<b::c::Item>"), "Page_Item");
        assert_eq!(definition_name("a::Pair<a::X, alloc::string::String>"), "Pair_X_String");
        assert_eq!(definition_name("Plain"), "Plain");
    }

    #[test]
    fn test_colliding_names_are_suffixed() {
        mod other {
            use super::*;

            pub struct Node;

            impl Describe for Node {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::Record(RecordDescriptor::new::<Node>("Node"))
                }
            }
        }

        struct Both;

        impl Describe for Both {
            fn describe() -> TypeDescriptor {
                TypeDescriptor::Record(
                    RecordDescriptor::new::<Both>("Both")
                        .field(FieldDescriptor::new("a", Node::describe))
                        .field(FieldDescriptor::new("b", other::Node::describe)),
                )
            }
        }

        let value = derive(Both::describe()).unwrap();
        assert_eq!(value["properties"]["a"], json!({"$ref": "#/$defs/Node"}));
        assert_eq!(value["properties"]["b"], json!({"$ref": "#/$defs/Node2"}));
        assert!(value["$defs"]["Node2"].is_object());
    }

    #[test]
    fn test_record_walked_once() {
        let mut walker = Walker::default();
        walker.at_root = true;
        walker.walk(Holder::describe()).unwrap();
        // Holder (root) and Node
        assert_eq!(walker.definitions.by_identity.len(), 2);
    }
}
