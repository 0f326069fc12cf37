//! Type descriptors
//!
//! The walker does not inspect live types. Instead every describable type
//! hands out a [`TypeDescriptor`] tree, normally generated by
//! `#[derive(Describe)]`. Child types are referenced through [`TypeRef`]
//! function pointers, so a descriptor for a recursive type stays finite: the
//! child is only described when the walker actually visits it.

use std::any::type_name;

/// Lazily produces the descriptor of a child type
pub type TypeRef = fn() -> TypeDescriptor;

/// A type that can describe its own shape to the schema walker
///
/// # Example
///
/// ```ignore
/// use assistant::schema::Describe;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, Describe)]
/// struct WeatherArgs {
///     /// City to look up
///     city: String,
///     #[schema(enum = "celsius,fahrenheit")]
///     #[serde(default, skip_serializing_if = "Option::is_none")]
///     units: Option<String>,
/// }
/// ```
pub trait Describe {
    fn describe() -> TypeDescriptor;
}

/// The shape of a type, as far as JSON Schema is concerned
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    Boolean,
    Integer { signed: bool, bits: u32 },
    Float { bits: u32 },
    String,
    /// Byte sequences are encoded as base64 strings, never as arrays
    Bytes,
    /// Fixed-size array
    Array { items: TypeRef, len: usize },
    /// Growable sequence
    Sequence { items: TypeRef },
    /// Mapping from string keys to `values`
    Map { values: TypeRef },
    Record(RecordDescriptor),
    WellKnown(WellKnown),
    /// `Option`, `Box` and other wrappers that are transparent to the schema
    Indirect(TypeRef),
    /// A kind with no schema representation
    Unsupported(&'static str),
}

impl TypeDescriptor {
    /// Follow [`TypeDescriptor::Indirect`] wrappers down to the described type
    pub fn resolve(self) -> TypeDescriptor {
        let mut descriptor = self;
        while let TypeDescriptor::Indirect(inner) = descriptor {
            descriptor = inner();
        }
        descriptor
    }

    /// Short name of the kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            TypeDescriptor::Boolean => "boolean",
            TypeDescriptor::Integer { .. } => "integer",
            TypeDescriptor::Float { .. } => "float",
            TypeDescriptor::String => "string",
            TypeDescriptor::Bytes => "bytes",
            TypeDescriptor::Array { .. } => "array",
            TypeDescriptor::Sequence { .. } => "sequence",
            TypeDescriptor::Map { .. } => "map",
            TypeDescriptor::Record(_) => "record",
            TypeDescriptor::WellKnown(_) => "well-known",
            TypeDescriptor::Indirect(_) => "indirect",
            TypeDescriptor::Unsupported(kind) => kind,
        }
    }
}

/// Non-structural types with a fixed schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnown {
    DateTime,
    Date,
    Time,
    Uri,
    Ipv4,
    Ipv6,
    Uuid,
    /// Arbitrary JSON passed through untouched
    Raw,
}

impl WellKnown {
    /// The `format` value, or `None` for raw passthrough
    pub fn format(&self) -> Option<&'static str> {
        match self {
            WellKnown::DateTime => Some("date-time"),
            WellKnown::Date => Some("date"),
            WellKnown::Time => Some("time"),
            WellKnown::Uri => Some("uri"),
            WellKnown::Ipv4 => Some("ipv4"),
            WellKnown::Ipv6 => Some("ipv6"),
            WellKnown::Uuid => Some("uuid"),
            WellKnown::Raw => None,
        }
    }
}

/// A named, field-bearing type
#[derive(Debug, Clone)]
pub struct RecordDescriptor {
    /// Declared name of the type
    pub name: String,
    /// Fully qualified identity, unique per type within a program
    pub identity: &'static str,
    /// Fields in declaration order
    pub fields: Vec<FieldDescriptor>,
    /// Raw literal of the `additionalProperties` escape hatch
    pub additional_properties: Option<String>,
}

impl RecordDescriptor {
    /// Start describing the record type `T`
    pub fn new<T: ?Sized>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identity: type_name::<T>(),
            fields: Vec::new(),
            additional_properties: None,
        }
    }

    /// Append a field
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Set the `additionalProperties` escape hatch (`"true"` or `"false"`)
    pub fn additional_properties(mut self, raw: impl Into<String>) -> Self {
        self.additional_properties = Some(raw.into());
        self
    }
}

/// Property name that removes a field from the schema
pub const OMIT: &str = "-";

/// A single field of a record
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Declared field name, used in diagnostics
    pub ident: String,
    /// Serialized property name; [`OMIT`] drops the field
    pub rename: Option<String>,
    /// The field may be left out of the serialized form
    pub omit_empty: bool,
    /// The field's own fields are promoted into the containing record
    pub flatten: bool,
    pub ty: TypeRef,
    /// Constraint tags keyed by their canonical (camelCase) name
    pub tags: Vec<(String, String)>,
}

impl FieldDescriptor {
    pub fn new(ident: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            ident: ident.into(),
            rename: None,
            omit_empty: false,
            flatten: false,
            ty,
            tags: Vec::new(),
        }
    }

    /// Set the serialized property name
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.rename = Some(name.into());
        self
    }

    /// Mark the field as optional in the serialized form
    pub fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    /// Promote the field's own fields into the containing record
    pub fn flatten(mut self) -> Self {
        self.flatten = true;
        self
    }

    /// Attach a constraint tag; snake_case names are accepted as aliases
    pub fn tag(mut self, key: &str, value: impl Into<String>) -> Self {
        let key = canonical_tag(key).unwrap_or(key);
        self.tags.push((key.to_string(), value.into()));
        self
    }

    /// Value of a tag, if present and non-empty. The last occurrence wins.
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    /// The property name this field is serialized under, `None` if omitted
    pub fn target_name(&self) -> Option<&str> {
        match self.rename.as_deref() {
            Some(OMIT) => None,
            Some(name) => Some(name),
            None => Some(self.ident.as_str()),
        }
    }
}

/// Recognized tag names with their snake_case aliases
pub const TAGS: &[(&str, &str)] = &[
    ("description", "description"),
    ("title", "title"),
    ("format", "format"),
    ("encoding", "encoding"),
    ("pattern", "pattern"),
    ("enum", "enum"),
    ("example", "example"),
    ("required", "required"),
    ("multipleOf", "multiple_of"),
    ("maximum", "maximum"),
    ("exclusiveMaximum", "exclusive_maximum"),
    ("minimum", "minimum"),
    ("exclusiveMinimum", "exclusive_minimum"),
    ("minLength", "min_length"),
    ("maxLength", "max_length"),
    ("minItems", "min_items"),
    ("maxItems", "max_items"),
    ("uniqueItems", "unique_items"),
    ("minProperties", "min_properties"),
    ("maxProperties", "max_properties"),
    ("additionalProperties", "additional_properties"),
];

/// Map a tag name or its snake_case alias to the canonical name
pub fn canonical_tag(key: &str) -> Option<&'static str> {
    TAGS.iter()
        .find(|(camel, snake)| *camel == key || *snake == key)
        .map(|(camel, _)| *camel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string() -> TypeDescriptor {
        TypeDescriptor::String
    }

    #[test]
    fn test_resolve_strips_indirection() {
        fn boxed() -> TypeDescriptor {
            TypeDescriptor::Indirect(string)
        }

        let resolved = TypeDescriptor::Indirect(boxed).resolve();
        assert!(matches!(resolved, TypeDescriptor::String));
    }

    #[test]
    fn test_target_name() {
        let plain = FieldDescriptor::new("Value", string);
        assert_eq!(plain.target_name(), Some("Value"));

        let renamed = FieldDescriptor::new("Value", string).rename("value");
        assert_eq!(renamed.target_name(), Some("value"));

        let omitted = FieldDescriptor::new("Value", string).rename(OMIT);
        assert_eq!(omitted.target_name(), None);
    }

    #[test]
    fn test_tag_aliases() {
        let field = FieldDescriptor::new("name", string)
            .tag("min_length", "1")
            .tag("maxLength", "5");

        assert_eq!(field.tag_value("minLength"), Some("1"));
        assert_eq!(field.tag_value("maxLength"), Some("5"));
        assert_eq!(field.tag_value("min_length"), None);
    }

    #[test]
    fn test_empty_tag_is_absent() {
        let field = FieldDescriptor::new("name", string).tag("description", "");
        assert_eq!(field.tag_value("description"), None);
    }

    #[test]
    fn test_record_identity() {
        struct Sample;
        let record = RecordDescriptor::new::<Sample>("Sample");
        assert!(record.identity.ends_with("Sample"));
        assert!(record.fields.is_empty());
    }

    #[test]
    fn test_well_known_formats() {
        assert_eq!(WellKnown::DateTime.format(), Some("date-time"));
        assert_eq!(WellKnown::Uri.format(), Some("uri"));
        assert_eq!(WellKnown::Ipv4.format(), Some("ipv4"));
        assert_eq!(WellKnown::Raw.format(), None);
    }
}
