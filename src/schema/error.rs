//! Error types for schema derivation

use thiserror::Error;

/// Errors that abort a schema derivation
///
/// Every variant names enough context (tag, field path, raw literal) to find
/// the offending annotation without re-running the derivation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A type kind that has no JSON Schema representation
    ///
    /// `field` is the dotted path of the field that reached it, from the
    /// outermost record down, and is absent when the root itself is the
    /// unsupported type.
    #[error("unsupported type: {kind}{}", location(.field))]
    UnsupportedType { kind: String, field: Option<String> },

    /// A constraint tag whose literal is not the expected primitive
    #[error("invalid {expected} tag '{tag}' for field '{field}': {value}")]
    InvalidConstraintTag {
        tag: String,
        field: String,
        value: String,
        /// `bool`, `int` or `float`
        expected: &'static str,
    },

    /// An `enum`/`example` literal that does not parse or does not match the
    /// schema inferred for its field
    #[error("invalid {kind} tag value '{value}' for field '{field}'{}", detail(.reason))]
    InvalidLiteral {
        kind: String,
        value: String,
        field: String,
        reason: Option<String>,
    },
}

fn location(field: &Option<String>) -> String {
    match field {
        Some(field) => format!(" in field '{field}'"),
        None => String::new(),
    }
}

fn detail(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(": {reason}"),
        None => String::new(),
    }
}

impl SchemaError {
    pub(crate) fn unsupported(kind: impl Into<String>) -> Self {
        SchemaError::UnsupportedType {
            kind: kind.into(),
            field: None,
        }
    }

    /// Prefix the location of an unsupported type with the enclosing field
    pub(crate) fn in_field(self, ident: &str) -> Self {
        match self {
            SchemaError::UnsupportedType { kind, field } => SchemaError::UnsupportedType {
                kind,
                field: Some(match field {
                    Some(inner) => format!("{ident}.{inner}"),
                    None => ident.to_string(),
                }),
            },
            other => other,
        }
    }

    pub(crate) fn constraint_tag(
        tag: &str,
        field: &str,
        value: &str,
        expected: &'static str,
    ) -> Self {
        SchemaError::InvalidConstraintTag {
            tag: tag.to_string(),
            field: field.to_string(),
            value: value.to_string(),
            expected,
        }
    }

    pub(crate) fn literal(kind: impl Into<String>, value: &str, field: &str) -> Self {
        SchemaError::InvalidLiteral {
            kind: kind.into(),
            value: value.to_string(),
            field: field.to_string(),
            reason: None,
        }
    }

    pub(crate) fn with_reason(self, reason: impl Into<String>) -> Self {
        match self {
            SchemaError::InvalidLiteral {
                kind, value, field, ..
            } => SchemaError::InvalidLiteral {
                kind,
                value,
                field,
                reason: Some(reason.into()),
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_type_message() {
        let err = SchemaError::unsupported("enum");
        assert_eq!(err.to_string(), "unsupported type: enum");
    }

    #[test]
    fn test_unsupported_type_nested_location() {
        let err = SchemaError::unsupported("enum").in_field("mode").in_field("inner");
        assert_eq!(
            err,
            SchemaError::UnsupportedType {
                kind: "enum".to_string(),
                field: Some("inner.mode".to_string()),
            }
        );
        assert_eq!(err.to_string(), "unsupported type: enum in field 'inner.mode'");
    }

    #[test]
    fn test_in_field_leaves_other_errors() {
        let err = SchemaError::literal("integer", "true", "Value");
        assert_eq!(err.clone().in_field("outer"), err);
    }

    #[test]
    fn test_constraint_tag_message() {
        let err = SchemaError::constraint_tag("required", "Value", "bad", "bool");
        assert_eq!(
            err.to_string(),
            "invalid bool tag 'required' for field 'Value': bad"
        );
    }

    #[test]
    fn test_literal_message() {
        let err = SchemaError::literal("integer", "true", "Value[0]");
        assert_eq!(
            err.to_string(),
            "invalid integer tag value 'true' for field 'Value[0]'"
        );
    }

    #[test]
    fn test_literal_message_with_reason() {
        let err = SchemaError::literal("integer", "bad", "Value").with_reason("expected value");
        assert!(matches!(err, SchemaError::InvalidLiteral { reason: Some(_), .. }));
        assert_eq!(
            err.to_string(),
            "invalid integer tag value 'bad' for field 'Value': expected value"
        );
    }
}
