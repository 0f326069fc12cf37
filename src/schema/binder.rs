//! Constraint binding
//!
//! Applies a field's tags to the schema derived for its type, and assembles
//! the effective field list of a record from its own and flattened fields.

use std::collections::{HashSet, VecDeque};

use serde_json::{Number, Value};

use super::descriptor::{FieldDescriptor, RecordDescriptor, TypeDescriptor};
use super::document::{DataType, Schema};
use super::error::SchemaError;
use super::literal;
use super::walker::Definitions;

/// Fields of `record` with flattened records expanded
///
/// Directly declared fields come first. Flattened records are expanded
/// breadth-first and appended after, so a shallower declaration always claims
/// a property name before a deeper one; later claims are dropped. Fields
/// omitted from serialization claim nothing.
pub(crate) fn flatten_fields(record: &RecordDescriptor) -> Result<Vec<FieldDescriptor>, SchemaError> {
    let mut fields = Vec::new();
    let mut claimed = HashSet::new();
    let mut visited = HashSet::from([record.identity]);
    let mut pending = VecDeque::from([record.clone()]);

    while let Some(current) = pending.pop_front() {
        for field in current.fields {
            if field.flatten {
                match (field.ty)().resolve() {
                    TypeDescriptor::Record(inner) => {
                        if visited.insert(inner.identity) {
                            pending.push_back(inner);
                        }
                    }
                    other => {
                        return Err(SchemaError::unsupported(format!(
                            "flattened {}",
                            other.kind()
                        ))
                        .in_field(&field.ident))
                    }
                }
                continue;
            }

            let Some(name) = field.target_name() else {
                continue;
            };
            if claimed.insert(name.to_string()) {
                fields.push(field);
            }
        }
    }

    Ok(fields)
}

/// Required unless omitted when empty; an explicit `required` tag wins
pub(crate) fn is_required(field: &FieldDescriptor) -> Result<bool, SchemaError> {
    match field.tag_value("required") {
        Some(raw) => parse_bool(field, "required", raw),
        None => Ok(!field.omit_empty),
    }
}

/// The record's `additionalProperties` escape hatch, `false` by default
pub(crate) fn additional_properties(record: &RecordDescriptor) -> Result<bool, SchemaError> {
    match record.additional_properties.as_deref() {
        Some(raw) => match raw {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(SchemaError::constraint_tag(
                "additionalProperties",
                &record.name,
                raw,
                "bool",
            )),
        },
        None => Ok(false),
    }
}

/// Extend `schema` with the constraints tagged on `field`
pub(crate) fn bind(
    field: &FieldDescriptor,
    mut schema: Schema,
    definitions: &Definitions,
) -> Result<Schema, SchemaError> {
    if let Some(description) = field.tag_value("description") {
        schema.description = Some(description.to_string());
    }
    if let Some(title) = field.tag_value("title") {
        schema.title = Some(title.to_string());
    }
    if let Some(format) = field.tag_value("format") {
        schema.format = Some(format.to_string());
    }
    if let Some(encoding) = field.tag_value("encoding") {
        schema.content_encoding = Some(encoding.to_string());
    }
    if let Some(pattern) = field.tag_value("pattern") {
        schema.pattern = Some(pattern.to_string());
    }

    if let Some(raw) = field.tag_value("example") {
        let example = literal::coerce(&field.ident, &schema, raw, definitions)?;
        schema.examples = vec![example];
    }

    if let Some(raw) = field.tag_value("enum") {
        // Arrays constrain their items.
        let on_items = schema.data_type == Some(DataType::Array) && schema.items.is_some();
        let values = {
            let target = match schema.items.as_deref() {
                Some(items) if on_items => items,
                _ => &schema,
            };
            enum_literals(raw)
                .iter()
                .map(|literal| literal::coerce(&field.ident, target, literal, definitions))
                .collect::<Result<Vec<_>, _>>()?
        };
        match schema.items.as_deref_mut() {
            Some(items) if on_items => items.enum_values = values,
            _ => schema.enum_values = values,
        }
    }

    set_if_some(&mut schema.multiple_of, float_tag(field, "multipleOf")?);
    set_if_some(&mut schema.maximum, float_tag(field, "maximum")?);
    set_if_some(&mut schema.exclusive_maximum, float_tag(field, "exclusiveMaximum")?);
    set_if_some(&mut schema.minimum, float_tag(field, "minimum")?);
    set_if_some(&mut schema.exclusive_minimum, float_tag(field, "exclusiveMinimum")?);

    set_if_some(&mut schema.min_length, int_tag(field, "minLength")?);
    set_if_some(&mut schema.max_length, int_tag(field, "maxLength")?);

    set_if_some(&mut schema.min_items, int_tag(field, "minItems")?);
    set_if_some(&mut schema.max_items, int_tag(field, "maxItems")?);
    if let Some(raw) = field.tag_value("uniqueItems") {
        schema.unique_items = parse_bool(field, "uniqueItems", raw)?;
    }

    set_if_some(&mut schema.min_properties, int_tag(field, "minProperties")?);
    set_if_some(&mut schema.max_properties, int_tag(field, "maxProperties")?);

    Ok(schema)
}

/// Split an `enum` tag into one literal per value
///
/// A tag starting with `[` is a JSON array whose elements are the values,
/// which allows values containing commas. Anything else is comma-separated.
fn enum_literals(raw: &str) -> Vec<String> {
    if raw.trim_start().starts_with('[') {
        if let Ok(Value::Array(values)) = serde_json::from_str::<Value>(raw) {
            return values
                .into_iter()
                .map(|value| match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect();
        }
    }
    raw.split(',').map(|s| s.trim().to_string()).collect()
}

fn set_if_some<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn parse_bool(field: &FieldDescriptor, tag: &str, raw: &str) -> Result<bool, SchemaError> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(SchemaError::constraint_tag(tag, &field.ident, raw, "bool")),
    }
}

fn int_tag(field: &FieldDescriptor, tag: &str) -> Result<Option<u64>, SchemaError> {
    let Some(raw) = field.tag_value(tag) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|_| SchemaError::constraint_tag(tag, &field.ident, raw, "int"))
}

fn float_tag(field: &FieldDescriptor, tag: &str) -> Result<Option<Number>, SchemaError> {
    let Some(raw) = field.tag_value(tag) else {
        return Ok(None);
    };
    let invalid = || SchemaError::constraint_tag(tag, &field.ident, raw, "float");

    let value = raw.trim().parse::<f64>().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }
    // Integral bounds are written as JSON integers.
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        return Ok(Some(Number::from(value as i64)));
    }
    Number::from_f64(value).map(Some).ok_or_else(invalid)
}
