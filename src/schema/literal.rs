//! Literal coercion for `enum` and `example` tags
//!
//! Tag literals are parsed against the schema already inferred for their
//! field. The type check below must mirror the kind-to-type mapping of the
//! walker: a literal is only accepted if it could have been produced by a value
//! of the described type.

use serde_json::{Number, Value};

use super::document::{AdditionalProperties, DataType, Schema};
use super::error::SchemaError;
use super::walker::Definitions;

/// Parse `raw` as a value of `target`, labelling errors with `path`
pub(crate) fn coerce(
    path: &str,
    target: &Schema,
    raw: &str,
    definitions: &Definitions,
) -> Result<Value, SchemaError> {
    let resolved = definitions.resolve(target);
    let data_type = resolved.and_then(|schema| schema.data_type);

    // Strings don't need quotes.
    if data_type == Some(DataType::String) {
        return Ok(Value::String(raw.to_string()));
    }

    // Arrays of strings may be written as a bare comma-separated list.
    if data_type == Some(DataType::Array) && !raw.starts_with('[') {
        let item_type = resolved
            .and_then(|schema| schema.items.as_deref())
            .and_then(|items| definitions.resolve(items))
            .and_then(|items| items.data_type);
        if item_type == Some(DataType::String) {
            let values = raw
                .split(',')
                .map(|s| Value::String(s.trim().to_string()))
                .collect();
            return Ok(Value::Array(values));
        }
    }

    let value: Value = serde_json::from_str(raw).map_err(|err| {
        SchemaError::literal(kind_name(data_type), raw, path).with_reason(err.to_string())
    })?;
    ensure_type(path, target, raw, &value, definitions)?;

    Ok(value)
}

/// Recursively check `value` against `schema`
///
/// Nested positions extend `path` with `[i]` for array items and `.name` for
/// object properties. References that cannot be resolved yet (the root, or a
/// record still being walked) accept any value.
fn ensure_type(
    path: &str,
    schema: &Schema,
    raw: &str,
    value: &Value,
    definitions: &Definitions,
) -> Result<(), SchemaError> {
    let Some(schema) = definitions.resolve(schema) else {
        return Ok(());
    };
    let Some(data_type) = schema.data_type else {
        return Ok(());
    };
    let mismatch = || SchemaError::literal(data_type.as_str(), raw, path);

    match data_type {
        DataType::Boolean => {
            if !value.is_boolean() {
                return Err(mismatch());
            }
        }
        DataType::Number => {
            if !value.is_number() {
                return Err(mismatch());
            }
        }
        DataType::Integer => match value {
            Value::Number(number) if is_integral(number) => {}
            _ => return Err(mismatch()),
        },
        DataType::String => {
            if !value.is_string() {
                return Err(mismatch());
            }
        }
        DataType::Array => {
            let items = value.as_array().ok_or_else(mismatch)?;
            if let Some(item_schema) = schema.items.as_deref() {
                for (i, item) in items.iter().enumerate() {
                    ensure_type(
                        &format!("{path}[{i}]"),
                        item_schema,
                        &item.to_string(),
                        item,
                        definitions,
                    )?;
                }
            }
        }
        DataType::Object => {
            let object = value.as_object().ok_or_else(mismatch)?;
            for (name, property) in &schema.properties {
                if let Some(field) = object.get(name) {
                    ensure_type(
                        &format!("{path}.{name}"),
                        property,
                        &field.to_string(),
                        field,
                        definitions,
                    )?;
                }
            }
            if let Some(AdditionalProperties::Schema(values)) = &schema.additional_properties {
                for (name, field) in object {
                    if schema.properties.contains_key(name) {
                        continue;
                    }
                    ensure_type(
                        &format!("{path}.{name}"),
                        values,
                        &field.to_string(),
                        field,
                        definitions,
                    )?;
                }
            }
        }
    }

    Ok(())
}

/// Whole numbers, with floats limited to what an `i64` can hold
fn is_integral(number: &Number) -> bool {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63

    number.is_i64()
        || number.is_u64()
        || number
            .as_f64()
            .is_some_and(|f| f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f))
}

fn kind_name(data_type: Option<DataType>) -> &'static str {
    data_type.map(|t| t.as_str()).unwrap_or("json")
}
