//! Argument resolution: merges defaults, the request file and explicit flags.
//!
//! Precedence, lowest to highest:
//! 1. schema defaults (only for fields nobody supplied),
//! 2. the request file,
//! 3. flags explicitly set on the command line.
//!
//! The result is a flat JSON object keyed by wire name, which is then
//! structurally decoded into the operation's argument record.

use crate::error::Error;
use crate::fs::FileSystem;
use crate::invocation::ParsedFlags;
use crate::schema::{introspect, ArgumentDescriptor, ArgumentSchema, FieldKind, SchemaRef};
use crate::utils::normalize_key;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Resolves the final argument map for one invocation.
///
/// # Errors
///
/// Returns an error if the request file cannot be read or decoded, a flag
/// value cannot be coerced to its declared type, a composite field does not
/// hold JSON of the declared shape, or a value falls outside its choice set.
pub fn resolve<F: FileSystem>(
    fs: &F,
    flags: &ParsedFlags,
    request_file: Option<&Path>,
    descriptors: &[ArgumentDescriptor],
) -> Result<Map<String, Value>, Error> {
    let mut resolved = match request_file {
        Some(path) => load_request_file(fs, path, descriptors)?,
        None => Map::new(),
    };
    let from_file = resolved.len();

    let mut from_flags = 0;
    let mut from_defaults = 0;
    for descriptor in descriptors {
        if let Some(raw) = flags.get(&descriptor.wire_name) {
            let value = coerce(&descriptor.flag_name, descriptor.kind, raw)?;
            resolved.insert(descriptor.wire_name.clone(), value);
            from_flags += 1;
        } else if !resolved.contains_key(&descriptor.wire_name) {
            if let Some(default) = &descriptor.default {
                let value = coerce(
                    &descriptor.flag_name,
                    descriptor.kind,
                    std::slice::from_ref(default),
                )?;
                resolved.insert(descriptor.wire_name.clone(), value);
                from_defaults += 1;
            }
        }
    }

    for descriptor in descriptors {
        if let Some(value) = resolved.get(&descriptor.wire_name) {
            validate_choices(descriptor, value)?;
        }
    }

    debug!(
        target: "portico::resolver",
        "resolved {} arguments ({} from request file, {} from flags, {} defaults)",
        resolved.len(),
        from_file,
        from_flags,
        from_defaults
    );

    Ok(resolved)
}

/// Resolves arguments and decodes them into a fresh `T`.
///
/// # Errors
///
/// Returns any resolution error, a schema error if `T`'s metadata is
/// malformed, or a resolution error if the map does not decode into `T`.
pub fn resolve_record<T: ArgumentSchema, F: FileSystem>(
    fs: &F,
    flags: &ParsedFlags,
    request_file: Option<&Path>,
) -> Result<T, Error> {
    let schema = SchemaRef::of::<T>();
    let descriptors = introspect(&schema)?;
    let resolved = resolve(fs, flags, request_file, &descriptors)?;
    decode_record(schema.short_name(), resolved)
}

/// Structurally decodes a resolved map into a freshly constructed record.
///
/// Resolved entries are laid over the serialized `T::default()`, so fields
/// nobody supplied keep their zero value whether or not the record carries
/// `#[serde(default)]`.
///
/// # Errors
///
/// Returns a resolution error naming the record type if decoding fails.
pub fn decode_record<T: ArgumentSchema>(
    type_name: &str,
    resolved: Map<String, Value>,
) -> Result<T, Error> {
    let mut base = match serde_json::to_value(T::default()) {
        Ok(Value::Object(base)) => base,
        Ok(_) => Map::new(),
        Err(e) => return Err(Error::invalid_record(type_name, e)),
    };
    base.extend(resolved);
    serde_json::from_value(Value::Object(base)).map_err(|e| Error::invalid_record(type_name, e))
}

fn load_request_file<F: FileSystem>(
    fs: &F,
    path: &Path,
    descriptors: &[ArgumentDescriptor],
) -> Result<Map<String, Value>, Error> {
    let shown = path.display().to_string();
    let content = fs
        .read_to_string(path)
        .map_err(|e| Error::request_file(&shown, e))?;
    let parsed: Value =
        serde_json::from_str(&content).map_err(|e| Error::request_file(&shown, e))?;
    let Value::Object(entries) = parsed else {
        return Err(Error::request_file(&shown, "expected a JSON object"));
    };

    let mut normalized = Map::new();
    for (key, value) in entries {
        let wanted = normalize_key(&key);
        let Some(descriptor) = descriptors
            .iter()
            .find(|d| normalize_key(&d.wire_name) == wanted)
        else {
            normalized.insert(key, value);
            continue;
        };
        let value = match value {
            // Strings in the file are treated like raw flag input for typed fields.
            Value::String(raw) if !matches!(descriptor.kind, FieldKind::String) => {
                coerce(&descriptor.flag_name, descriptor.kind, &[raw])?
            }
            composite @ (Value::Array(_) | Value::Object(_)) if descriptor.composite => {
                check_composite_shape(&descriptor.flag_name, descriptor.kind, composite)?
            }
            other => other,
        };
        normalized.insert(descriptor.wire_name.clone(), value);
    }

    debug!(
        target: "portico::resolver",
        "loaded {} entries from request file {}",
        normalized.len(),
        shown
    );
    Ok(normalized)
}

/// Coerces raw string values to the JSON value of a field's declared kind.
///
/// Scalar kinds use the last value; list and map kinds accept repeated
/// values and comma-separated items.
///
/// # Errors
///
/// Returns an error naming `flag` when a value cannot be coerced.
pub fn coerce(flag: &str, kind: FieldKind, raw: &[String]) -> Result<Value, Error> {
    let last = raw.last().map_or("", String::as_str);
    match kind {
        FieldKind::Bool => parse_bool(last)
            .map(Value::Bool)
            .ok_or_else(|| Error::invalid_flag_value(flag, last, "a boolean")),
        FieldKind::Int(width) => {
            let bits = width.bits();
            let value: i64 = last
                .trim()
                .parse()
                .map_err(|_| Error::invalid_flag_value(flag, last, &kind.type_name()))?;
            if bits < 64 {
                let max = (1_i64 << (bits - 1)) - 1;
                let min = -(1_i64 << (bits - 1));
                if value < min || value > max {
                    return Err(Error::invalid_flag_value(flag, last, &kind.type_name()));
                }
            }
            Ok(Value::from(value))
        }
        FieldKind::Uint(width) => {
            let bits = width.bits();
            let value: u64 = last
                .trim()
                .parse()
                .map_err(|_| Error::invalid_flag_value(flag, last, &kind.type_name()))?;
            if bits < 64 && value > (1_u64 << bits) - 1 {
                return Err(Error::invalid_flag_value(flag, last, &kind.type_name()));
            }
            Ok(Value::from(value))
        }
        FieldKind::Float => last
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| Error::invalid_flag_value(flag, last, "a finite number")),
        FieldKind::String => Ok(Value::String(last.to_string())),
        FieldKind::StringList => Ok(Value::Array(
            split_items(raw).map(|item| Value::String(item.to_string())).collect(),
        )),
        FieldKind::StringMap => {
            let mut map = Map::new();
            for item in split_items(raw) {
                let (key, value) = item
                    .split_once('=')
                    .ok_or_else(|| Error::invalid_flag_value(flag, item, "key=value pairs"))?;
                map.insert(key.trim().to_string(), Value::String(value.trim().to_string()));
            }
            Ok(Value::Object(map))
        }
        FieldKind::RecordMap | FieldKind::RecordList => {
            let decoded: Value =
                serde_json::from_str(last).map_err(|e| Error::invalid_json_flag(flag, e))?;
            check_composite_shape(flag, kind, decoded)
        }
        FieldKind::Embedded(_) => Err(Error::schema(format!(
            "flag '--{flag}' refers to an embedded record"
        ))),
    }
}

fn split_items(raw: &[String]) -> impl Iterator<Item = &str> {
    raw.iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}

fn check_composite_shape(flag: &str, kind: FieldKind, value: Value) -> Result<Value, Error> {
    let records_ok = match (&kind, &value) {
        (FieldKind::RecordMap, Value::Object(entries)) => entries.values().all(Value::is_object),
        (FieldKind::RecordList, Value::Array(items)) => items.iter().all(Value::is_object),
        _ => false,
    };
    if records_ok {
        return Ok(value);
    }
    let expected = match kind {
        FieldKind::RecordMap => "expected a JSON object mapping names to objects",
        _ => "expected a JSON array of objects",
    };
    Err(Error::invalid_json_flag(flag, expected))
}

fn validate_choices(descriptor: &ArgumentDescriptor, value: &Value) -> Result<(), Error> {
    if descriptor.choices.is_empty() {
        return Ok(());
    }
    let check = |candidate: &str| {
        if descriptor.choices.iter().any(|choice| choice == candidate) {
            Ok(())
        } else {
            Err(Error::invalid_choice(
                &descriptor.flag_name,
                candidate,
                &descriptor.choices,
            ))
        }
    };
    match value {
        Value::Null => Ok(()),
        Value::String(s) => check(s),
        Value::Array(items) => items
            .iter()
            .try_for_each(|item| check(&scalar_text(item))),
        Value::Object(entries) => entries.keys().try_for_each(|key| check(key)),
        other => check(&scalar_text(other)),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
