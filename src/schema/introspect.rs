//! Walks schema field metadata into a flat, validated descriptor list.

use super::{FieldKind, FieldSpec, SchemaRef};
use crate::error::Error;
use crate::utils::to_kebab_case;
use std::collections::HashSet;

/// Help suffix appended to composite fields.
pub const JSON_INPUT_HINT: &str = "Provide the value as a JSON string.";

/// Normalized description of one flag, derived from a [`FieldSpec`].
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDescriptor {
    /// Key in the resolved argument map.
    pub wire_name: String,
    /// Long flag name (kebab-case wire name).
    pub flag_name: String,
    pub help: String,
    pub required: bool,
    pub default: Option<String>,
    pub choices: Vec<String>,
    pub kind: FieldKind,
    pub composite: bool,
}

impl ArgumentDescriptor {
    /// Help text with type, choice and JSON hints appended.
    #[must_use]
    pub fn help_text(&self) -> String {
        let mut help = self.help.clone();
        if !self.choices.is_empty() {
            if !help.is_empty() {
                help.push(' ');
            }
            help.push_str(&format!("[choices: {}]", self.choices.join(", ")));
        }
        if self.composite {
            if !help.is_empty() {
                help.push(' ');
            }
            help.push_str(JSON_INPUT_HINT);
        }
        help
    }
}

/// Produces the ordered descriptor list for a schema.
///
/// Embedded records are inlined in place and non-public fields are skipped.
///
/// # Errors
///
/// Returns a schema error for duplicate wire names, unnamed fields, defaults
/// that do not coerce to the declared kind or fall outside the choice set,
/// and choice sets declared on composite fields.
pub fn introspect(schema: &SchemaRef) -> Result<Vec<ArgumentDescriptor>, Error> {
    let mut descriptors = Vec::new();
    let mut seen = HashSet::new();
    collect(schema.short_name(), &(schema.fields)(), &mut descriptors, &mut seen, 0)?;
    Ok(descriptors)
}

const MAX_EMBED_DEPTH: usize = 16;

fn collect(
    schema_name: &str,
    fields: &[FieldSpec],
    out: &mut Vec<ArgumentDescriptor>,
    seen: &mut HashSet<String>,
    depth: usize,
) -> Result<(), Error> {
    if depth > MAX_EMBED_DEPTH {
        return Err(Error::schema(format!(
            "{schema_name}: embedded records nest deeper than {MAX_EMBED_DEPTH} levels"
        )));
    }

    for field in fields {
        if let FieldKind::Embedded(inner) = field.kind {
            collect(schema_name, &inner(), out, seen, depth + 1)?;
            continue;
        }
        if !field.public {
            continue;
        }
        out.push(describe(schema_name, field, seen)?);
    }
    Ok(())
}

fn describe(
    schema_name: &str,
    field: &FieldSpec,
    seen: &mut HashSet<String>,
) -> Result<ArgumentDescriptor, Error> {
    if field.name.is_empty() {
        return Err(Error::schema(format!(
            "{schema_name}: field of kind {:?} has no wire name",
            field.kind
        )));
    }
    if !seen.insert(field.name.to_string()) {
        return Err(Error::schema(format!(
            "{schema_name}: duplicate field '{}'",
            field.name
        )));
    }

    let composite = field.kind.is_composite();
    if composite && !field.choices.is_empty() {
        return Err(Error::schema(format!(
            "{schema_name}.{}: choices are not supported on composite fields",
            field.name
        )));
    }

    let flag_name = to_kebab_case(field.name);
    if let Some(default) = field.default {
        crate::engine::resolver::coerce(&flag_name, field.kind, &[default.to_string()])
            .map_err(|e| {
                Error::schema(format!(
                    "{schema_name}.{}: default '{default}' is invalid: {e}",
                    field.name
                ))
            })?;
        if !field.choices.is_empty() && !field.choices.contains(&default) {
            return Err(Error::schema(format!(
                "{schema_name}.{}: default '{default}' is not one of the declared choices",
                field.name
            )));
        }
    }

    Ok(ArgumentDescriptor {
        wire_name: field.name.to_string(),
        flag_name,
        help: field.help.to_string(),
        required: field.required,
        default: field.default.map(str::to_string),
        choices: field.choices.iter().map(|c| (*c).to_string()).collect(),
        kind: field.kind,
        composite,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ArgumentSchema, IntWidth};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Paging {
        limit: u32,
        start: Option<String>,
    }

    impl ArgumentSchema for Paging {
        fn fields() -> Vec<FieldSpec> {
            vec![
                FieldSpec::new("limit", FieldKind::Uint(IntWidth::W32)).default_value("50"),
                FieldSpec::new("start", FieldKind::String),
            ]
        }
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct ListGroups {
        account_id: String,
        #[serde(flatten)]
        paging: Paging,
        internal_token: String,
        rules: Vec<serde_json::Value>,
    }

    impl ArgumentSchema for ListGroups {
        fn fields() -> Vec<FieldSpec> {
            vec![
                FieldSpec::new("account_id", FieldKind::String)
                    .help("Account identifier")
                    .required(),
                FieldSpec::embedded::<Paging>(),
                FieldSpec::new("internal_token", FieldKind::String).private(),
                FieldSpec::new("rules", FieldKind::RecordList).help("Membership rules"),
            ]
        }
    }

    #[test]
    fn test_embedded_fields_are_inlined_in_order() {
        let descriptors = introspect(&SchemaRef::of::<ListGroups>()).unwrap();
        let names: Vec<&str> = descriptors.iter().map(|d| d.wire_name.as_str()).collect();
        assert_eq!(names, vec!["account_id", "limit", "start", "rules"]);
        assert_eq!(descriptors[0].flag_name, "account-id");
        assert!(descriptors[0].required);
        assert_eq!(descriptors[1].default.as_deref(), Some("50"));
    }

    #[test]
    fn test_composite_fields_carry_json_hint() {
        let descriptors = introspect(&SchemaRef::of::<ListGroups>()).unwrap();
        let rules = descriptors.iter().find(|d| d.wire_name == "rules").unwrap();
        assert!(rules.composite);
        assert!(rules.help_text().contains(JSON_INPUT_HINT));
        assert!(rules.help_text().starts_with("Membership rules"));
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Duplicate {
        name: String,
    }

    impl ArgumentSchema for Duplicate {
        fn fields() -> Vec<FieldSpec> {
            vec![
                FieldSpec::new("name", FieldKind::String),
                FieldSpec::new("name", FieldKind::Bool),
            ]
        }
    }

    #[test]
    fn test_duplicate_wire_name_is_schema_error() {
        let err = introspect(&SchemaRef::of::<Duplicate>()).unwrap_err();
        assert_eq!(err.kind(), Some(crate::error::ErrorKind::Schema));
        assert!(err.to_string().contains("duplicate field 'name'"));
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct BadDefault {
        count: i8,
        mode: String,
    }

    impl ArgumentSchema for BadDefault {
        fn fields() -> Vec<FieldSpec> {
            vec![
                FieldSpec::new("count", FieldKind::Int(IntWidth::W8)).default_value("300"),
                FieldSpec::new("mode", FieldKind::String),
            ]
        }
    }

    #[test]
    fn test_default_out_of_range_is_schema_error() {
        let err = introspect(&SchemaRef::of::<BadDefault>()).unwrap_err();
        assert!(err.to_string().contains("default '300' is invalid"));
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct ChoiceDefault {
        mode: String,
    }

    impl ArgumentSchema for ChoiceDefault {
        fn fields() -> Vec<FieldSpec> {
            vec![FieldSpec::new("mode", FieldKind::String)
                .choices(&["fast", "safe"])
                .default_value("slow")]
        }
    }

    #[test]
    fn test_default_outside_choices_is_schema_error() {
        let err = introspect(&SchemaRef::of::<ChoiceDefault>()).unwrap_err();
        assert!(err.to_string().contains("not one of the declared choices"));
    }
}
