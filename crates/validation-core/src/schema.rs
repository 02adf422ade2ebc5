//! In-memory representation of an Avro-like record schema.
//!
//! Schemas are stored and transmitted as plain JSON (`schema_avro` in the
//! registry); this module is the bridge between that raw JSON and the
//! structured shape the validator actually walks.

use crate::value::{truncate_chars, Value};
use serde_json::Value as Json;

/// A field type candidate: one member of a (possibly singleton) union.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Null,
    String,
    Int,
    Double,
    Array(Box<FieldType>),
    /// A shape the validator does not recognize; never matches any value.
    Unrecognized,
}

impl FieldType {
    fn parse(raw: &Json) -> FieldType {
        match raw {
            Json::String(s) => match s.as_str() {
                "null" => FieldType::Null,
                "string" => FieldType::String,
                "int" => FieldType::Int,
                "double" => FieldType::Double,
                _ => FieldType::Unrecognized,
            },
            Json::Object(obj) => {
                if obj.get("type").and_then(Json::as_str) == Some("array") {
                    let items = obj.get("items").map(FieldType::parse).unwrap_or(FieldType::Unrecognized);
                    FieldType::Array(Box::new(items))
                } else {
                    FieldType::Unrecognized
                }
            }
            _ => FieldType::Unrecognized,
        }
    }

    /// Does `value` satisfy this single candidate type (§4.1 type match rules)?
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldType::Null, Value::Null) => true,
            (FieldType::String, Value::String(_)) => true,
            (FieldType::Int, Value::Int(_)) => true,
            // double accepts either an int or a float; booleans never match
            // either int or double (resolves the bool/int ambiguity flagged
            // as an open question).
            (FieldType::Double, Value::Int(_)) | (FieldType::Double, Value::Double(_)) => true,
            (FieldType::Array(item_ty), Value::Array(items)) => {
                items.iter().all(|item| item_ty.matches(item))
            }
            _ => false,
        }
    }
}

/// One field definition inside a record schema.
#[derive(Debug, Clone)]
pub struct SchemaField {
    pub name: String,
    /// The field's type, listified: a bare type becomes a one-element list.
    pub candidates: Vec<FieldType>,
    /// True if the raw `type` was a JSON array (a union), as opposed to a
    /// single type literal. Only relevant for the "null union" optionality
    /// rule below.
    pub is_union: bool,
    pub has_default: bool,
    /// The raw `type` JSON, kept for building `expected` strings in findings.
    pub raw_type: Json,
}

impl SchemaField {
    /// §4.1: a field is optional if it has a default, or if its type is a
    /// union that lists "null" as one of the members.
    pub fn is_optional(&self) -> bool {
        self.has_default || (self.is_union && self.candidates.contains(&FieldType::Null))
    }

    pub fn expected_repr(&self) -> String {
        self.raw_type.to_string()
    }
}

/// A parsed record schema: just the ordered field list the validator needs.
#[derive(Debug, Clone)]
pub struct Schema {
    pub fields: Vec<SchemaField>,
}

/// §4.1 step 1: the schema document is malformed in a way that must be
/// reported as a single finding rather than crashing the pipeline.
#[derive(Debug, Clone)]
pub struct SchemaMalformed {
    pub detail: String,
    pub received_repr: String,
}

impl Schema {
    /// Parse a raw Avro-like schema document.
    ///
    /// Returns `Err(SchemaMalformed)` when `fields` is missing, not an
    /// array, or any field lacks `name`/`type` — the caller turns that into
    /// a single `schema` finding instead of aborting.
    pub fn parse(raw: &Json) -> Result<Schema, SchemaMalformed> {
        let malformed = |detail: String| SchemaMalformed {
            detail,
            received_repr: truncate_chars(&raw.to_string(), 200),
        };

        let fields_json = raw
            .get("fields")
            .ok_or_else(|| malformed("missing 'fields'".to_string()))?;
        let fields_arr = fields_json
            .as_array()
            .ok_or_else(|| malformed("'fields' is not a list".to_string()))?;

        let mut fields = Vec::with_capacity(fields_arr.len());
        for (idx, field_json) in fields_arr.iter().enumerate() {
            let name = field_json
                .get("name")
                .and_then(Json::as_str)
                .ok_or_else(|| malformed(format!("field at index {idx} is missing 'name'")))?
                .to_string();
            let raw_type = field_json
                .get("type")
                .cloned()
                .ok_or_else(|| malformed(format!("field '{name}' is missing 'type'")))?;

            let is_union = raw_type.is_array();
            let candidates = if let Some(list) = raw_type.as_array() {
                list.iter().map(FieldType::parse).collect()
            } else {
                vec![FieldType::parse(&raw_type)]
            };
            let has_default = field_json.get("default").is_some();

            fields.push(SchemaField {
                name,
                candidates,
                is_union,
                has_default,
                raw_type,
            });
        }

        Ok(Schema { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_union_with_null_as_optional() {
        let raw = serde_json::json!({
            "fields": [{"name": "codigo", "type": ["null", "int"], "default": null}]
        });
        let schema = Schema::parse(&raw).unwrap();
        assert!(schema.fields[0].is_optional());
    }

    #[test]
    fn parses_array_of_string_items() {
        let raw = serde_json::json!({
            "fields": [{"name": "tags", "type": {"type": "array", "items": "string"}}]
        });
        let schema = Schema::parse(&raw).unwrap();
        match &schema.fields[0].candidates[0] {
            FieldType::Array(inner) => assert_eq!(**inner, FieldType::String),
            other => panic!("expected array type, got {other:?}"),
        }
    }

    #[test]
    fn missing_fields_is_malformed() {
        let raw = serde_json::json!({"type": "record"});
        assert!(Schema::parse(&raw).is_err());
    }

    #[test]
    fn field_missing_name_is_malformed() {
        let raw = serde_json::json!({"fields": [{"type": "string"}]});
        assert!(Schema::parse(&raw).is_err());
    }
}
