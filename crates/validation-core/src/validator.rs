//! The structural validator: `(record, schema) -> findings`.
//!
//! Pure and deterministic — no I/O, no mutation of its inputs. This is the
//! one function the rest of the pipeline routes blobs by.

use crate::error::ValidatorError;
use crate::schema::Schema;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// A single field-level (or schema-level) departure from the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub field: String,
    pub message: String,
    pub expected: String,
    pub received: String,
}

impl Finding {
    fn new(field: impl Into<String>, message: impl Into<String>, expected: impl Into<String>, received: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            expected: expected.into(),
            received: received.into(),
        }
    }
}

/// Validate `record` against `schema`, returning the ordered list of
/// findings. An empty list means the record conforms (§3 invariant S4).
///
/// `schema` is the raw Avro-like JSON document as stored in the registry;
/// parsing happens on every call since schemas are small and callers
/// already cache the parsed document per job (§4.8).
pub fn validate(record: &Value, schema: &Json) -> Result<Vec<Finding>, ValidatorError> {
    let parsed = match Schema::parse(schema) {
        Ok(s) => s,
        Err(malformed) => {
            return Ok(vec![Finding::new(
                "schema",
                format!("invalid or malformed schema: {}", malformed.detail),
                "a valid schema",
                malformed.received_repr,
            )]);
        }
    };

    let record_obj = record
        .as_object()
        .ok_or(ValidatorError::NotAnObject(record.type_name()))?;

    let mut findings = Vec::new();

    let schema_names: std::collections::HashSet<&str> =
        parsed.fields.iter().map(|f| f.name.as_str()).collect();

    // Step 3: extra fields, in the record's own iteration order.
    for (key, value) in record_obj.iter() {
        if !schema_names.contains(key.as_str()) {
            findings.push(Finding::new(
                key.clone(),
                "extra field not defined in schema",
                "absent",
                value.display_truncated(50),
            ));
        }
    }

    // Step 4: every schema-defined field, in schema order.
    for field in &parsed.fields {
        let value = record_obj.get(&field.name).cloned().unwrap_or(Value::Null);
        let optional = field.is_optional();

        if value.is_null() {
            if optional {
                continue;
            }
            findings.push(Finding::new(
                field.name.clone(),
                "required field missing",
                field.expected_repr(),
                "None",
            ));
            continue;
        }

        let is_valid = field.candidates.iter().any(|c| c.matches(&value));
        if !is_valid {
            findings.push(Finding::new(
                field.name.clone(),
                "incorrect data type",
                field.expected_repr(),
                format!("{} (type: {})", value.display_truncated(50), value.type_name()),
            ));
        }
    }

    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Json {
        serde_json::json!({
            "type": "record",
            "namespace": "rfb.json",
            "name": "R",
            "fields": [
                {"name": "name", "type": "string"},
                {"name": "age", "type": "int"},
                {"name": "salary", "type": "double"},
                {"name": "data_criacao", "type": "string"},
                {"name": "data_nascimento", "type": "string"},
                {"name": "hora_registro", "type": "string"},
                {"name": "tags", "type": {"type": "array", "items": "string"}},
                {"name": "codigo", "type": ["null", "int"], "default": null}
            ]
        })
    }

    fn valid_record() -> Value {
        serde_json::json!({
            "name": "João",
            "age": 30,
            "salary": 5000.50,
            "data_criacao": "2025-11-14",
            "data_nascimento": "1995-01-10",
            "hora_registro": "12:22:00",
            "tags": ["a", "b"],
            "codigo": 123
        })
        .into()
    }

    #[test]
    fn scenario_1_valid_record_has_no_findings() {
        let findings = validate(&valid_record(), &schema()).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn scenario_2_extra_field_reported() {
        let mut record = valid_record();
        if let Value::Object(obj) = &mut record {
            obj.insert("extra_field".to_string(), Value::Int(123));
        }
        let findings = validate(&record, &schema()).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].field, "extra_field");
        assert_eq!(findings[0].message, "extra field not defined in schema");
    }

    #[test]
    fn scenario_3_missing_required_fields() {
        let record: Value = serde_json::json!({
            "name": "João",
            "age": 30,
            "salary": 5000.50,
            "tags": ["a", "b"],
        })
        .into();
        let findings = validate(&record, &schema()).unwrap();
        let missing: Vec<&str> = findings.iter().map(|f| f.field.as_str()).collect();
        assert!(missing.contains(&"data_criacao"));
        assert!(missing.contains(&"data_nascimento"));
        assert!(missing.contains(&"hora_registro"));
        assert_eq!(findings.len(), 3);
        assert!(findings.iter().all(|f| f.message == "required field missing"));
    }

    #[test]
    fn scenario_4_wrong_type() {
        let mut record = valid_record();
        if let Value::Object(obj) = &mut record {
            obj.insert("age".to_string(), Value::String("30".to_string()));
        }
        let findings = validate(&record, &schema()).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].field, "age");
        assert_eq!(findings[0].message, "incorrect data type");
    }

    #[test]
    fn scenario_5_optional_null_is_valid() {
        let mut record = valid_record();
        if let Value::Object(obj) = &mut record {
            obj.insert("codigo".to_string(), Value::Null);
        }
        let findings = validate(&record, &schema()).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn bool_never_matches_int_or_double() {
        let mut record = valid_record();
        if let Value::Object(obj) = &mut record {
            obj.insert("age".to_string(), Value::Bool(true));
        }
        let findings = validate(&record, &schema()).unwrap();
        assert!(findings.iter().any(|f| f.field == "age"));
    }

    #[test]
    fn non_object_record_is_an_error_not_a_finding() {
        let record: Value = serde_json::json!([1, 2, 3]).into();
        let err = validate(&record, &schema()).unwrap_err();
        assert_eq!(err, ValidatorError::NotAnObject("array"));
    }

    #[test]
    fn malformed_schema_is_a_single_finding() {
        let broken_schema = serde_json::json!({"type": "record"});
        let findings = validate(&valid_record(), &broken_schema).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].field, "schema");
    }

    #[test]
    fn purity_does_not_mutate_inputs() {
        let record = valid_record();
        let schema_doc = schema();
        let before = record.clone();
        let _ = validate(&record, &schema_doc);
        assert_eq!(record, before);
    }
}
