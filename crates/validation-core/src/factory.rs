//! Resolves a file-format validator by extension, caching instances.
//!
//! Only the JSON format is implemented. `csv`, `xml`, and `avro` are
//! reserved keys that must fail with `UnsupportedFormat` rather than being
//! silently absent — a caller asking for `.csv` should get a clear error,
//! not a "no such extension" surprise once those formats land.

use crate::error::{ConvertError, FactoryError};
use crate::value::Value;
use std::collections::HashMap;

/// A format-specific converter from raw bytes to one or more records.
pub trait FormatValidator: Send + Sync {
    /// Parse `data` into one or more records. A top-level JSON array yields
    /// one record per element; a top-level object yields a single record.
    fn convert(&self, data: &[u8]) -> Result<Vec<Value>, ConvertError>;
}

/// The JSON format validator (§4.3).
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonValidator;

impl FormatValidator for JsonValidator {
    fn convert(&self, data: &[u8]) -> Result<Vec<Value>, ConvertError> {
        let text = std::str::from_utf8(data).map_err(|e| ConvertError::ParseError {
            format: "json".to_string(),
            detail: e.to_string(),
        })?;
        let parsed: serde_json::Value =
            serde_json::from_str(text).map_err(|e| ConvertError::ParseError {
                format: "json".to_string(),
                detail: e.to_string(),
            })?;
        match parsed {
            serde_json::Value::Array(items) => {
                Ok(items.into_iter().map(Value::from).collect())
            }
            other => Ok(vec![Value::from(other)]),
        }
    }
}

enum CacheSlot {
    Json(JsonValidator),
}

impl CacheSlot {
    fn as_format_validator(&self) -> &dyn FormatValidator {
        match self {
            CacheSlot::Json(v) => v,
        }
    }
}

/// Reserved format keys with no implementation behind them yet (§4.2).
const RESERVED_UNIMPLEMENTED: &[&str] = &["csv", "xml", "avro"];

/// Maps lowercase file extension to a validator instance, caching by
/// extension for the lifetime of the factory.
#[derive(Default)]
pub struct ValidatorFactory {
    cache: HashMap<String, CacheSlot>,
}

impl ValidatorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the validator for `filename` by its lowercase extension.
    pub fn resolve(&mut self, filename: &str) -> Result<&dyn FormatValidator, FactoryError> {
        let ext = filename
            .rsplit('.')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();

        if !self.cache.contains_key(&ext) {
            let slot = match ext.as_str() {
                "json" => CacheSlot::Json(JsonValidator),
                other if RESERVED_UNIMPLEMENTED.contains(&other) => {
                    return Err(FactoryError::UnsupportedFormat(ext));
                }
                _ => return Err(FactoryError::UnsupportedFormat(ext)),
            };
            self.cache.insert(ext.clone(), slot);
        }

        Ok(self.cache.get(&ext).unwrap().as_format_validator())
    }

    /// Clear the cache (for tests).
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn size(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_json_by_extension() {
        let mut factory = ValidatorFactory::new();
        let validator = factory.resolve("payload.JSON").unwrap();
        let records = validator.convert(b"{\"a\": 1}").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn caches_by_extension() {
        let mut factory = ValidatorFactory::new();
        factory.resolve("a.json").unwrap();
        factory.resolve("b.json").unwrap();
        assert_eq!(factory.size(), 1);
    }

    #[test]
    fn reserved_formats_fail_unsupported() {
        let mut factory = ValidatorFactory::new();
        let err = factory.resolve("data.csv").unwrap_err();
        assert_eq!(err, FactoryError::UnsupportedFormat("csv".to_string()));
    }

    #[test]
    fn unknown_extension_fails_unsupported() {
        let mut factory = ValidatorFactory::new();
        assert!(factory.resolve("data.parquet").is_err());
    }

    #[test]
    fn clear_resets_cache_size() {
        let mut factory = ValidatorFactory::new();
        factory.resolve("a.json").unwrap();
        factory.clear();
        assert_eq!(factory.size(), 0);
    }

    #[test]
    fn json_array_yields_one_record_per_element() {
        let mut factory = ValidatorFactory::new();
        let validator = factory.resolve("batch.json").unwrap();
        let records = validator.convert(b"[{\"a\":1},{\"a\":2}]").unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let mut factory = ValidatorFactory::new();
        let validator = factory.resolve("bad.json").unwrap();
        assert!(validator.convert(b"{not json").is_err());
    }
}
