//! Serde helper functions for identity-provider documents.
//!
//! Providers are inconsistent about absent values: some omit the key, some
//! send `null`, some send `""`. These helpers collapse all three to `None`.

use serde::{Deserialize, Deserializer};

/// Deserialize an optional string, treating empty strings as None.
///
/// Whitespace is preserved: `" "` is a value, `""` is not.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.is_empty()))
}

/// Deserialize a claim that is only meaningful as a non-empty string.
///
/// Any other JSON type (number, bool, object) is treated as absent rather
/// than failing the whole document.
pub fn deserialize_string_claim<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestStruct {
        #[serde(default, deserialize_with = "deserialize_optional_string")]
        string_field: Option<String>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct ClaimStruct {
        #[serde(default, deserialize_with = "deserialize_string_claim")]
        id: Option<String>,
    }

    #[test]
    fn test_deserialize_optional_string_empty() {
        let json = r#"{"string_field": ""}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(result.string_field, None);
    }

    #[test]
    fn test_deserialize_optional_string_null() {
        let json = r#"{"string_field": null}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(result.string_field, None);
    }

    #[test]
    fn test_deserialize_optional_string_missing() {
        let result: TestStruct = serde_json::from_str("{}").unwrap();
        assert_eq!(result.string_field, None);
    }

    #[test]
    fn test_deserialize_optional_string_whitespace_is_kept() {
        let json = r#"{"string_field": " "}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(result.string_field, Some(" ".to_string()));
    }

    #[test]
    fn test_deserialize_optional_string_value() {
        let json = r#"{"string_field": "hello"}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(result.string_field, Some("hello".to_string()));
    }

    #[test]
    fn test_deserialize_string_claim_value() {
        let result: ClaimStruct = serde_json::from_str(r#"{"id": "kp_123"}"#).unwrap();
        assert_eq!(result.id, Some("kp_123".to_string()));
    }

    #[test]
    fn test_deserialize_string_claim_non_string_is_absent() {
        let result: ClaimStruct = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(result.id, None);

        let result: ClaimStruct = serde_json::from_str(r#"{"id": {"nested": true}}"#).unwrap();
        assert_eq!(result.id, None);
    }

    #[test]
    fn test_deserialize_string_claim_empty_is_absent() {
        let result: ClaimStruct = serde_json::from_str(r#"{"id": ""}"#).unwrap();
        assert_eq!(result.id, None);
    }
}
