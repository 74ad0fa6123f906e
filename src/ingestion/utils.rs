//! Utility functions for common operations

use crate::error::Result;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// Build the HTTP client shared by the fetcher and the REST sink
pub fn http_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(300)) // 5 min timeout
        .build()?;
    Ok(client)
}

/// Missing amount => 0. Used for every amount and gram weight.
pub fn or_zero(value: Option<Decimal>) -> Decimal {
    value.unwrap_or(Decimal::ZERO)
}

/// Read a JSON amount, treating falsy values (null, false, "", 0) as missing
pub fn falsy_decimal<'de, D>(deserializer: D) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    decimal_from_json(&value).map_err(serde::de::Error::custom)
}

fn decimal_from_json(value: &Value) -> std::result::Result<Option<Decimal>, String> {
    let text = match value {
        Value::Null | Value::Bool(false) => return Ok(None),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => return Err(format!("expected a decimal amount, got {}", other)),
    };

    let amount = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| format!("expected a decimal amount, got {}", value))?;

    if amount.is_zero() {
        Ok(None)
    } else {
        Ok(Some(amount))
    }
}

/// Parse a decimal field from text, empty => 0
/// Returns None for non-numeric text
pub fn parse_decimal_or_zero(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(Decimal::ZERO);
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Parse an integer field from text
pub fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Render the FDC `measureUnit` field as text
/// Objects contribute their `id`, null becomes empty
pub fn measure_unit_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(map) => map.get("id").map(measure_unit_text).unwrap_or_default(),
        Value::Array(_) => value.to_string(),
    }
}

/// Split rows into contiguous batches of at most `size` rows
pub fn batches<T>(rows: &[T], size: usize) -> std::slice::Chunks<'_, T> {
    rows.chunks(size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_or_zero() {
        assert_eq!(or_zero(None), Decimal::ZERO);
        assert_eq!(or_zero(Some(Decimal::new(15, 1))), Decimal::new(15, 1));
    }

    #[test]
    fn test_decimal_from_json_falsy_values() {
        assert_eq!(decimal_from_json(&Value::Null), Ok(None));
        assert_eq!(decimal_from_json(&json!(false)), Ok(None));
        assert_eq!(decimal_from_json(&json!("")), Ok(None));
        assert_eq!(decimal_from_json(&json!(0)), Ok(None));
        assert_eq!(decimal_from_json(&json!(0.0)), Ok(None));
        assert_eq!(decimal_from_json(&json!(28.35)), Ok(Some(Decimal::new(2835, 2))));
        assert_eq!(decimal_from_json(&json!("1.5")), Ok(Some(Decimal::new(15, 1))));
        assert!(decimal_from_json(&json!(true)).is_err());
        assert!(decimal_from_json(&json!("heaps")).is_err());
    }

    #[test]
    fn test_parse_decimal_or_zero() {
        assert_eq!(parse_decimal_or_zero(""), Some(Decimal::ZERO));
        assert_eq!(parse_decimal_or_zero("  "), Some(Decimal::ZERO));
        assert_eq!(parse_decimal_or_zero("150"), Some(Decimal::from(150)));
        assert_eq!(parse_decimal_or_zero("0.25"), Some(Decimal::new(25, 2)));
        assert_eq!(parse_decimal_or_zero("1e-3"), Some(Decimal::new(1, 3)));
        assert_eq!(parse_decimal_or_zero("abc"), None);
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("170567"), Some(170_567));
        assert_eq!(parse_int(" 42 "), Some(42));
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("1.5"), None);
    }

    #[test]
    fn test_measure_unit_text() {
        assert_eq!(measure_unit_text(&json!("cup")), "cup");
        assert_eq!(measure_unit_text(&json!(1000)), "1000");
        assert_eq!(
            measure_unit_text(&json!({"id": 1001, "name": "tbsp", "abbreviation": "tbsp"})),
            "1001"
        );
        assert_eq!(measure_unit_text(&json!({"name": "undetermined"})), "");
        assert_eq!(measure_unit_text(&Value::Null), "");
    }

    #[test]
    fn test_batches_exhaustive_and_ordered() {
        let rows: Vec<usize> = (0..250).collect();
        let chunks: Vec<&[usize]> = batches(&rows, 100).collect();

        assert_eq!(chunks.len(), 3);
        assert_eq!(
            chunks.iter().map(|c| c.len()).collect::<Vec<_>>(),
            vec![100, 100, 50]
        );

        let rebuilt: Vec<usize> = chunks.concat();
        assert_eq!(rebuilt, rows);
    }

    #[test]
    fn test_batches_count_is_ceiling() {
        for k in [0usize, 1, 99, 100, 101, 200, 399] {
            let rows = vec![(); k];
            assert_eq!(batches(&rows, 100).count(), (k + 99) / 100);
        }
    }
}
