//! Small value helpers shared by node executors.

use serde_json::Value;

/// Render a value the way templates do: strings verbatim, scalars via
/// `to_string`, structures as compact JSON, null as empty.
pub fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Numeric coercion: numbers as-is, numeric strings parsed.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_string() {
        assert_eq!(display_string(&json!("x")), "x");
        assert_eq!(display_string(&json!(3)), "3");
        assert_eq!(display_string(&json!(null)), "");
        assert_eq!(display_string(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_as_f64_coercion() {
        assert_eq!(as_f64(&json!(5)), Some(5.0));
        assert_eq!(as_f64(&json!("5")), Some(5.0));
        assert_eq!(as_f64(&json!(" 2.5 ")), Some(2.5));
        assert_eq!(as_f64(&json!("abc")), None);
        assert_eq!(as_f64(&json!(true)), None);
    }
}
