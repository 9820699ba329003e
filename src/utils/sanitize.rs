use serde_json::Value;

/// Masks donor-identifying and secret fields in JSON payloads for logging.
pub fn sanitize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sanitized = serde_json::Map::new();
            for (key, val) in map {
                let sanitized_val = if is_sensitive_field(key) {
                    mask_value(val)
                } else {
                    sanitize_json(val)
                };
                sanitized.insert(key.clone(), sanitized_val);
            }
            Value::Object(sanitized)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sanitize_json).collect()),
        _ => value.clone(),
    }
}

fn is_sensitive_field(key: &str) -> bool {
    matches!(
        key.to_lowercase().as_str(),
        "phone_number"
            | "phonenumber"
            | "password"
            | "secret"
            | "token"
            | "api_key"
            | "authorization"
    )
}

fn mask_value(value: &Value) -> Value {
    match value {
        Value::String(s) if s.chars().count() > 8 => {
            let chars: Vec<char> = s.chars().collect();
            let visible: String = chars[..4].iter().collect();
            let end: String = chars[chars.len() - 4..].iter().collect();
            Value::String(format!("{}****{}", visible, end))
        }
        _ => Value::String("****".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_phone_number() {
        let input = json!({
            "phone_number": "254712345678",
            "amount": "500.00"
        });

        let sanitized = sanitize_json(&input);

        assert_eq!(sanitized["phone_number"], "2547****5678");
        assert_eq!(sanitized["amount"], "500.00");
    }

    #[test]
    fn test_sanitize_camel_case_and_short_values() {
        let input = json!({ "phoneNumber": "0712", "token": 42 });
        let sanitized = sanitize_json(&input);
        assert_eq!(sanitized["phoneNumber"], "****");
        assert_eq!(sanitized["token"], "****");
    }

    #[test]
    fn test_sanitize_nested() {
        let input = json!({
            "payments": [{ "phone_number": "254700000001", "selected_bank": "KCB" }]
        });

        let sanitized = sanitize_json(&input);

        assert!(sanitized["payments"][0]["phone_number"]
            .as_str()
            .unwrap()
            .contains("****"));
        assert_eq!(sanitized["payments"][0]["selected_bank"], "KCB");
    }
}
