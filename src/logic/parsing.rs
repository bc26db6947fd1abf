use serde_json::{Map, Value};

/// Entries of a listing response.
///
/// The backend answers either with a bare array or with `{ "items": [...] }`.
/// Any other shape counts as empty.
pub fn listing_items(body: &Value) -> &[Value] {
    let items = match body {
        Value::Object(obj) => obj.get("items"),
        other => Some(other),
    };
    items
        .and_then(|v| v.as_array())
        .map(|a| a.as_slice())
        .unwrap_or(&[])
}

/// Service name of a listing entry: `name`, falling back to `service_name`.
pub fn entry_name(entry: &Value) -> Option<&str> {
    ["name", "service_name"]
        .iter()
        .filter_map(|key| entry.get(*key).and_then(|v| v.as_str()))
        .find(|name| !name.is_empty())
}

pub fn service_names(body: &Value) -> Vec<String> {
    listing_items(body)
        .iter()
        .filter_map(entry_name)
        .map(str::to_string)
        .collect()
}

/// A dotted field path must have at least one segment and no empty ones.
pub fn validate_field_path(path: &str) -> anyhow::Result<()> {
    if path.split('.').any(str::is_empty) {
        return Err(anyhow::anyhow!("Invalid field path '{}'", path));
    }
    Ok(())
}

/// Expand `a.b.c` = v into `{"a": {"b": {"c": v}}}`.
pub fn nest_dotted(path: &str, value: Value) -> Value {
    path.rsplit('.').fold(value, |acc, key| {
        let mut obj = Map::new();
        obj.insert(key.to_string(), acc);
        Value::Object(obj)
    })
}

/// Interpret a CLI value either as a JSON literal or as a plain string.
pub fn parse_value(raw: &str, as_json: bool) -> anyhow::Result<Value> {
    if as_json {
        serde_json::from_str(raw)
            .map_err(|e| anyhow::anyhow!("Value '{}' is not valid JSON: {}", raw, e))
    } else {
        Ok(Value::String(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_service_names_accepts_both_listing_shapes() {
        let bare = json!([{ "name": "a" }, { "service_name": "b" }]);
        let wrapped = json!({ "items": [{ "name": "a" }, { "service_name": "b" }], "total": 2 });
        assert_eq!(service_names(&bare), vec!["a", "b"]);
        assert_eq!(service_names(&wrapped), vec!["a", "b"]);
    }

    #[test]
    fn test_service_names_skips_entries_without_a_name() {
        let body = json!([{ "name": "a" }, { "id": 7 }, { "name": "" }, { "name": null, "service_name": "c" }, 42]);
        assert_eq!(service_names(&body), vec!["a", "c"]);
    }

    #[test]
    fn test_listing_items_unexpected_shapes_are_empty() {
        assert!(listing_items(&json!({ "items": "nope" })).is_empty());
        assert!(listing_items(&json!({ "detail": "not found" })).is_empty());
        assert!(listing_items(&json!("text")).is_empty());
        assert!(listing_items(&Value::Null).is_empty());
    }

    #[test]
    fn test_nest_dotted() {
        assert_eq!(
            nest_dotted("argocd_application.path", json!(".")),
            json!({ "argocd_application": { "path": "." } })
        );
        assert_eq!(nest_dotted("port", json!(80)), json!({ "port": 80 }));
    }

    #[test]
    fn test_validate_field_path() {
        assert!(validate_field_path("argocd_application.path").is_ok());
        assert!(validate_field_path("port").is_ok());
        for bad in ["", ".", "a..b", ".a", "a."] {
            assert!(validate_field_path(bad).is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(".", false).unwrap(), json!("."));
        assert_eq!(parse_value("true", true).unwrap(), json!(true));
        assert!(parse_value(".", true).is_err());
    }
}
