use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read a Kubernetes manifest file as JSON-compatible data.
///
/// Returns `None` when the file does not exist. A file that is present but
/// not valid YAML is kept verbatim as `{"_raw": <text>}`.
pub fn read_yaml_document(path: &Path) -> Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }
    debug!("Reading manifest {:?}", path);

    let text = fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read file {:?}: {}", path, e))?;

    match serde_yaml::from_str::<Value>(&text) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!("Failed to parse YAML {:?}: {}, keeping raw text", path, e);
            Ok(Some(json!({ "_raw": text })))
        }
    }
}

/// Load a JSON file, `None` when it does not exist.
pub fn load_json(path: &Path) -> Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read file {:?}: {}", path, e))?;
    let value = serde_json::from_str(&text)
        .map_err(|e| anyhow!("Failed to parse JSON {:?}: {}", path, e))?;
    Ok(Some(value))
}

/// Pretty-print `data` (2-space indent) into `dir/filename`, creating `dir`.
pub fn write_json(dir: &Path, filename: &str, data: &Value) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| anyhow!("Failed to create directory {:?}: {}", dir, e))?;
    let path = dir.join(filename);
    let text = serde_json::to_string_pretty(data)?;
    fs::write(&path, text).map_err(|e| anyhow!("Failed to write file {:?}: {}", path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_yaml_document_absent_parsed_and_raw() {
        let dir = tempfile::tempdir().unwrap();

        assert!(read_yaml_document(&dir.path().join("missing.yaml")).unwrap().is_none());

        let good = dir.path().join("svc.yaml");
        fs::write(&good, "
apiVersion: v1
kind: Service
metadata:
  name: orders-service
  namespace: orders
").unwrap();
        let value = read_yaml_document(&good).unwrap().unwrap();
        assert_eq!(value["metadata"]["name"], "orders-service");

        let bad = dir.path().join("bad.yaml");
        fs::write(&bad, "key: [unclosed").unwrap();
        let value = read_yaml_document(&bad).unwrap().unwrap();
        assert_eq!(value["_raw"], "key: [unclosed");
    }

    #[test]
    fn test_write_then_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("orders");
        let data = json!([{ "_id": "orders", "tags": ["demo"] }]);

        let path = write_json(&out, "services.json", &data).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("\n  {\n    \"_id\": \"orders\""));
        assert_eq!(load_json(&path).unwrap(), Some(data));
        assert_eq!(load_json(&out.join("nope.json")).unwrap(), None);
    }
}
