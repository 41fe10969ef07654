//! Launch-data file: the host's persisted state map as a JSON object.

use std::path::Path;

use serde_json::{Map, Value};
use stream_common::StreamError;

/// Read the launch-data map. A missing file is an empty map.
pub fn read_launch_data(path: &Path) -> Result<Map<String, Value>, StreamError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no launch data, starting empty");
            return Ok(Map::new());
        }
        Err(e) => return Err(e.into()),
    };
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(&raw)? {
        Value::Object(map) => Ok(map),
        _ => Err(StreamError::LaunchData(format!(
            "{} does not contain a JSON object",
            path.display()
        ))),
    }
}

/// Merge `state` into the existing launch data and write it back.
///
/// Keys the session does not own (`readonly`, `width`, ...) are kept.
pub fn write_state(path: &Path, state: &Map<String, Value>) -> Result<(), StreamError> {
    let mut data = read_launch_data(path).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "existing launch data unreadable, overwriting");
        Map::new()
    });
    for (key, value) in state {
        data.insert(key.clone(), value.clone());
    }
    let json = serde_json::to_string_pretty(&Value::Object(data))?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), "session state saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_or_empty_file_is_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmi.launch_data");
        assert!(read_launch_data(&path).unwrap().is_empty());
        std::fs::write(&path, "  \n").unwrap();
        assert!(read_launch_data(&path).unwrap().is_empty());
    }

    #[test]
    fn non_object_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmi.launch_data");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            read_launch_data(&path),
            Err(StreamError::LaunchData(_))
        ));
        std::fs::write(&path, "{broken").unwrap();
        assert!(matches!(read_launch_data(&path), Err(StreamError::Json(_))));
    }

    #[test]
    fn state_is_merged_into_existing_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmi.launch_data");
        std::fs::write(&path, r#"{"readonly": true, "flowchart": "old"}"#).unwrap();

        let mut state = Map::new();
        state.insert("flowchart".into(), json!("new"));
        write_state(&path, &state).unwrap();

        let data = read_launch_data(&path).unwrap();
        assert_eq!(data.get("flowchart"), Some(&json!("new")));
        assert_eq!(data.get("readonly"), Some(&json!(true)));
    }

    #[test]
    fn state_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.json");
        let mut state = Map::new();
        state.insert("flowchart".into(), json!("{}"));
        write_state(&path, &state).unwrap();
        assert_eq!(read_launch_data(&path).unwrap(), state);
    }
}
