//! Reading app specs and other JSON/YAML input files.

use std::fs;
use std::io::{self, Read};

use ocean_api::apps::AppSpec;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CliError;

/// Read `path`, or `stdin` when the path is `-`.
///
/// # Errors
///
/// Returns an error if the source cannot be read.
pub fn read_source<R: Read>(path: &str, stdin: &mut R) -> Result<Vec<u8>, CliError> {
    if path == "-" {
        let mut buf = Vec::new();
        stdin.read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read(path)?)
    }
}

/// Read and parse the app spec at `path` (`-` reads stdin).
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_app_spec(path: &str) -> Result<AppSpec, CliError> {
    let bytes = read_source(path, &mut io::stdin().lock())?;
    parse_app_spec(&bytes)
}

/// Parse a JSON or YAML app spec, rejecting fields the schema does not know.
///
/// # Errors
///
/// Returns [`CliError::SpecParse`] describing the first problem.
pub fn parse_app_spec(bytes: &[u8]) -> Result<AppSpec, CliError> {
    parse_strict(bytes).map_err(CliError::SpecParse)
}

/// Parse JSON or YAML into `T`, rejecting unknown fields.
///
/// # Errors
///
/// Returns a description of the first problem.
pub fn parse_strict<T>(bytes: &[u8]) -> Result<T, String>
where
    T: DeserializeOwned + Serialize,
{
    let raw: Value = serde_yaml::from_slice(bytes).map_err(|e| e.to_string())?;
    let typed: T = serde_json::from_value(raw.clone()).map_err(|e| e.to_string())?;
    let known = serde_json::to_value(&typed).map_err(|e| e.to_string())?;
    if let Some(path) = first_unknown_field(&raw, &known, "") {
        return Err(format!("unknown field \"{path}\""));
    }
    Ok(typed)
}

/// Walk `raw` against the re-serialized typed value. A key missing from the
/// typed side is unknown unless its value is empty, since empty values are
/// skipped on serialization.
fn first_unknown_field(raw: &Value, known: &Value, path: &str) -> Option<String> {
    match (raw, known) {
        (Value::Object(raw), Value::Object(known)) => raw.iter().find_map(|(key, value)| {
            let child = if path.is_empty() {
                key.clone()
            } else {
                format!("{path}.{key}")
            };
            match known.get(key) {
                Some(known_value) => first_unknown_field(value, known_value, &child),
                None if is_empty(value) => None,
                None => Some(child),
            }
        }),
        (Value::Array(raw), Value::Array(known)) => raw
            .iter()
            .zip(known)
            .enumerate()
            .find_map(|(i, (r, k))| first_unknown_field(r, k, &format!("{path}[{i}]"))),
        _ => None,
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.values().all(is_empty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_and_json() {
        let from_yaml = parse_app_spec(b"name: test\nservices:\n  - name: web\n    github:\n      repo: o/r\n")
            .expect("yaml");
        let from_json = parse_app_spec(br#"{"name":"test","services":[{"name":"web","github":{"repo":"o/r"}}]}"#)
            .expect("json");
        assert_eq!(from_yaml, from_json);
        assert_eq!(from_yaml.services[0].github.as_ref().map(|g| g.repo.as_str()), Some("o/r"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = parse_app_spec(b"name: test\nservices:\n  - name: web\n    colour: blue\n").expect_err("unknown");
        assert_eq!(err.to_string(), "parsing app spec: unknown field \"services[0].colour\"");
    }

    #[test]
    fn test_empty_known_fields_are_accepted() {
        let spec = parse_app_spec(b"name: test\nregion: ''\nservices:\n  - name: web\n    github:\n      repo: o/r\n      deploy_on_push: false\n")
            .expect("parse");
        assert_eq!(spec.name, "test");
    }

    #[test]
    fn test_wrong_shape_is_a_parse_error() {
        let err = parse_app_spec(b"hello").expect_err("string");
        assert!(err.to_string().starts_with("parsing app spec: invalid type: string \"hello\""), "{err}");
    }

    #[test]
    fn test_read_source_from_stdin() {
        let mut stdin: &[u8] = b"name: piped\n";
        let bytes = read_source("-", &mut stdin).expect("read");
        assert_eq!(bytes, b"name: piped\n");
    }
}
