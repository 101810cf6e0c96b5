//! Request parameters and response bodies of the DBE tree API.
//!
//! Real paths are `/`-separated and start with the file (mount) name. The
//! server joins path segments with `\`.

use serde::Deserialize;
use serde_json::Value;
use tfs_hooks::NodeSnapshot;

use crate::error::{ClientError, ClientResult};

pub const DBE_SEPARATOR: &str = "\\";

pub const OPEN: &str = "/api/db/tree";
pub const ADD: &str = "/api/db/tree/add";
pub const DELETE: &str = "/api/db/tree/delete";
pub const UPDATE: &str = "/api/db/tree/update";
pub const PROPS_UPDATE: &str = "/api/db/tree/props/update";
pub const PROPS_DELETE: &str = "/api/db/tree/props/delete";

fn segments(real_path: &str) -> Vec<&str> {
    real_path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Split a real path into the file name and the server-side remainder.
pub fn split_file(real_path: &str) -> ClientResult<(String, String)> {
    let segments = segments(real_path);
    match segments.split_first() {
        Some((file, rest)) => Ok((file.to_string(), rest.join(DBE_SEPARATOR))),
        None => Err(ClientError::InvalidPath(real_path.to_string())),
    }
}

/// The whole real path in server form, file name first.
pub fn server_path(real_path: &str) -> ClientResult<String> {
    let segments = segments(real_path);
    if segments.is_empty() {
        return Err(ClientError::InvalidPath(real_path.to_string()));
    }
    Ok(segments.join(DBE_SEPARATOR))
}

/// Split a real path into the parent in server form and the new node name.
pub fn split_parent(real_path: &str) -> ClientResult<(String, String)> {
    let segments = segments(real_path);
    match segments.split_last() {
        Some((name, parent)) if !parent.is_empty() => {
            Ok((parent.join(DBE_SEPARATOR), name.to_string()))
        }
        _ => Err(ClientError::InvalidPath(real_path.to_string())),
    }
}

#[derive(Debug, Deserialize)]
pub struct Prop {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Deserialize)]
pub struct SubKey {
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct TreeData {
    #[serde(default)]
    pub props: Vec<Prop>,
    #[serde(default)]
    pub sub_keys: Vec<SubKey>,
}

#[derive(Debug, Deserialize)]
pub struct OpenResponse {
    pub data: TreeData,
}

#[derive(Debug, Deserialize)]
pub struct WriteResponse {
    pub code: i64,
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl From<TreeData> for NodeSnapshot {
    fn from(data: TreeData) -> Self {
        NodeSnapshot::new(
            data.props.into_iter().map(|p| (p.name, value_text(p.value))),
            data.sub_keys.into_iter().map(|k| k.label),
        )
    }
}

pub fn parse_open(body: &str) -> ClientResult<NodeSnapshot> {
    let rsp: OpenResponse = serde_json::from_str(body).map_err(|e| ClientError::Decode(e.to_string()))?;
    Ok(rsp.data.into())
}

pub fn check_write(body: &str) -> ClientResult<()> {
    let rsp: WriteResponse = serde_json::from_str(body).map_err(|e| ClientError::Decode(e.to_string()))?;
    if rsp.code != 0 {
        return Err(ClientError::Code {
            code: rsp.code,
            body: body.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_file() {
        assert_eq!(
            split_file("/master/tableA/row1").unwrap(),
            ("master".to_string(), "tableA\\row1".to_string())
        );
        assert_eq!(split_file("/master").unwrap(), ("master".to_string(), String::new()));
        assert!(split_file("/").is_err());
    }

    #[test]
    fn test_server_path_and_parent() {
        assert_eq!(server_path("/master/tableA").unwrap(), "master\\tableA");
        assert_eq!(
            split_parent("/master/tableA/row9").unwrap(),
            ("master\\tableA".to_string(), "row9".to_string())
        );
        assert!(split_parent("/master").is_err());
        assert!(server_path("").is_err());
    }

    #[test]
    fn test_parse_open() {
        let body = r#"{"code":0,"data":{
            "props":[{"name":"type","value":"row"},{"name":"size","value":12},{"name":"note","value":null}],
            "sub_keys":[{"label":"col1"},{"label":"col2"}]}}"#;
        let snapshot = parse_open(body).unwrap();
        assert_eq!(snapshot.attributes.get("type").map(String::as_str), Some("row"));
        assert_eq!(snapshot.attributes.get("size").map(String::as_str), Some("12"));
        assert_eq!(snapshot.attributes.get("note").map(String::as_str), Some(""));
        assert_eq!(snapshot.child_names, vec!["col1", "col2"]);
    }

    #[test]
    fn test_parse_open_rejects_missing_data() {
        assert!(matches!(parse_open(r#"{"code":0}"#), Err(ClientError::Decode(_))));
    }

    #[test]
    fn test_check_write() {
        assert!(check_write(r#"{"code":0,"msg":"ok"}"#).is_ok());
        match check_write(r#"{"code":17,"msg":"exists"}"#) {
            Err(ClientError::Code { code, body }) => {
                assert_eq!(code, 17);
                assert!(body.contains("exists"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(check_write("<html>"), Err(ClientError::Decode(_))));
    }
}
