use crate::error::{GuardError, Result};
use serde::Deserialize;
use serde_json::Value;

/// Keys checked, in order, for the edited file inside the tool arguments.
pub const PATH_KEYS: &[&str] = &["file_path", "path"];

/// Raw pre-tool-use payload. Accepts both `{tool, args}` and the host's
/// native `{tool_name, tool_input}` shape, or a mix; the documented names win
/// when both are present. Everything else is ignored.
#[derive(Debug, Deserialize)]
struct HookPayload {
    #[serde(default)]
    tool: Option<String>,
    #[serde(default)]
    tool_name: Option<String>,
    #[serde(default)]
    args: Option<Value>,
    #[serde(default)]
    tool_input: Option<Value>,
}

impl HookPayload {
    fn tool(&self) -> Option<&str> {
        [&self.tool, &self.tool_name]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|t| !t.trim().is_empty())
    }

    fn file_path(&self) -> Option<String> {
        [&self.args, &self.tool_input]
            .into_iter()
            .flatten()
            .find_map(extract_path)
    }
}

/// A proposed file modification, built fresh from each payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub tool_name: String,
    /// Empty when the payload carried no usable path.
    pub file_path: String,
}

impl EditRequest {
    pub fn new(tool_name: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            file_path: file_path.into(),
        }
    }

    /// Parse a hook payload. Fails only when the JSON is unreadable or names
    /// no tool; a missing path is returned as an empty `file_path`.
    pub fn parse(input: &str) -> Result<Self> {
        let payload: HookPayload =
            serde_json::from_str(input).map_err(GuardError::MalformedPayload)?;
        let tool_name = payload
            .tool()
            .ok_or(GuardError::MissingField("tool"))?
            .to_string();
        Ok(Self {
            tool_name,
            file_path: payload.file_path().unwrap_or_default(),
        })
    }
}

fn extract_path(args: &Value) -> Option<String> {
    PATH_KEYS
        .iter()
        .find_map(|key| args.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Pull whatever path a malformed payload might still carry, for the audit
/// line. Never fails.
pub fn salvage_path(input: &str) -> String {
    serde_json::from_str::<Value>(input)
        .ok()
        .and_then(|v| {
            ["args", "tool_input"]
                .iter()
                .find_map(|k| v.get(k).and_then(extract_path))
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_documented_shape() {
        let req =
            EditRequest::parse(r#"{"tool":"Write","args":{"file_path":"src/foo.py","content":"x"}}"#)
                .unwrap();
        assert_eq!(req, EditRequest::new("Write", "src/foo.py"));
    }

    #[test]
    fn parses_native_hook_shape() {
        let req = EditRequest::parse(
            r#"{"session_id":"abc","hook_event_name":"PreToolUse","tool_name":"Edit","tool_input":{"file_path":"/p/a.ts","old_string":"a","new_string":"b"}}"#,
        )
        .unwrap();
        assert_eq!(req, EditRequest::new("Edit", "/p/a.ts"));
    }

    #[test]
    fn both_spellings_in_one_payload() {
        let req = EditRequest::parse(
            r#"{"tool":"Write","tool_name":"Write","args":{"file_path":"src/foo.py"},"tool_input":{"file_path":"src/foo.py"}}"#,
        )
        .unwrap();
        assert_eq!(req, EditRequest::new("Write", "src/foo.py"));

        // A blank documented field falls through to the native one.
        let req = EditRequest::parse(
            r#"{"tool":"","tool_name":"Edit","args":{},"tool_input":{"path":"lib/x.js"}}"#,
        )
        .unwrap();
        assert_eq!(req, EditRequest::new("Edit", "lib/x.js"));
    }

    #[test]
    fn path_key_fallback() {
        let req = EditRequest::parse(r#"{"tool":"MultiEdit","args":{"path":"lib/x.js"}}"#).unwrap();
        assert_eq!(req.file_path, "lib/x.js");
    }

    #[test]
    fn file_path_wins_over_path() {
        let req =
            EditRequest::parse(r#"{"tool":"Write","args":{"path":"b.py","file_path":"a.py"}}"#)
                .unwrap();
        assert_eq!(req.file_path, "a.py");
    }

    #[test]
    fn missing_path_is_empty() {
        let req = EditRequest::parse(r#"{"tool":"Write","args":{}}"#).unwrap();
        assert_eq!(req.file_path, "");
        let req = EditRequest::parse(r#"{"tool":"Write"}"#).unwrap();
        assert_eq!(req.file_path, "");
        let req = EditRequest::parse(r#"{"tool":"Write","args":{"file_path":42}}"#).unwrap();
        assert_eq!(req.file_path, "");
    }

    #[test]
    fn missing_tool_is_an_error() {
        assert!(matches!(
            EditRequest::parse(r#"{"args":{"file_path":"a.py"}}"#),
            Err(GuardError::MissingField("tool"))
        ));
        assert!(matches!(
            EditRequest::parse(r#"{"tool":"  ","args":{}}"#),
            Err(GuardError::MissingField("tool"))
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            EditRequest::parse("not json"),
            Err(GuardError::MalformedPayload(_))
        ));
        assert!(matches!(
            EditRequest::parse(r#"{"tool": 7}"#),
            Err(GuardError::MalformedPayload(_))
        ));
    }

    #[test]
    fn salvage_reads_path_from_otherwise_bad_payload() {
        assert_eq!(salvage_path(r#"{"args":{"file_path":"a.py"}}"#), "a.py");
        assert_eq!(salvage_path(r#"{"tool_input":{"path":"b.py"}}"#), "b.py");
        assert_eq!(salvage_path("{{{"), "");
    }
}
