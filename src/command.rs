//! Wire Commands
//!
//! The JSON command schema accepted by the server. Exactly one variant is
//! active per request; required fields missing for the active variant are
//! rejected at parse time.

use serde::{Deserialize, Serialize};

use crate::error::CommandError;

/// Commands a client can send
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command")]
pub enum Command {
    /// Move and/or resize every window owned by `pid`. Omitted geometry
    /// fields keep their current value.
    #[serde(rename = "setPosition", rename_all = "camelCase")]
    SetPosition {
        pid: u32,
        #[serde(default)]
        x: Option<i32>,
        #[serde(default)]
        y: Option<i32>,
        #[serde(default)]
        width: Option<u32>,
        #[serde(default)]
        height: Option<u32>,
        #[serde(default)]
        frontmost_only: bool,
    },

    /// Raise and focus the window of `pid` whose title matches.
    #[serde(rename = "focus")]
    Focus { pid: u32, title: String },
}

impl Command {
    /// Parse a raw JSON request body.
    pub fn parse(body: &[u8]) -> Result<Self, CommandError> {
        serde_json::from_slice(body).map_err(|e| CommandError::BadRequest(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_set_position() {
        let cmd = Command::parse(
            br#"{"command":"setPosition","pid":1234,"x":10,"y":20,"width":800,"height":600,"frontmostOnly":true}"#,
        )
        .unwrap();
        match cmd {
            Command::SetPosition { pid, x, y, width, height, frontmost_only } => {
                assert_eq!(pid, 1234);
                assert_eq!((x, y), (Some(10), Some(20)));
                assert_eq!((width, height), (Some(800), Some(600)));
                assert!(frontmost_only);
            }
            _ => panic!("Wrong command variant"),
        }
    }

    #[test]
    fn geometry_fields_default_to_absent() {
        let cmd = Command::parse(br#"{"command":"setPosition","pid":42}"#).unwrap();
        match cmd {
            Command::SetPosition { pid, x, y, width, height, frontmost_only } => {
                assert_eq!(pid, 42);
                assert_eq!((x, y, width, height), (None, None, None, None));
                assert!(!frontmost_only);
            }
            _ => panic!("Wrong command variant"),
        }
    }

    #[test]
    fn focus_requires_title() {
        let err = Command::parse(br#"{"command":"focus","pid":42}"#).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn unknown_command_is_rejected() {
        let err = Command::parse(br#"{"command":"minimize","pid":42}"#).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn unparsable_body_is_rejected() {
        let err = Command::parse(b"not json at all").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
