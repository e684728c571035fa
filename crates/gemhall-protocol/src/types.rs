//! Identifiers and the action payload shape.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque identifier for a player within a room.
///
/// Generated by the room store (eight characters from an alphabet without
/// look-alike glyphs), but nothing downstream relies on that shape.
/// `#[serde(transparent)]` keeps it a plain JSON string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wraps a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Primary identifier of a room.
///
/// A room can also be reached through its mnemonic alias; both are plain
/// strings when a client refers to a room, so lookups take `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Wraps a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Short mnemonic alias for a room, e.g. `tiger`.
///
/// Always lowercase; lookups by alias ignore case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Wraps an alias, normalizing it to lowercase.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Action payload
// ---------------------------------------------------------------------------

/// An in-game action exactly as a client sends it.
///
/// ```json
/// { "type": "take_tokens", "payload": { "colors": ["white", "blue"] } }
/// ```
///
/// The `type` string is deliberately left unparsed here; the engine maps it
/// to a closed set of actions and rejects anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub payload: ActionPayload,
}

impl ActionRequest {
    /// Builds a request with an empty payload.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: ActionPayload::default(),
        }
    }

    /// Sets the `colors` list.
    pub fn with_colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.payload.colors = colors.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the `cardId` field.
    pub fn with_card(mut self, card_id: impl Into<String>) -> Self {
        self.payload.card_id = Some(card_id.into());
        self
    }

    /// Sets the `source` field.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.payload.source = Some(source.into());
        self
    }

    /// Sets one entry of the `adjust` map.
    pub fn with_adjust(mut self, color: impl Into<String>, delta: i32) -> Self {
        self.payload.adjust.insert(color.into(), delta);
        self
    }
}

/// Optional fields an action may carry. Which ones matter depends on the
/// action type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPayload {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub adjust: BTreeMap<String, i32>,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerId::new("K7M2QX9A")).unwrap();
        assert_eq!(json, "\"K7M2QX9A\"");
    }

    #[test]
    fn test_room_id_display_is_raw_value() {
        assert_eq!(RoomId::new("QH4T2Z").to_string(), "QH4T2Z");
    }

    #[test]
    fn test_room_code_is_lowercased() {
        assert_eq!(RoomCode::new("Tiger").as_str(), "tiger");
    }

    #[test]
    fn test_action_request_decodes_without_payload() {
        let req: ActionRequest = serde_json::from_str(r#"{"type":"pass"}"#).unwrap();
        assert_eq!(req.kind, "pass");
        assert_eq!(req.payload, ActionPayload::default());
    }

    #[test]
    fn test_action_request_decodes_camel_case_fields() {
        let req: ActionRequest = serde_json::from_str(
            r#"{"type":"buy_card","payload":{"cardId":"1_red_03","source":"reserved"}}"#,
        )
        .unwrap();
        assert_eq!(req.payload.card_id.as_deref(), Some("1_red_03"));
        assert_eq!(req.payload.source.as_deref(), Some("reserved"));
    }

    #[test]
    fn test_action_request_decodes_adjust_map() {
        let req: ActionRequest = serde_json::from_str(
            r#"{"type":"adjust_tokens","payload":{"adjust":{"red":2,"blue":-1}}}"#,
        )
        .unwrap();
        assert_eq!(req.payload.adjust.get("red"), Some(&2));
        assert_eq!(req.payload.adjust.get("blue"), Some(&-1));
    }

    #[test]
    fn test_action_request_omits_empty_fields() {
        let req = ActionRequest::new("take_tokens").with_colors(["white"]);
        let json: serde_json::Value = serde_json::to_value(&req).unwrap();
        assert_eq!(json["type"], "take_tokens");
        assert_eq!(json["payload"]["colors"][0], "white");
        assert!(json["payload"].get("cardId").is_none());
        assert!(json["payload"].get("adjust").is_none());
    }
}
