//! Protocol module - JSON message types for the AI adapter
//!
//! Line-delimited JSON. Every message carries `type`, `seq` (sequence number)
//! and `ts` (timestamp in ms).

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use hole_match_core::snapshot::LevelSnapshot;
use hole_match_types::GameAction;

pub const PROTOCOL_VERSION: &str = "1.0.0";
pub const GAME_ID: &str = "hole-match";

// ============== Client -> Game Messages ==============

/// Client hello message (first message on a connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    #[serde(default = "default_true")]
    pub stream_observations: bool,
}

impl Default for RequestedCapabilities {
    fn default() -> Self {
        Self {
            stream_observations: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// `command`: `tap` needs a column, `restart` and `next` take nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u8>,
}

impl CommandMessage {
    /// Translate into a game action.
    pub fn to_action(&self) -> Result<GameAction, (ErrorCode, String)> {
        if self.action.eq_ignore_ascii_case("tap") {
            return match self.column {
                Some(column) => Ok(GameAction::TapColumn(column)),
                None => Err((ErrorCode::InvalidCommand, "tap requires a column".to_string())),
            };
        }
        match GameAction::from_str(&self.action) {
            Some(action @ (GameAction::Restart | GameAction::NextLevel)) => Ok(action),
            _ => Err((
                ErrorCode::InvalidCommand,
                format!("Unknown action: {}", self.action),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub action: String,
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    NotController,
    ControllerActive,
    InvalidCommand,
    NotEligible,
    NoContainer,
    LevelOver,
    /// Restart or next level asked for a level that could not be built.
    LevelLoadFailed,
    Backpressure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignedRole {
    Controller,
    Observer,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<u64>,
    pub game_id: String,
    pub commands: Vec<String>,
}

/// Acknowledgment for an applied command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub seq: u64,
    pub ts: u64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

/// Periodic view of the running level.
#[derive(Debug, Clone, Serialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub seq: u64,
    pub ts: u64,
    pub level_index: usize,
    pub level_count: usize,
    pub state_hash: String,
    pub level: LevelSnapshot,
}

// ============== Message Parsing ==============

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Control(ControlMessage),
    Unknown { seq: u64 },
}

/// Parse a JSON line. Unknown `type` values are not a parse error.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Deserialize)]
    #[serde(tag = "type", rename_all = "snake_case")]
    enum Inbound {
        Hello(HelloMessage),
        Command(CommandMessage),
        Control(ControlMessage),
    }

    match serde_json::from_str::<Inbound>(json) {
        Ok(Inbound::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(Inbound::Command(m)) => Ok(ParsedMessage::Command(m)),
        Ok(Inbound::Control(m)) => Ok(ParsedMessage::Control(m)),
        Err(e) => {
            let value: serde_json::Value = serde_json::from_str(json)?;
            let msg_type = value.get("type").and_then(|v| v.as_str()).unwrap_or("");
            if matches!(msg_type, "hello" | "command" | "control") {
                return Err(e);
            }
            let seq = value.get("seq").and_then(|v| v.as_u64()).unwrap_or(0);
            Ok(ParsedMessage::Unknown { seq })
        }
    }
}

/// Pull `"seq": N` out of a line that failed to parse.
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse().ok()
}

// ============== Builders ==============

pub fn create_welcome(
    seq: u64,
    client_id: u64,
    role: AssignedRole,
    controller_id: Option<u64>,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: "welcome".to_string(),
        seq,
        ts: current_timestamp_ms(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        client_id,
        role,
        controller_id,
        game_id: GAME_ID.to_string(),
        commands: ["tap", "restart", "next"].map(String::from).to_vec(),
    }
}

pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: "ack".to_string(),
        seq,
        ts: current_timestamp_ms(),
        status: "ok".to_string(),
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: "error".to_string(),
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Build an observation. `seq` is the server's observation counter.
pub fn build_observation(
    snapshot: &LevelSnapshot,
    level_index: usize,
    level_count: usize,
    seq: u64,
) -> ObservationMessage {
    ObservationMessage {
        msg_type: "observation".to_string(),
        seq,
        ts: current_timestamp_ms(),
        level_index,
        level_count,
        state_hash: format!("{:016x}", state_hash(snapshot, level_index)),
        level: snapshot.clone(),
    }
}

/// Stable hash of everything an observer can see, minus the clock.
pub fn state_hash(snapshot: &LevelSnapshot, level_index: usize) -> u64 {
    let mut hasher = Fnv1aHasher::new();
    level_index.hash(&mut hasher);
    snapshot.status.hash(&mut hasher);
    snapshot.time_remaining_secs.hash(&mut hasher);
    snapshot.timer_warning.hash(&mut hasher);
    snapshot.columns.hash(&mut hasher);
    snapshot.containers.hash(&mut hasher);
    snapshot.cars.hash(&mut hasher);
    snapshot.pending_partners.hash(&mut hasher);
    snapshot.fallback_active.hash(&mut hasher);
    hasher.finish()
}

/// 64-bit FNV-1a. `DefaultHasher` output is not stable across releases.
#[derive(Debug, Clone)]
pub struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Default for Fnv1aHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= u64::from(b);
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use hole_match_types::LevelStatus;

    #[test]
    fn parses_hello_with_defaults() {
        let line = r#"{"type":"hello","seq":1,"client":{"name":"bot"},"protocol_version":"1.0.0"}"#;
        match parse_message(line).unwrap() {
            ParsedMessage::Hello(h) => {
                assert_eq!(h.client.name, "bot");
                assert!(h.requested.stream_observations);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn tap_command_maps_to_column() {
        let line = r#"{"type":"command","seq":2,"action":"tap","column":3}"#;
        let ParsedMessage::Command(cmd) = parse_message(line).unwrap() else {
            panic!("expected command");
        };
        assert_eq!(cmd.to_action().unwrap(), GameAction::TapColumn(3));
    }

    #[test]
    fn tap_without_column_is_invalid() {
        let cmd = CommandMessage {
            seq: 1,
            ts: 0,
            action: "tap".into(),
            column: None,
        };
        assert_eq!(cmd.to_action().unwrap_err().0, ErrorCode::InvalidCommand);
    }

    #[test]
    fn cursor_actions_are_not_remote_commands() {
        let cmd = CommandMessage {
            seq: 1,
            ts: 0,
            action: "left".into(),
            column: None,
        };
        assert!(cmd.to_action().is_err());
    }

    #[test]
    fn unknown_type_keeps_seq() {
        match parse_message(r#"{"type":"ping","seq":9}"#).unwrap() {
            ParsedMessage::Unknown { seq } => assert_eq!(seq, 9),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn seq_is_recovered_from_broken_lines() {
        assert_eq!(extract_seq_best_effort(r#"{"seq": 42, "type": "#), Some(42));
        assert_eq!(extract_seq_best_effort("garbage"), None);
    }

    #[test]
    fn state_hash_ignores_clock_but_not_status() {
        let a = LevelSnapshot::default();
        let mut b = a.clone();
        b.elapsed_ms = 5_000;
        assert_eq!(state_hash(&a, 0), state_hash(&b, 0));
        b.status = LevelStatus::Won;
        assert_ne!(state_hash(&a, 0), state_hash(&b, 0));
        assert_ne!(state_hash(&a, 0), state_hash(&a, 1));
    }

    #[test]
    fn error_codes_are_snake_case() {
        let err = create_error(3, ErrorCode::NotController, "nope");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains(r#""code":"not_controller""#));
        assert!(json.contains(r#""type":"error""#));

        let err = create_error(4, ErrorCode::LevelLoadFailed, "bad level");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains(r#""code":"level_load_failed""#));
    }
}
