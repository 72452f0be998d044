use crate::model::connection::ConnectionId;
use crate::model::room::RoomName;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Whether the sender is currently sharing its screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenState {
    On,
    Off,
}

impl ScreenState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenState::On => "on",
            ScreenState::Off => "off",
        }
    }
}

/// Body of a message that the server relays between room members.
///
/// Everything except `from` and `room` is opaque to the server and is passed
/// through unmodified. `from` and `room` are stamped by the server; values
/// supplied by a client are never trusted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relayed {
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub from: Option<ConnectionId>,

    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub room: Option<RoomName>,

    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Relayed {
    pub fn with_field(key: &str, value: Value) -> Self {
        let mut payload = Map::new();
        payload.insert(key.to_string(), value);
        Self {
            payload,
            ..Default::default()
        }
    }

    /// Session description carried by `offer` / `answer`.
    pub fn sdp(&self) -> Option<&Value> {
        self.payload.get("sdp").filter(|v| !v.is_null())
    }

    /// Connectivity candidate carried by `ice`.
    pub fn candidate(&self) -> Option<&Value> {
        self.payload.get("candidate").filter(|v| !v.is_null())
    }

    pub fn screen(&self) -> Option<ScreenState> {
        self.payload
            .get("screen")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Overwrites the sender and room with server-observed values.
    pub fn stamp(&mut self, from: ConnectionId, room: RoomName) {
        self.from = Some(from);
        self.room = Some(room);
    }
}

/// Fields whose junk values must not make the whole frame unparseable:
/// client-supplied `from`/`room` are overwritten anyway, and `join.room` /
/// `pong.ts` fall back to their absent meaning.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| serde_json::from_value(v).ok()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SignalMessage {
    /// Client → server: move into `room` (default room when absent, blank
    /// or not a string).
    Join {
        #[serde(
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        room: Option<String>,
    },
    Offer(Relayed),
    Answer(Relayed),
    Ice(Relayed),
    State(Relayed),
    /// Client → server heartbeat response. Any `pong` counts, whatever
    /// its `ts` holds.
    Pong {
        #[serde(
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        ts: Option<Number>,
    },
    /// Server → client heartbeat probe, `ts` in unix milliseconds.
    Ping { ts: u64 },
    Welcome {
        room: RoomName,
        id: ConnectionId,
    },
    Peers {
        room: RoomName,
        count: usize,
        ids: Vec<ConnectionId>,
    },
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("frame is not a JSON object")]
    NotAnObject,

    #[error("frame has no string 'type' field")]
    MissingType,

    #[error("unknown message type '{0}'")]
    UnknownType(String),

    #[error("invalid '{kind}' message: {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

impl SignalMessage {
    pub const KINDS: [&'static str; 9] = [
        "join", "offer", "answer", "ice", "state", "pong", "ping", "welcome", "peers",
    ];

    /// Parses one text frame, classifying why a frame was rejected.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let value: Value = serde_json::from_str(text).map_err(FrameError::Malformed)?;

        let kind = match &value {
            Value::Object(object) => match object.get("type") {
                Some(Value::String(kind)) => kind.clone(),
                _ => return Err(FrameError::MissingType),
            },
            _ => return Err(FrameError::NotAnObject),
        };

        if !Self::KINDS.contains(&kind.as_str()) {
            return Err(FrameError::UnknownType(kind));
        }

        serde_json::from_value(value).map_err(|source| FrameError::InvalidPayload { kind, source })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SignalMessage::Join { .. } => "join",
            SignalMessage::Offer(_) => "offer",
            SignalMessage::Answer(_) => "answer",
            SignalMessage::Ice(_) => "ice",
            SignalMessage::State(_) => "state",
            SignalMessage::Pong { .. } => "pong",
            SignalMessage::Ping { .. } => "ping",
            SignalMessage::Welcome { .. } => "welcome",
            SignalMessage::Peers { .. } => "peers",
        }
    }

    /// Mutable access to the relayed body for offer/answer/ice/state.
    pub fn relayed_mut(&mut self) -> Option<&mut Relayed> {
        match self {
            SignalMessage::Offer(body)
            | SignalMessage::Answer(body)
            | SignalMessage::Ice(body)
            | SignalMessage::State(body) => Some(body),
            _ => None,
        }
    }
}
