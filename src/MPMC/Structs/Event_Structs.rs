// Events carried through the queue

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Kind of an event.
///
/// The known tags are the ones exchanged between the stream supervisor and
/// the player. Any other tag is still accepted and carried as `Custom`, so
/// a newer peer can send kinds this build does not know about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    ResetSxm,
    SxmRunning,
    SxmStopped,
    UpdateChannels,
    UpdateMetadata,
    HlsStreamStarted,
    HlsStderrLines,
    TriggerHlsStream,
    KillHlsStream,
    StartDebugPlayer,
    StopDebugPlayer,
    Custom(String),
}

impl EventType {
    /// Every known kind, in wire-code order.
    pub const KNOWN: [EventType; 11] = [
        EventType::ResetSxm,
        EventType::SxmRunning,
        EventType::SxmStopped,
        EventType::UpdateChannels,
        EventType::UpdateMetadata,
        EventType::HlsStreamStarted,
        EventType::HlsStderrLines,
        EventType::TriggerHlsStream,
        EventType::KillHlsStream,
        EventType::StartDebugPlayer,
        EventType::StopDebugPlayer,
    ];

    /// The string tag of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            EventType::ResetSxm => "RESET_SXM",
            EventType::SxmRunning => "SXM_RUNNING",
            EventType::SxmStopped => "SXM_STOPPED",
            EventType::UpdateChannels => "CHANNELS",
            EventType::UpdateMetadata => "METADATA",
            EventType::HlsStreamStarted => "HLS_STREAM",
            EventType::HlsStderrLines => "HLS_STDERR",
            EventType::TriggerHlsStream => "TRIGGER_HLS",
            EventType::KillHlsStream => "KILL_HLS_STREAM",
            EventType::StartDebugPlayer => "DEBUG_START_PLAYER",
            EventType::StopDebugPlayer => "DEBUG_STOP_PLAYER",
            EventType::Custom(tag) => tag,
        }
    }

    /// Numeric code stored in the slot header. 0 for custom tags.
    pub fn code(&self) -> u32 {
        Self::KNOWN
            .iter()
            .position(|known| known == self)
            .map_or(0, |i| i as u32 + 1)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, EventType::Custom(_))
    }
}

impl From<&str> for EventType {
    fn from(tag: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|known| known.as_str() == tag)
            .cloned()
            .unwrap_or_else(|| EventType::Custom(tag.to_owned()))
    }
}

impl From<String> for EventType {
    fn from(tag: String) -> Self {
        match EventType::from(tag.as_str()) {
            EventType::Custom(_) => EventType::Custom(tag),
            known => known,
        }
    }
}

impl From<EventType> for String {
    fn from(kind: EventType) -> Self {
        match kind {
            EventType::Custom(tag) => tag,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event passed between workers.
///
/// Immutable once built. `created_at` is informational: the queue delivers
/// in arrival order, not timestamp order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "created_at")]
    created_at_ns: u64,
    source: String,
    #[serde(rename = "type")]
    event_type: EventType,
    payload: Value,
}

impl Message {
    pub fn new(
        source: impl Into<String>,
        event_type: impl Into<EventType>,
        payload: impl Into<Value>,
    ) -> Self {
        let created_at_ns = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;

        Self {
            created_at_ns,
            source: source.into(),
            event_type: event_type.into(),
            payload: payload.into(),
        }
    }

    /// Creation time, nanoseconds since the Unix epoch.
    pub fn created_at_ns(&self) -> u64 {
        self.created_at_ns
    }

    pub fn created_at(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_nanos(self.created_at_ns)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn into_parts(self) -> (String, EventType, Value) {
        (self.source, self.event_type, self.payload)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}: {}", self.source, self.event_type, self.payload)
    }
}
