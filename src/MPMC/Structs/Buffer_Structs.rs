// This is the per-slot transport header of the event ring buffer

// no atomics in MessageMeta; keep as plain integral types for ABI

/// Transport-only metadata that precedes each payload in a slot.
/// ABI-stable across processes; all fields are native-endian plain integers.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageMeta {
    pub message_id: u64,
    /// Creation time of the event, nanoseconds since the Unix epoch.
    pub timestamp_ns: u64,
    /// Unused, zero. Keeps the 40-byte layout.
    pub reserved: u32,
    /// `EventType::code()` of the encoded event (0 for custom tags).
    pub message_type: u32,
    pub sender_pid: u32,
    pub sender_runtime: u16,
    pub flags: u16,
    pub payload_len: u32,
}

/// Runtime identifier written by this crate into `sender_runtime`.
pub const RUNTIME_RUST: u16 = 1;

/// Payload is a JSON-encoded `Message`.
pub const META_FLAG_JSON: u16 = 1 << 0;
