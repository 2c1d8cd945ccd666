// Layout conformance tests for the shared memory ABI.
// These tests assert sizes, alignments, and field offsets for
// MessageMeta, SlotHeader and the control area. They also print the
// observed values to aid debugging when a mismatch occurs on a given platform.
use dmxp_eventqueue::MPMC::Buffer::layout::{ChannelEntry, RegionHeader};
use dmxp_eventqueue::MPMC::Buffer::{RingBuffer, SlotHeader};
use dmxp_eventqueue::MPMC::Structs::MessageMeta;
use memoffset::offset_of;
use std::mem::{align_of, size_of};

#[test]
fn test_message_meta_layout() {
    // Calculate expected size with 8-byte alignment (due to u64 fields).
    let raw = 8 + 8 + 4 + 4 + 4 + 2 + 2 + 4; // 36 bytes of fields
    let aligned = (raw + 7) & !7; // round up to 8-byte multiple => 40

    let size = size_of::<MessageMeta>();
    let align = align_of::<MessageMeta>();
    let off_message_id = offset_of!(MessageMeta, message_id);
    let off_timestamp_ns = offset_of!(MessageMeta, timestamp_ns);
    let off_reserved = offset_of!(MessageMeta, reserved);
    let off_message_type = offset_of!(MessageMeta, message_type);
    let off_sender_pid = offset_of!(MessageMeta, sender_pid);
    let off_sender_runtime = offset_of!(MessageMeta, sender_runtime);
    let off_flags = offset_of!(MessageMeta, flags);
    let off_payload_len = offset_of!(MessageMeta, payload_len);

    println!(
        "MessageMeta => size: {size}, expected: {aligned}, align: {align} (u64 align: {}), offsets: [message_id:{off_message_id}, timestamp_ns:{off_timestamp_ns}, reserved:{off_reserved}, message_type:{off_message_type}, sender_pid:{off_sender_pid}, sender_runtime:{off_sender_runtime}, flags:{off_flags}, payload_len:{off_payload_len}]",
        align_of::<u64>()
    );

    assert_eq!(size, aligned);
    assert_eq!(align, align_of::<u64>());
    assert_eq!(off_message_id, 0);
    assert_eq!(off_timestamp_ns, 8);
    assert_eq!(off_reserved, 16);
    assert_eq!(off_message_type, 20);
    assert_eq!(off_sender_pid, 24);
    assert_eq!(off_sender_runtime, 28);
    assert_eq!(off_flags, 30);
    assert_eq!(off_payload_len, 32);
}

#[test]
fn test_slot_header_layout() {
    let size = size_of::<SlotHeader>();
    let align = align_of::<SlotHeader>();
    println!(
        "SlotHeader => size: {size}, align: {align}, offsets: [sequence:{}, meta:{}]",
        offset_of!(SlotHeader, sequence),
        offset_of!(SlotHeader, meta)
    );

    assert_eq!(align, 64);
    assert_eq!(size, 64);
    assert_eq!(offset_of!(SlotHeader, sequence), 0);
    assert_eq!(offset_of!(SlotHeader, meta), 8);
}

#[test]
fn test_slot_stride_is_cache_aligned() {
    for payload in [0, 1, 63, 64, 65, 1000, 64 * 1024] {
        let stride = RingBuffer::slot_stride(payload).unwrap();
        assert_eq!(stride % 64, 0, "payload {payload}");
        assert!(stride >= size_of::<SlotHeader>() + payload);
        assert!(stride < size_of::<SlotHeader>() + payload + 64);
    }
    assert_eq!(RingBuffer::band_size(8, 64), Some(8 * 128));
}

#[test]
fn test_control_area_layout() {
    assert_eq!(align_of::<ChannelEntry>(), 128);
    assert_eq!(size_of::<ChannelEntry>() % 128, 0);
    assert_eq!(align_of::<RegionHeader>(), 128);
    assert_eq!(size_of::<RegionHeader>() % 128, 0);
    assert_eq!(offset_of!(RegionHeader, magic), 0);
    assert_eq!(offset_of!(RegionHeader, version), 8);
    assert_eq!(offset_of!(RegionHeader, creator_pid), 12);
    assert_eq!(offset_of!(RegionHeader, channel) % 128, 0);
}
