// tests/region_test.rs

use dmxp_eventqueue::Core::region::QueueRegion;
use dmxp_eventqueue::Core::{create_shared_memory, unlink_shared_memory};
use dmxp_eventqueue::MPMC::Buffer::layout::RegionHeader;
use dmxp_eventqueue::MPMC::Buffer::RingBuffer;
use dmxp_eventqueue::MPMC::Structs::MessageMeta;
use std::io;
use std::path::Path;

fn unique_name(tag: &str) -> String {
    format!("dmxp_test_region_{tag}_{}_{}", std::process::id(), fastrand::u32(..))
}

/// Pid of a process that has already exited.
fn exited_pid() -> u32 {
    let mut child = std::process::Command::new("true").spawn().unwrap();
    let pid = child.id();
    child.wait().unwrap();
    pid
}

#[test]
fn test_create_lays_out_one_ring() -> io::Result<()> {
    let name = unique_name("basic");
    let region = QueueRegion::create(&name, 16, 256)?;

    assert!(region.is_initialized());
    assert_eq!(region.name(), name);
    assert_eq!(region.creator_pid(), std::process::id());
    assert_eq!(region.buffer().capacity(), 16);
    assert_eq!(region.buffer().payload_size(), 256);
    assert!(region.buffer().is_empty());
    assert_eq!(region.size(), QueueRegion::required_size(16, 256).unwrap());
    assert!(format!("{region:?}").contains("QueueRegion"));

    unlink_shared_memory(&name)
}

#[test]
fn test_required_size_covers_header_and_band() {
    let header = std::mem::size_of::<RegionHeader>();
    assert_eq!(
        QueueRegion::required_size(32, 512),
        Some(header + RingBuffer::band_size(32, 512).unwrap())
    );
    assert_eq!(QueueRegion::required_size(1usize << 58, 1024), None);
    assert_eq!(QueueRegion::required_size(usize::MAX / 64 + 1, 0), None);
}

#[test]
fn test_capacity_must_be_power_of_two() {
    for capacity in [0, 3, 100] {
        let name = unique_name("pow2");
        let err = QueueRegion::create(&name, capacity, 64).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(!Path::new("/dev/shm").join(&name).exists());
    }
}

#[test]
fn test_overflowing_shape_is_rejected() {
    let name = unique_name("overflow");
    let err = QueueRegion::create(&name, 1usize << 58, 1024).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    assert!(!Path::new("/dev/shm").join(&name).exists());
}

#[test]
fn test_attach_shares_the_ring() -> io::Result<()> {
    let name = unique_name("attach");
    let creator = QueueRegion::create(&name, 8, 64)?;
    let opener = QueueRegion::attach(&name)?;

    assert_eq!(opener.buffer().capacity(), 8);
    assert_eq!(opener.buffer().payload_size(), 64);
    assert_eq!(opener.creator_pid(), std::process::id());

    assert!(creator.buffer().enqueue(MessageMeta::default(), b"across mappings").is_some());
    let (_, payload) = opener.buffer().dequeue().expect("message should cross mappings");
    assert_eq!(payload, b"across mappings");

    opener.buffer().close();
    assert!(creator.buffer().is_closed());

    unlink_shared_memory(&name)
}

#[test]
fn test_attach_rejects_foreign_region() -> io::Result<()> {
    let name = unique_name("foreign");
    let _raw = create_shared_memory(std::mem::size_of::<RegionHeader>() + 4096, &name)?;

    let err = QueueRegion::attach(&name).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);

    unlink_shared_memory(&name)
}

#[test]
fn test_attach_rejects_header_larger_than_mapping() -> io::Result<()> {
    let name = unique_name("lying");
    let region = QueueRegion::create(&name, 8, 64)?;

    // Claim more slots than the mapping holds
    unsafe {
        let header = region.header_ptr() as *mut RegionHeader;
        (*header).channel.capacity = 1 << 20;
    }

    let err = QueueRegion::attach(&name).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);

    unlink_shared_memory(&name)
}

#[test]
fn test_create_refuses_a_live_region() -> io::Result<()> {
    let name = unique_name("live");
    let first = QueueRegion::create(&name, 8, 64)?;
    assert!(first.buffer().enqueue(MessageMeta::default(), b"keep me").is_some());

    let err = QueueRegion::create(&name, 8, 64).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);

    // The running owner's queue is untouched
    let (_, payload) = first.buffer().dequeue().unwrap();
    assert_eq!(payload, b"keep me");

    unlink_shared_memory(&name)
}

#[test]
fn test_create_replaces_region_of_exited_creator() -> io::Result<()> {
    let name = unique_name("stale");
    {
        let stale = QueueRegion::create(&name, 4, 64)?;
        assert!(stale.buffer().enqueue(MessageMeta::default(), b"old").is_some());
        unsafe {
            let header = stale.header_ptr() as *mut RegionHeader;
            (*header).creator_pid = exited_pid();
        }
    }

    let fresh = QueueRegion::create(&name, 8, 128)?;
    assert_eq!(fresh.creator_pid(), std::process::id());
    assert_eq!(fresh.buffer().capacity(), 8);
    assert!(fresh.buffer().is_empty());

    unlink_shared_memory(&name)
}

#[test]
fn test_create_replaces_zeroed_region() -> io::Result<()> {
    let name = unique_name("zeroed");
    drop(create_shared_memory(4096, &name)?);

    let region = QueueRegion::create(&name, 4, 64)?;
    assert!(region.is_initialized());

    unlink_shared_memory(&name)
}
