// Two real processes sharing queues by name.
// The parent test re-runs this test binary, filtered down to the ignored
// child entry point, with the queue names in the environment.

use dmxp_eventqueue::{EventQueueBuilder, EventType, Message, Timeout};
use serde_json::json;
use std::process::Command;
use std::time::Duration;

const CHILD_ENV: &str = "DMXP_TEST_CHILD_QUEUES";
const MESSAGES: usize = 20;

fn unique_name(tag: &str) -> String {
    format!("dmxp_test_xproc_{tag}_{}_{}", std::process::id(), fastrand::u32(..))
}

#[test]
fn parent_and_child_process_share_a_queue() {
    let _ = env_logger::builder().is_test(true).try_init();

    let to_child = EventQueueBuilder::new(unique_name("down"))
        .with_capacity(32)
        .create()
        .unwrap();
    let to_parent = EventQueueBuilder::new(unique_name("up"))
        .with_capacity(8)
        .create()
        .unwrap();

    for i in 0..MESSAGES {
        let message = Message::new("supervisor", EventType::TriggerHlsStream, json!(i));
        assert!(to_child.try_put(&message, Timeout::NoWait));
    }

    let output = Command::new(std::env::current_exe().unwrap())
        .args(["--exact", "child_process_entry", "--ignored", "--nocapture"])
        .env(CHILD_ENV, format!("{},{}", to_child.name(), to_parent.name()))
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "child failed:\n{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    let reply = to_parent
        .try_get(Duration::from_secs(5))
        .expect("child should have replied");
    assert_eq!(reply.source(), "player");
    assert_eq!(reply.event_type(), &EventType::SxmRunning);
    assert_eq!(reply.payload(), &json!(MESSAGES));
    assert_ne!(reply.to_string(), "");

    assert_eq!(to_child.shutdown(), 0);
    assert_eq!(to_parent.shutdown(), 0);
}

#[test]
#[ignore = "entry point for the child process of parent_and_child_process_share_a_queue"]
fn child_process_entry() {
    let Ok(names) = std::env::var(CHILD_ENV) else {
        return;
    };
    let (down, up) = names.split_once(',').expect("two queue names");

    let inbox = EventQueueBuilder::new(down).attach().unwrap();
    let outbox = EventQueueBuilder::new(up).attach().unwrap();

    let mut expected = 0;
    while let Some(message) = inbox.try_get(Duration::from_secs(2)) {
        assert_eq!(message.event_type(), &EventType::TriggerHlsStream);
        assert_eq!(message.payload(), &json!(expected));
        expected += 1;
        if expected == MESSAGES {
            break;
        }
    }
    assert_eq!(expected, MESSAGES);

    let reply = Message::new("player", EventType::SxmRunning, json!(expected));
    assert!(outbox.try_put(&reply, Timeout::NoWait));
}
