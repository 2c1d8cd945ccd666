// In demos/status_publisher.rs
//
// Plays the stream supervisor: creates the queue and publishes status events
// until Ctrl+C, then shuts the queue down.
//
//   RUST_LOG=debug cargo run --example status_publisher [queue_name]
use dmxp_eventqueue::{EventQueueBuilder, EventType, Message, QueueError, Timeout};
use serde_json::json;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<(), QueueError> {
    env_logger::init();

    let name = env::args().nth(1).unwrap_or_else(|| "mortis_events".to_string());
    let queue = EventQueueBuilder::new(&name).with_capacity(64).create()?;
    println!("Publisher: created queue {name} ({} slots)", queue.capacity());

    let running = Arc::new(AtomicBool::new(true));
    let running_for_handler = Arc::clone(&running);

    // Handle Ctrl+C to clean up
    ctrlc::set_handler(move || {
        running_for_handler.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    let channels = json!([
        {"id": "octane", "name": "Octane", "number": 37},
        {"id": "thepulse", "name": "The Pulse", "number": 15},
    ]);
    queue.try_put(
        &Message::new("sxm", EventType::SxmRunning, json!({"port": 9999})),
        Timeout::default(),
    );
    queue.try_put(
        &Message::new("sxm", EventType::UpdateChannels, channels),
        Timeout::default(),
    );

    let mut tick = 0u64;
    while running.load(Ordering::SeqCst) {
        let metadata = Message::new(
            "sxm",
            EventType::UpdateMetadata,
            json!({"channel": "octane", "tick": tick}),
        );
        if !queue.try_put(&metadata, Timeout::default()) {
            println!("Publisher: queue full, listener is behind");
        }
        tick += 1;
        std::thread::sleep(Duration::from_millis(500));
    }

    queue.try_put(
        &Message::new("sxm", EventType::SxmStopped, json!(0)),
        Timeout::default(),
    );

    let flushed = queue.shutdown();
    println!("Publisher: shut down, {flushed} event(s) were never read");

    Ok(())
}
