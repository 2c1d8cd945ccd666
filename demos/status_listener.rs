// In demos/status_listener.rs
//
// Plays the player process: attaches to the publisher's queue and polls it,
// staying responsive to Ctrl+C between polls.
//
//   cargo run --example status_listener [queue_name]
use dmxp_eventqueue::{EventQueueBuilder, EventType, QueueError, Timeout};
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() -> Result<(), QueueError> {
    env_logger::init();

    let name = env::args().nth(1).unwrap_or_else(|| "mortis_events".to_string());

    println!("Listener: attaching to {name}...");
    let queue = match EventQueueBuilder::new(&name).attach() {
        Ok(queue) => queue,
        Err(e) => {
            eprintln!("Failed to attach (is the publisher running?): {e}");
            return Ok(());
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    let running_for_handler = Arc::clone(&running);
    ctrlc::set_handler(move || {
        running_for_handler.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    let mut received = 0usize;
    while running.load(Ordering::SeqCst) && !queue.is_closed() {
        let Some(event) = queue.try_get(Timeout::default()) else {
            continue;
        };
        received += 1;
        println!("{event}");

        if *event.event_type() == EventType::SxmStopped {
            break;
        }
    }

    println!("Listener: received {received} event(s)");
    Ok(())
}
