mod builder;
mod consumer;
mod error;
mod producer;
mod queue;

pub use builder::EventQueueBuilder;
pub use consumer::Drain;
pub use error::QueueError;
pub use queue::{BoundedEventQueue, Timeout, DEFAULT_POLLING_TIMEOUT};
pub use Structs::{EventType, Message};

pub mod Buffer {
    pub mod Buffer;
    pub mod Buffer_impl;
    pub mod layout;
    pub use Buffer::{RingBuffer, SlotHeader, DEFAULT_MAX_MESSAGE_SIZE}; // re-export for stable path
}

pub mod Structs {
    pub mod Buffer_Structs;
    pub mod Event_Structs;
    pub use Buffer_Structs::MessageMeta; // re-export for stable path
    pub use Event_Structs::{EventType, Message};
}
