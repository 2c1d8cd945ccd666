// Module naming follows project convention (MPMC = Multi-Producer Multi-Consumer)
#[allow(non_snake_case)]
pub mod MPMC;

#[allow(non_snake_case)]
pub mod Core;

#[allow(non_snake_case)]
mod Debug {
    pub mod StructDebug;
}

pub use MPMC::{
    BoundedEventQueue, Drain, EventQueueBuilder, EventType, Message, QueueError, Timeout,
    DEFAULT_POLLING_TIMEOUT,
};
