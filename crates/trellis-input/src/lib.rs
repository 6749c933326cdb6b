//! Trellis Input
//!
//! Raw input surface between a host windowing library and the Trellis UI
//! core. The host translates its native events into [`RawEvent`]s and pushes
//! them into an [`EventQueue`]; the UI drains the queue once per frame and
//! dispatches the resulting [`EventBatch`].

pub mod event;

pub use event::{
    DeviceId, Event, EventBatch, EventQueue, EventStats, HandleStatus, Key, PointerButton,
    RawEvent,
};
