use std::collections::VecDeque;
use std::time::Duration;

use trellis_core::alloc::HashMap;
use trellis_core::geometry::Size;
use trellis_core::math::Vec2;

/// Identifies the input device an event originated from.
///
/// Hosts with a single pointer can use [`DeviceId::PRIMARY`] everywhere;
/// multi-pointer hosts hand out one id per device so hover state stays
/// independent per pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub u32);

impl DeviceId {
    pub const PRIMARY: Self = Self(0);
}

/// Pointer button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    Other(u8),
}

/// Key identifier for keyboard events.
///
/// Printable input arrives separately as [`Event::TextInput`]; this enum
/// covers the control keys the framework routes to focused widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Delete,
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    /// Host-specific key code not covered above.
    Other(u32),
}

/// A single raw input event, before any widget targeting.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Pointer moved to a new position in host window coordinates.
    PointerMoved(Vec2),
    /// Pointer button pressed.
    PointerDown(PointerButton),
    /// Pointer button released.
    PointerUp(PointerButton),
    /// Pointer left the host window.
    PointerLeft,
    /// Key pressed.
    KeyDown(Key),
    /// Key released.
    KeyUp(Key),
    /// Committed text input (already layout-translated by the host).
    TextInput(String),
    /// Host window resized.
    WindowResized(Size<u32>),
    /// Host window close requested.
    CloseRequested,
}

/// An [`Event`] tagged with its monotonic timestamp and source device.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    /// Monotonic time since host startup.
    pub timestamp: Duration,
    pub device: DeviceId,
    pub event: Event,
}

impl RawEvent {
    pub fn new(timestamp: Duration, device: DeviceId, event: Event) -> Self {
        Self {
            timestamp,
            device,
            event,
        }
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HandleStatus: u8 {
        const HANDLED = 0b00000001;
        const CONSUMED = 0b00000010;
    }
}

impl HandleStatus {
    pub const fn is_consumed(&self) -> bool {
        self.contains(Self::CONSUMED)
    }

    pub const fn is_handled(&self) -> bool {
        self.contains(Self::HANDLED)
    }

    pub const fn consumed() -> Self {
        Self::from_bits_truncate(Self::HANDLED.bits() | Self::CONSUMED.bits())
    }

    pub const fn handled() -> Self {
        Self::from_bits_truncate(Self::HANDLED.bits())
    }

    pub const fn ignored() -> Self {
        Self::empty()
    }
}

/// Event queue with batching and deduplication.
pub struct EventQueue {
    /// Pending events for this frame.
    pending: VecDeque<RawEvent>,

    /// High-priority events (processed first).
    priority: VecDeque<RawEvent>,

    /// Deduplicated pointer positions (only latest per device kept).
    latest_pointer_pos: HashMap<DeviceId, RawEvent>,

    /// Statistics.
    stats: EventStats,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::with_capacity(64),
            priority: VecDeque::with_capacity(8),
            latest_pointer_pos: HashMap::new(),
            stats: EventStats::default(),
        }
    }

    /// Push an event to the queue (called from the host event handler).
    pub fn push(&mut self, event: RawEvent) {
        self.stats.events_received += 1;

        match event.event {
            // High priority - processed before everything else this frame
            Event::CloseRequested | Event::WindowResized(_) => {
                self.priority.push_back(event);
            }

            // Deduplicate - only the latest position per device survives
            Event::PointerMoved(_) => {
                self.latest_pointer_pos.insert(event.device, event);
            }

            // Normal priority
            _ => {
                self.pending.push_back(event);
            }
        }
    }

    /// Drain all queued events into a batch for this frame.
    pub fn drain(&mut self) -> EventBatch {
        let capacity = self.priority.len() + self.pending.len() + self.latest_pointer_pos.len();
        let mut events = Vec::with_capacity(capacity);

        // Priority events first
        events.extend(self.priority.drain(..));

        // Deduplicated pointer moves, oldest device timestamp first
        let mut moves: Vec<RawEvent> = self.latest_pointer_pos.drain().map(|(_, e)| e).collect();
        moves.sort_by_key(|e| e.timestamp);
        events.extend(moves);

        // Regular events
        events.extend(self.pending.drain(..));

        self.stats.events_processed += events.len();
        self.stats.events_dropped = self
            .stats
            .events_received
            .saturating_sub(self.stats.events_processed);

        EventBatch { events }
    }

    pub fn stats(&self) -> &EventStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = EventStats::default();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// A frame's worth of drained events.
pub struct EventBatch {
    events: Vec<RawEvent>,
}

impl EventBatch {
    /// Build a batch directly, bypassing the queue. Useful in tests and for
    /// hosts that already batch per frame.
    pub fn from_events(events: Vec<RawEvent>) -> Self {
        Self { events }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RawEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Run `handler` over every event, removing those it consumes.
    pub fn dispatch<H>(&mut self, mut handler: H)
    where
        H: FnMut(&RawEvent) -> HandleStatus,
    {
        self.events.retain(|event| {
            let status = handler(event);
            !status.is_consumed()
        });
    }
}

#[derive(Default, Debug, Clone)]
pub struct EventStats {
    pub events_received: usize,
    pub events_processed: usize,
    pub events_dropped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u64, event: Event) -> RawEvent {
        RawEvent::new(Duration::from_millis(ms), DeviceId::PRIMARY, event)
    }

    #[test]
    fn pointer_moves_deduplicate_per_device() {
        let mut queue = EventQueue::new();
        queue.push(at(1, Event::PointerMoved(Vec2::new(1.0, 1.0))));
        queue.push(at(2, Event::PointerMoved(Vec2::new(2.0, 2.0))));
        queue.push(RawEvent::new(
            Duration::from_millis(3),
            DeviceId(1),
            Event::PointerMoved(Vec2::new(9.0, 9.0)),
        ));

        let batch = queue.drain();
        assert_eq!(batch.len(), 2);
        let positions: Vec<_> = batch
            .iter()
            .map(|e| match e.event {
                Event::PointerMoved(p) => p,
                _ => panic!("expected move"),
            })
            .collect();
        assert!(positions.contains(&Vec2::new(2.0, 2.0)));
        assert!(positions.contains(&Vec2::new(9.0, 9.0)));
    }

    #[test]
    fn close_requested_drains_first() {
        let mut queue = EventQueue::new();
        queue.push(at(1, Event::KeyDown(Key::Space)));
        queue.push(at(2, Event::CloseRequested));

        let batch = queue.drain();
        assert_eq!(batch.events[0].event, Event::CloseRequested);
    }

    #[test]
    fn dispatch_retains_unconsumed() {
        let mut queue = EventQueue::new();
        queue.push(at(1, Event::KeyDown(Key::Space)));
        queue.push(at(2, Event::KeyDown(Key::Enter)));

        let mut batch = queue.drain();
        batch.dispatch(|event| match event.event {
            Event::KeyDown(Key::Space) => HandleStatus::consumed(),
            _ => HandleStatus::ignored(),
        });

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.events[0].event, Event::KeyDown(Key::Enter));
    }

    #[test]
    fn stats_track_dedup_drops() {
        let mut queue = EventQueue::new();
        queue.push(at(1, Event::PointerMoved(Vec2::ZERO)));
        queue.push(at(2, Event::PointerMoved(Vec2::ONE)));
        let _ = queue.drain();

        let stats = queue.stats();
        assert_eq!(stats.events_received, 2);
        assert_eq!(stats.events_processed, 1);
        assert_eq!(stats.events_dropped, 1);
    }
}
