//! Widget-targeted events and the propagation-control contract.

use crate::bus::{Address, AddressBus, BusError, Payload, SubscriptionId};
use trellis_core::geometry::Rect;
use trellis_core::math::Vec2;
use trellis_input::{DeviceId, Key, PointerButton};

/// An event delivered to a specific widget by the dispatcher.
///
/// Pointer positions are in absolute window coordinates; the receiving
/// widget's own absolute rectangle is available through [`EventCtx::rect`].
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// Pointer button pressed over the widget.
    PointerDown {
        pos: Vec2,
        button: PointerButton,
        device: DeviceId,
    },
    /// Pointer button released over the widget.
    PointerUp {
        pos: Vec2,
        button: PointerButton,
        device: DeviceId,
    },
    /// Pointer moved while over the widget.
    PointerMoved { pos: Vec2, device: DeviceId },
    /// Pointer entered the widget's bounds (synthetic, delivered before the
    /// primary event of the tick that caused the transition).
    PointerEnter { device: DeviceId },
    /// Pointer left the widget's bounds (synthetic).
    PointerLeave { device: DeviceId },
    /// Press and release happened on the same widget.
    Click {
        pos: Vec2,
        button: PointerButton,
        device: DeviceId,
    },
    /// Key pressed while the widget (or a descendant) holds focus.
    KeyDown(Key),
    /// Key released while the widget (or a descendant) holds focus.
    KeyUp(Key),
    /// Committed text input routed to the focused widget.
    TextInput(String),
    /// The widget gained keyboard focus.
    FocusGained,
    /// The widget lost keyboard focus.
    FocusLost,
}

/// Propagation control returned from [`Widget::handle_event`].
///
/// [`Widget::handle_event`]: crate::widgets::Widget::handle_event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The event was handled; propagation stops here.
    Consumed,
    /// The event was observed; ancestors should see it too.
    Bubble,
    /// The widget has no interest in this event. Propagation continues,
    /// identically to `Bubble`; the distinction only matters to the widget's
    /// own bookkeeping (an `Ignored` event was never acted upon).
    Ignored,
}

impl EventOutcome {
    pub fn is_consumed(self) -> bool {
        matches!(self, EventOutcome::Consumed)
    }
}

/// Focus change requested by a widget during event handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FocusRequest {
    Claim,
    Release,
}

/// Per-delivery context handed to [`Widget::handle_event`].
///
/// Gives the widget access to the [`AddressBus`], its own bus address, and
/// its absolute rectangle, and lets it request focus changes that the
/// dispatcher resolves once delivery finishes.
///
/// [`Widget::handle_event`]: crate::widgets::Widget::handle_event
pub struct EventCtx<'a> {
    bus: &'a AddressBus,
    address: Address,
    rect: Rect<f32>,
    parent_rect: Option<Rect<f32>>,
    pub(crate) focus_request: Option<FocusRequest>,
    pub(crate) move_request: Option<Vec2>,
    pub(crate) raise_request: bool,
}

impl<'a> EventCtx<'a> {
    pub(crate) fn new(
        bus: &'a AddressBus,
        address: Address,
        rect: Rect<f32>,
        parent_rect: Option<Rect<f32>>,
    ) -> Self {
        Self {
            bus,
            address,
            rect,
            parent_rect,
            focus_request: None,
            move_request: None,
            raise_request: false,
        }
    }

    /// The receiving widget's bus address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The receiving widget's absolute rectangle.
    pub fn rect(&self) -> Rect<f32> {
        self.rect
    }

    /// The absolute rectangle of the widget's parent, if it has one.
    pub fn parent_rect(&self) -> Option<Rect<f32>> {
        self.parent_rect
    }

    /// The shared message bus.
    pub fn bus(&self) -> &AddressBus {
        self.bus
    }

    /// Publish a message from this widget's address.
    pub fn publish(&self, address: Address, payload: Payload) -> Result<usize, BusError> {
        self.bus.publish(address, payload)
    }

    /// Subscribe on behalf of this widget.
    pub fn subscribe<F>(&self, address: Address, handler: F) -> SubscriptionId
    where
        F: FnMut(&Payload) + 'static,
    {
        self.bus.subscribe(address, handler)
    }

    /// Ask the dispatcher to move keyboard focus to this widget. Applied
    /// after the current delivery completes; the first request during a
    /// delivery wins.
    pub fn claim_focus(&mut self) {
        if self.focus_request.is_none() {
            self.focus_request = Some(FocusRequest::Claim);
        }
    }

    /// Ask the dispatcher to drop keyboard focus from this widget.
    pub fn release_focus(&mut self) {
        if self.focus_request.is_none() {
            self.focus_request = Some(FocusRequest::Release);
        }
    }

    /// Ask the dispatcher to translate this widget's node by `delta`.
    /// Repeated requests within one delivery accumulate. Applied right
    /// after the handler returns, so the move is visible to the next
    /// handler in the bubble chain.
    pub fn request_move_by(&mut self, delta: Vec2) {
        let total = self.move_request.unwrap_or(Vec2::ZERO) + delta;
        self.move_request = Some(total);
    }

    /// Ask the dispatcher to move this widget's node to the end of its
    /// parent's child list, making it topmost among its siblings.
    pub fn request_raise(&mut self) {
        self.raise_request = true;
    }
}
