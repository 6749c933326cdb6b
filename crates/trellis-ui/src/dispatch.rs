//! Routing of raw host events to widgets.
//!
//! The dispatcher owns all cross-widget interaction state: which node each
//! pointer device hovers, which node it pressed, and which node holds
//! keyboard focus. Pointer events are targeted by hit testing the tree
//! top-most first, then bubbled from the hit node up through its ancestors
//! until a widget consumes them. Keyboard and text events go to the focused
//! node and bubble from there; with no focus they are dropped.

use trellis_core::alloc::HashMap;
use trellis_core::math::Vec2;
use trellis_input::{DeviceId, Event, HandleStatus, Key, PointerButton, RawEvent};

use crate::bus::{Address, AddressBus};
use crate::event::{EventCtx, EventOutcome, FocusRequest, WidgetEvent};
use crate::tree::{NodeFlags, NodeId, WidgetTree};

/// Per-device press bookkeeping, kept between down and up.
#[derive(Debug, Clone, Copy)]
struct Press {
    node: NodeId,
    button: PointerButton,
}

/// Event router holding focus, hover, and press state.
///
/// One instance per UI; the tree and bus are passed in per call so the
/// dispatcher never holds borrows across frames.
#[derive(Default)]
pub struct EventDispatcher {
    focused: Option<NodeId>,
    hovered: HashMap<DeviceId, NodeId>,
    pressed: HashMap<DeviceId, Press>,
    pointer_pos: HashMap<DeviceId, Vec2>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The node currently holding keyboard focus, if any.
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// The node hovered by `device`, if any.
    pub fn hovered(&self, device: DeviceId) -> Option<NodeId> {
        self.hovered.get(&device).copied()
    }

    /// Route one raw event into the tree.
    pub fn dispatch(
        &mut self,
        tree: &mut WidgetTree,
        bus: &AddressBus,
        raw: &RawEvent,
    ) -> HandleStatus {
        match &raw.event {
            Event::PointerMoved(pos) => self.on_pointer_moved(tree, bus, raw.device, *pos),
            Event::PointerDown(button) => self.on_pointer_down(tree, bus, raw.device, *button),
            Event::PointerUp(button) => self.on_pointer_up(tree, bus, raw.device, *button),
            Event::PointerLeft => self.on_pointer_left(tree, bus, raw.device),
            Event::KeyDown(key) => self.on_key(tree, bus, WidgetEvent::KeyDown(*key)),
            Event::KeyUp(key) => self.on_key(tree, bus, WidgetEvent::KeyUp(*key)),
            Event::TextInput(text) => self.on_key(tree, bus, WidgetEvent::TextInput(text.clone())),
            // Window-level events are the host's concern.
            Event::WindowResized(_) | Event::CloseRequested => HandleStatus::ignored(),
        }
    }

    /// Move keyboard focus to `target` (or clear it with `None`), notifying
    /// the old and new holders. Delivered directly, without bubbling.
    pub fn set_focus(&mut self, tree: &mut WidgetTree, bus: &AddressBus, target: Option<NodeId>) {
        let target = target.filter(|id| tree.contains(*id));
        if self.focused == target {
            return;
        }
        if let Some(old) = self.focused.take() {
            if tree.contains(old) {
                let _ = self.deliver(tree, bus, old, &WidgetEvent::FocusLost);
            }
        }
        if let Some(new) = target {
            tracing::trace!(node = new.0, "focus moved");
            let _ = self.deliver(tree, bus, new, &WidgetEvent::FocusGained);
        }
        self.focused = target;
    }

    /// Drop state referring to nodes that were removed, hidden, or
    /// disabled. No events are delivered; a removed widget is already gone
    /// and a hidden one cannot act on them.
    pub fn prune(&mut self, tree: &WidgetTree) {
        if let Some(focused) = self.focused {
            if !tree.is_interactive(focused) {
                self.focused = None;
            }
        }
        self.hovered.retain(|_, node| tree.is_interactive(*node));
        self.pressed.retain(|_, press| tree.is_interactive(press.node));
    }

    fn on_pointer_moved(
        &mut self,
        tree: &mut WidgetTree,
        bus: &AddressBus,
        device: DeviceId,
        pos: Vec2,
    ) -> HandleStatus {
        self.pointer_pos.insert(device, pos);
        let hit = self.hit_test(tree, pos);

        // While a button is held the press target captures the pointer: it
        // keeps receiving moves even off its rectangle, and hover is frozen
        // until release so the capture target sees no leave mid-drag.
        if !self.pressed.contains_key(&device) {
            self.update_hover(tree, bus, device, hit);
        }
        let target = self.pressed.get(&device).map(|p| p.node).or(hit);
        let Some(target) = target else {
            return HandleStatus::ignored();
        };
        let event = WidgetEvent::PointerMoved { pos, device };
        let (status, focus) = self.bubble(tree, bus, target, &event);
        self.apply_focus_request(tree, bus, focus);
        status
    }

    fn on_pointer_down(
        &mut self,
        tree: &mut WidgetTree,
        bus: &AddressBus,
        device: DeviceId,
        button: PointerButton,
    ) -> HandleStatus {
        let Some(pos) = self.pointer_pos.get(&device).copied() else {
            return HandleStatus::ignored();
        };
        let Some(hit) = self.hit_test(tree, pos) else {
            // Click on empty space releases focus.
            self.set_focus(tree, bus, None);
            return HandleStatus::ignored();
        };

        self.pressed.insert(device, Press { node: hit, button });

        let event = WidgetEvent::PointerDown {
            pos,
            button,
            device,
        };
        let (status, focus) = self.bubble(tree, bus, hit, &event);

        match focus {
            Some(_) => self.apply_focus_request(tree, bus, focus),
            // No explicit claim: the nearest focusable node at or above the
            // hit takes focus, or focus clears.
            None => {
                let target = std::iter::once(hit)
                    .chain(tree.ancestors(hit).collect::<Vec<_>>())
                    .find(|id| tree.flags(*id).contains(NodeFlags::FOCUSABLE));
                self.set_focus(tree, bus, target);
            }
        }
        status
    }

    fn on_pointer_up(
        &mut self,
        tree: &mut WidgetTree,
        bus: &AddressBus,
        device: DeviceId,
        button: PointerButton,
    ) -> HandleStatus {
        let press = self.pressed.remove(&device);
        // A release from a device with no recorded position cannot be
        // located; inventing one would deliver it to whatever sits at the
        // fallback point. Drop it. A live press implies a recorded
        // position, so this also means there is nothing to release.
        let Some(pos) = self.pointer_pos.get(&device).copied() else {
            return HandleStatus::ignored();
        };
        let hit = self.hit_test(tree, pos);

        let target = press.map(|p| p.node).or(hit);
        let Some(target) = target else {
            return HandleStatus::ignored();
        };

        let event = WidgetEvent::PointerUp {
            pos,
            button,
            device,
        };
        let (mut status, focus) = self.bubble(tree, bus, target, &event);
        self.apply_focus_request(tree, bus, focus);

        // A press and release over the same node is a click.
        if let Some(press) = press {
            if press.button == button && hit == Some(press.node) {
                let click = WidgetEvent::Click {
                    pos,
                    button,
                    device,
                };
                let (click_status, focus) = self.bubble(tree, bus, press.node, &click);
                self.apply_focus_request(tree, bus, focus);
                status |= click_status;
            }
        }

        // Capture ended; catch hover up with wherever the pointer is now.
        self.update_hover(tree, bus, device, hit);
        status
    }

    fn on_pointer_left(
        &mut self,
        tree: &mut WidgetTree,
        bus: &AddressBus,
        device: DeviceId,
    ) -> HandleStatus {
        self.pointer_pos.remove(&device);
        self.pressed.remove(&device);
        self.update_hover(tree, bus, device, None);
        HandleStatus::handled()
    }

    fn on_key(
        &mut self,
        tree: &mut WidgetTree,
        bus: &AddressBus,
        event: WidgetEvent,
    ) -> HandleStatus {
        // Escape releases focus without reaching the widget's handler chain
        // unless a widget consumes it first.
        let Some(focused) = self.focused else {
            return HandleStatus::ignored();
        };
        if !tree.is_interactive(focused) {
            return HandleStatus::ignored();
        }
        let (status, focus) = self.bubble(tree, bus, focused, &event);
        if !status.is_consumed() && event == WidgetEvent::KeyDown(Key::Escape) {
            self.set_focus(tree, bus, None);
            return HandleStatus::handled();
        }
        self.apply_focus_request(tree, bus, focus);
        status
    }

    /// Topmost interactive node containing `pos`, in absolute coordinates.
    ///
    /// Children are tested in reverse paint order so the node painted last
    /// wins. Descent requires containment: a child outside its parent's
    /// rectangle is unreachable. Passthrough nodes are skipped as targets
    /// but their children are still tested.
    pub fn hit_test(&self, tree: &WidgetTree, pos: Vec2) -> Option<NodeId> {
        let root = tree.root()?;
        self.hit_node(tree, root, Vec2::ZERO, pos)
    }

    fn hit_node(
        &self,
        tree: &WidgetTree,
        id: NodeId,
        offset: Vec2,
        pos: Vec2,
    ) -> Option<NodeId> {
        let node = tree.get(id)?;
        if !node.flags.contains(NodeFlags::VISIBLE | NodeFlags::ENABLED) {
            return None;
        }
        let rect = node.rect.translated(offset);
        if !rect.contains(pos) {
            return None;
        }
        for child in node.children.iter().rev() {
            if let Some(hit) = self.hit_node(tree, *child, rect.position(), pos) {
                return Some(hit);
            }
        }
        if node.flags.contains(NodeFlags::PASSTHROUGH) {
            None
        } else {
            Some(id)
        }
    }

    /// Reconcile hover state for one device, emitting leave/enter pairs on
    /// transitions. At most one of each per call.
    fn update_hover(
        &mut self,
        tree: &mut WidgetTree,
        bus: &AddressBus,
        device: DeviceId,
        hit: Option<NodeId>,
    ) {
        let previous = self.hovered.get(&device).copied();
        if previous == hit {
            return;
        }
        if let Some(old) = previous {
            if tree.contains(old) {
                let _ = self.deliver(tree, bus, old, &WidgetEvent::PointerLeave { device });
            }
        }
        match hit {
            Some(new) => {
                let _ = self.deliver(tree, bus, new, &WidgetEvent::PointerEnter { device });
                self.hovered.insert(device, new);
            }
            None => {
                self.hovered.remove(&device);
            }
        }
    }

    /// Deliver `event` starting at `start` and walking up the ancestor
    /// chain until a widget consumes it. Passthrough ancestors are skipped.
    /// Returns the combined status and the first focus request made.
    fn bubble(
        &mut self,
        tree: &mut WidgetTree,
        bus: &AddressBus,
        start: NodeId,
        event: &WidgetEvent,
    ) -> (HandleStatus, Option<(NodeId, FocusRequest)>) {
        let chain: Vec<NodeId> = std::iter::once(start).chain(tree.ancestors(start)).collect();

        let mut status = HandleStatus::ignored();
        let mut focus = None;
        for id in chain {
            if id != start && tree.flags(id).contains(NodeFlags::PASSTHROUGH) {
                continue;
            }
            let (outcome, request) = self.deliver(tree, bus, id, event);
            if focus.is_none() {
                if let Some(request) = request {
                    focus = Some((id, request));
                }
            }
            match outcome {
                EventOutcome::Consumed => {
                    tracing::trace!(node = id.0, ?event, "event consumed");
                    status = HandleStatus::consumed();
                    break;
                }
                EventOutcome::Bubble => status |= HandleStatus::handled(),
                EventOutcome::Ignored => {}
            }
        }
        (status, focus)
    }

    /// Invoke one widget's handler, without bubbling, then apply any move
    /// or raise it requested.
    fn deliver(
        &mut self,
        tree: &mut WidgetTree,
        bus: &AddressBus,
        id: NodeId,
        event: &WidgetEvent,
    ) -> (EventOutcome, Option<FocusRequest>) {
        let address = self.ensure_address(tree, bus, id);
        let Some(rect) = tree.absolute_rect(id) else {
            return (EventOutcome::Ignored, None);
        };
        let parent_rect = tree
            .get(id)
            .and_then(|n| n.parent)
            .and_then(|p| tree.absolute_rect(p));
        let Some(node) = tree.get_mut(id) else {
            return (EventOutcome::Ignored, None);
        };
        let mut ctx = EventCtx::new(bus, address, rect, parent_rect);
        let outcome = node.widget.handle_event(event, &mut ctx);
        let focus = ctx.focus_request;

        if let Some(delta) = ctx.move_request {
            if let Some(node) = tree.get_mut(id) {
                node.rect.x += delta.x;
                node.rect.y += delta.y;
            }
        }
        if ctx.raise_request {
            // Orphans and the root have no siblings to rise above.
            let _ = tree.bring_to_front(id);
        }
        (outcome, focus)
    }

    fn apply_focus_request(
        &mut self,
        tree: &mut WidgetTree,
        bus: &AddressBus,
        request: Option<(NodeId, FocusRequest)>,
    ) {
        match request {
            Some((node, FocusRequest::Claim)) => self.set_focus(tree, bus, Some(node)),
            Some((node, FocusRequest::Release)) => {
                if self.focused == Some(node) {
                    self.set_focus(tree, bus, None);
                }
            }
            None => {}
        }
    }

    /// Nodes get a bus address lazily on their first delivery if they were
    /// inserted without one.
    fn ensure_address(&self, tree: &mut WidgetTree, bus: &AddressBus, id: NodeId) -> Address {
        if let Some(address) = tree.address(id) {
            return address;
        }
        let address = bus.allocate();
        tree.set_address(id, address);
        address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::{Button, Container, Widget};
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;
    use trellis_core::geometry::Rect;

    /// Records every event it receives and answers with a fixed outcome.
    struct Probe {
        log: Rc<RefCell<Vec<WidgetEvent>>>,
        outcome: EventOutcome,
    }

    impl Probe {
        fn new(outcome: EventOutcome) -> (Self, Rc<RefCell<Vec<WidgetEvent>>>) {
            let log = Rc::new(RefCell::new(Vec::new()));
            (
                Self {
                    log: Rc::clone(&log),
                    outcome,
                },
                log,
            )
        }
    }

    impl Widget for Probe {
        fn type_name(&self) -> &'static str {
            "Probe"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn handle_event(&mut self, event: &WidgetEvent, _ctx: &mut EventCtx) -> EventOutcome {
            self.log.borrow_mut().push(event.clone());
            self.outcome
        }
    }

    fn raw(device: DeviceId, event: Event) -> RawEvent {
        RawEvent::new(Duration::ZERO, device, event)
    }

    fn move_to(
        dispatcher: &mut EventDispatcher,
        tree: &mut WidgetTree,
        bus: &AddressBus,
        x: f32,
        y: f32,
    ) -> HandleStatus {
        dispatcher.dispatch(
            tree,
            bus,
            &raw(DeviceId::PRIMARY, Event::PointerMoved(Vec2::new(x, y))),
        )
    }

    fn press(
        dispatcher: &mut EventDispatcher,
        tree: &mut WidgetTree,
        bus: &AddressBus,
    ) -> HandleStatus {
        dispatcher.dispatch(
            tree,
            bus,
            &raw(DeviceId::PRIMARY, Event::PointerDown(PointerButton::Primary)),
        )
    }

    fn release(
        dispatcher: &mut EventDispatcher,
        tree: &mut WidgetTree,
        bus: &AddressBus,
    ) -> HandleStatus {
        dispatcher.dispatch(
            tree,
            bus,
            &raw(DeviceId::PRIMARY, Event::PointerUp(PointerButton::Primary)),
        )
    }

    fn setup() -> (WidgetTree, AddressBus, EventDispatcher, NodeId) {
        let mut tree = WidgetTree::new();
        let root = tree.insert(
            Box::new(Container::group()),
            Rect::new(0.0, 0.0, 800.0, 600.0),
        );
        tree.set_root(root).unwrap();
        (tree, AddressBus::new(), EventDispatcher::new(), root)
    }

    #[test]
    fn topmost_of_overlapping_siblings_wins() {
        let (mut tree, bus, mut dispatcher, root) = setup();
        let (probe_a, log_a) = Probe::new(EventOutcome::Consumed);
        let (probe_b, log_b) = Probe::new(EventOutcome::Consumed);

        // Both cover the pointer; b is added later so it paints on top.
        let a = tree.insert(Box::new(probe_a), Rect::new(0.0, 0.0, 100.0, 100.0));
        let b = tree.insert(Box::new(probe_b), Rect::new(50.0, 0.0, 100.0, 100.0));
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();

        move_to(&mut dispatcher, &mut tree, &bus, 75.0, 50.0);

        assert!(log_a.borrow().is_empty());
        assert!(
            log_b
                .borrow()
                .iter()
                .any(|e| matches!(e, WidgetEvent::PointerMoved { .. }))
        );
    }

    #[test]
    fn bubbling_stops_at_first_consumer() {
        let (mut tree, bus, mut dispatcher, root) = setup();
        let (outer, outer_log) = Probe::new(EventOutcome::Bubble);
        let (middle, middle_log) = Probe::new(EventOutcome::Consumed);
        let (inner, inner_log) = Probe::new(EventOutcome::Bubble);

        let outer = tree.insert(Box::new(outer), Rect::new(0.0, 0.0, 300.0, 300.0));
        let middle = tree.insert(Box::new(middle), Rect::new(0.0, 0.0, 200.0, 200.0));
        let inner = tree.insert(Box::new(inner), Rect::new(0.0, 0.0, 100.0, 100.0));
        tree.add_child(root, outer).unwrap();
        tree.add_child(outer, middle).unwrap();
        tree.add_child(middle, inner).unwrap();

        move_to(&mut dispatcher, &mut tree, &bus, 50.0, 50.0);
        let status = press(&mut dispatcher, &mut tree, &bus);

        assert!(status.is_consumed());
        assert!(
            inner_log
                .borrow()
                .iter()
                .any(|e| matches!(e, WidgetEvent::PointerDown { .. }))
        );
        assert!(
            middle_log
                .borrow()
                .iter()
                .any(|e| matches!(e, WidgetEvent::PointerDown { .. }))
        );
        assert!(
            !outer_log
                .borrow()
                .iter()
                .any(|e| matches!(e, WidgetEvent::PointerDown { .. }))
        );
    }

    #[test]
    fn hover_transition_emits_leave_then_enter_once() {
        let (mut tree, bus, mut dispatcher, root) = setup();
        let (probe_a, log_a) = Probe::new(EventOutcome::Consumed);
        let (probe_b, log_b) = Probe::new(EventOutcome::Consumed);

        let a = tree.insert(Box::new(probe_a), Rect::new(0.0, 0.0, 100.0, 100.0));
        let b = tree.insert(Box::new(probe_b), Rect::new(100.0, 0.0, 100.0, 100.0));
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();

        move_to(&mut dispatcher, &mut tree, &bus, 50.0, 50.0);
        move_to(&mut dispatcher, &mut tree, &bus, 60.0, 50.0);
        move_to(&mut dispatcher, &mut tree, &bus, 150.0, 50.0);

        let enters_a = log_a
            .borrow()
            .iter()
            .filter(|e| matches!(e, WidgetEvent::PointerEnter { .. }))
            .count();
        let leaves_a = log_a
            .borrow()
            .iter()
            .filter(|e| matches!(e, WidgetEvent::PointerLeave { .. }))
            .count();
        assert_eq!(enters_a, 1);
        assert_eq!(leaves_a, 1);

        // Leave on a precedes the primary move delivered to b.
        let b_events = log_b.borrow();
        assert!(matches!(b_events[0], WidgetEvent::PointerEnter { .. }));
        assert!(matches!(b_events[1], WidgetEvent::PointerMoved { .. }));
    }

    #[test]
    fn hover_is_tracked_per_device() {
        let (mut tree, bus, mut dispatcher, root) = setup();
        let (probe, log) = Probe::new(EventOutcome::Consumed);
        let node = tree.insert(Box::new(probe), Rect::new(0.0, 0.0, 100.0, 100.0));
        tree.add_child(root, node).unwrap();

        let second = DeviceId(1);
        move_to(&mut dispatcher, &mut tree, &bus, 50.0, 50.0);
        dispatcher.dispatch(
            &mut tree,
            &bus,
            &raw(second, Event::PointerMoved(Vec2::new(50.0, 50.0))),
        );

        // One enter per device; the second device entering does not
        // disturb the first device's hover.
        let enters = log
            .borrow()
            .iter()
            .filter(|e| matches!(e, WidgetEvent::PointerEnter { .. }))
            .count();
        assert_eq!(enters, 2);
        assert_eq!(dispatcher.hovered(DeviceId::PRIMARY), Some(node));
        assert_eq!(dispatcher.hovered(second), Some(node));
    }

    #[test]
    fn passthrough_node_falls_through_to_sibling_below() {
        let (mut tree, bus, mut dispatcher, root) = setup();
        let (below, below_log) = Probe::new(EventOutcome::Consumed);
        let (overlay, overlay_log) = Probe::new(EventOutcome::Consumed);

        let below = tree.insert(Box::new(below), Rect::new(0.0, 0.0, 100.0, 100.0));
        let overlay = tree.insert(Box::new(overlay), Rect::new(0.0, 0.0, 100.0, 100.0));
        tree.add_child(root, below).unwrap();
        tree.add_child(root, overlay).unwrap();
        tree.set_passthrough(overlay, true);

        move_to(&mut dispatcher, &mut tree, &bus, 50.0, 50.0);

        assert!(overlay_log.borrow().is_empty());
        assert!(
            below_log
                .borrow()
                .iter()
                .any(|e| matches!(e, WidgetEvent::PointerMoved { .. }))
        );
    }

    #[test]
    fn hidden_subtree_is_not_hit() {
        let (mut tree, bus, mut dispatcher, root) = setup();
        let (probe, log) = Probe::new(EventOutcome::Consumed);

        let panel = tree.insert(
            Box::new(Container::group()),
            Rect::new(0.0, 0.0, 200.0, 200.0),
        );
        let inner = tree.insert(Box::new(probe), Rect::new(0.0, 0.0, 100.0, 100.0));
        tree.add_child(root, panel).unwrap();
        tree.add_child(panel, inner).unwrap();
        tree.set_visible(panel, false);

        move_to(&mut dispatcher, &mut tree, &bus, 50.0, 50.0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn child_outside_parent_bounds_is_unreachable() {
        let (mut tree, bus, mut dispatcher, root) = setup();
        let (probe, log) = Probe::new(EventOutcome::Consumed);

        let panel = tree.insert(
            Box::new(Container::group()),
            Rect::new(0.0, 0.0, 100.0, 100.0),
        );
        // Sits entirely to the right of its parent.
        let escapee = tree.insert(Box::new(probe), Rect::new(150.0, 0.0, 50.0, 50.0));
        tree.add_child(root, panel).unwrap();
        tree.add_child(panel, escapee).unwrap();

        move_to(&mut dispatcher, &mut tree, &bus, 175.0, 25.0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn click_synthesized_on_press_release_over_same_node() {
        let (mut tree, bus, mut dispatcher, root) = setup();
        let (probe, log) = Probe::new(EventOutcome::Consumed);
        let node = tree.insert(Box::new(probe), Rect::new(0.0, 0.0, 100.0, 100.0));
        tree.add_child(root, node).unwrap();

        move_to(&mut dispatcher, &mut tree, &bus, 50.0, 50.0);
        press(&mut dispatcher, &mut tree, &bus);
        release(&mut dispatcher, &mut tree, &bus);

        assert!(
            log.borrow()
                .iter()
                .any(|e| matches!(e, WidgetEvent::Click { .. }))
        );
    }

    #[test]
    fn no_click_when_released_elsewhere() {
        let (mut tree, bus, mut dispatcher, root) = setup();
        let (probe, log) = Probe::new(EventOutcome::Consumed);
        let node = tree.insert(Box::new(probe), Rect::new(0.0, 0.0, 100.0, 100.0));
        tree.add_child(root, node).unwrap();

        move_to(&mut dispatcher, &mut tree, &bus, 50.0, 50.0);
        press(&mut dispatcher, &mut tree, &bus);
        move_to(&mut dispatcher, &mut tree, &bus, 300.0, 300.0);
        release(&mut dispatcher, &mut tree, &bus);

        assert!(
            !log.borrow()
                .iter()
                .any(|e| matches!(e, WidgetEvent::Click { .. }))
        );
        // The press target still saw the release (pointer capture).
        assert!(
            log.borrow()
                .iter()
                .any(|e| matches!(e, WidgetEvent::PointerUp { .. }))
        );
    }

    #[test]
    fn click_on_button_focuses_it() {
        let (mut tree, bus, mut dispatcher, root) = setup();
        let button = tree.insert(
            Box::new(Button::new("ok")),
            Rect::new(0.0, 0.0, 100.0, 40.0),
        );
        tree.add_child(root, button).unwrap();

        move_to(&mut dispatcher, &mut tree, &bus, 50.0, 20.0);
        press(&mut dispatcher, &mut tree, &bus);

        assert_eq!(dispatcher.focused(), Some(button));

        // Clicking empty space releases focus.
        move_to(&mut dispatcher, &mut tree, &bus, 790.0, 590.0);
        press(&mut dispatcher, &mut tree, &bus);
        assert_eq!(dispatcher.focused(), None);
    }

    #[test]
    fn focus_falls_back_to_focusable_ancestor() {
        let (mut tree, bus, mut dispatcher, root) = setup();
        let (probe, _log) = Probe::new(EventOutcome::Bubble);

        let panel = tree.insert(
            Box::new(Container::group()),
            Rect::new(0.0, 0.0, 200.0, 200.0),
        );
        let inner = tree.insert(Box::new(probe), Rect::new(0.0, 0.0, 100.0, 100.0));
        tree.add_child(root, panel).unwrap();
        tree.add_child(panel, inner).unwrap();
        tree.set_focusable(panel, true);

        move_to(&mut dispatcher, &mut tree, &bus, 50.0, 50.0);
        press(&mut dispatcher, &mut tree, &bus);

        assert_eq!(dispatcher.focused(), Some(panel));
    }

    #[test]
    fn keys_go_to_focused_and_are_dropped_without_focus() {
        let (mut tree, bus, mut dispatcher, root) = setup();
        let (probe, log) = Probe::new(EventOutcome::Consumed);
        let node = tree.insert(Box::new(probe), Rect::new(0.0, 0.0, 100.0, 100.0));
        tree.add_child(root, node).unwrap();

        let status = dispatcher.dispatch(
            &mut tree,
            &bus,
            &raw(DeviceId::PRIMARY, Event::KeyDown(Key::Enter)),
        );
        assert_eq!(status, HandleStatus::ignored());
        assert!(log.borrow().is_empty());

        dispatcher.set_focus(&mut tree, &bus, Some(node));
        dispatcher.dispatch(
            &mut tree,
            &bus,
            &raw(DeviceId::PRIMARY, Event::KeyDown(Key::Enter)),
        );
        assert!(
            log.borrow()
                .iter()
                .any(|e| matches!(e, WidgetEvent::KeyDown(Key::Enter)))
        );
    }

    #[test]
    fn focus_change_notifies_both_sides() {
        let (mut tree, bus, mut dispatcher, root) = setup();
        let (probe_a, log_a) = Probe::new(EventOutcome::Bubble);
        let (probe_b, log_b) = Probe::new(EventOutcome::Bubble);
        let a = tree.insert(Box::new(probe_a), Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = tree.insert(Box::new(probe_b), Rect::new(10.0, 0.0, 10.0, 10.0));
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();

        dispatcher.set_focus(&mut tree, &bus, Some(a));
        dispatcher.set_focus(&mut tree, &bus, Some(b));

        assert!(log_a.borrow().contains(&WidgetEvent::FocusGained));
        assert!(log_a.borrow().contains(&WidgetEvent::FocusLost));
        assert!(log_b.borrow().contains(&WidgetEvent::FocusGained));
        assert!(!log_b.borrow().contains(&WidgetEvent::FocusLost));
    }

    #[test]
    fn prune_clears_state_for_removed_nodes() {
        let (mut tree, bus, mut dispatcher, root) = setup();
        let (probe, _log) = Probe::new(EventOutcome::Consumed);
        let node = tree.insert(Box::new(probe), Rect::new(0.0, 0.0, 100.0, 100.0));
        tree.add_child(root, node).unwrap();

        move_to(&mut dispatcher, &mut tree, &bus, 50.0, 50.0);
        dispatcher.set_focus(&mut tree, &bus, Some(node));
        press(&mut dispatcher, &mut tree, &bus);

        tree.remove(node).unwrap();
        dispatcher.prune(&tree);

        assert_eq!(dispatcher.focused(), None);
        assert_eq!(dispatcher.hovered(DeviceId::PRIMARY), None);
    }

    #[test]
    fn release_without_known_position_is_dropped() {
        let (mut tree, bus, mut dispatcher, root) = setup();
        let (probe, log) = Probe::new(EventOutcome::Consumed);
        // Sits at the origin, where a fabricated fallback point would land.
        let node = tree.insert(Box::new(probe), Rect::new(0.0, 0.0, 100.0, 100.0));
        tree.add_child(root, node).unwrap();

        let status = release(&mut dispatcher, &mut tree, &bus);

        assert_eq!(status, HandleStatus::ignored());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn escape_releases_focus_when_unconsumed() {
        let (mut tree, bus, mut dispatcher, root) = setup();
        let (probe, _log) = Probe::new(EventOutcome::Bubble);
        let node = tree.insert(Box::new(probe), Rect::new(0.0, 0.0, 100.0, 100.0));
        tree.add_child(root, node).unwrap();

        dispatcher.set_focus(&mut tree, &bus, Some(node));
        dispatcher.dispatch(
            &mut tree,
            &bus,
            &raw(DeviceId::PRIMARY, Event::KeyDown(Key::Escape)),
        );
        assert_eq!(dispatcher.focused(), None);
    }
}
