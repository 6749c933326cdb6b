//! Trellis UI: retained widget tree, event routing, message bus, and
//! theming over a host-supplied 2D drawing surface.
//!
//! The host owns the window, the input loop, and the renderer. Each frame
//! it feeds raw input into an [`EventBatch`], hands it to [`Ui::update`],
//! and then calls [`Ui::render`] with its [`DrawContext`] implementation.
//! Everything in between (hit testing, bubbling, focus, hover, widget
//! state) lives here.

pub mod bus;
pub mod dispatch;
pub mod event;
pub mod render;
pub mod theme;
pub mod tree;
pub mod widgets;

pub use bus::{Address, AddressBus, BusError, BusResult, Payload, SubscriptionId};
pub use dispatch::EventDispatcher;
pub use event::{EventCtx, EventOutcome, WidgetEvent};
pub use render::DrawContext;
pub use theme::{StyleValue, Theme};
pub use tree::{Node, NodeFlags, NodeId, TreeError, TreeResult, WidgetTree};
pub use widgets::{Button, Container, Label, MultiLabel, Slider, TextAlign, Widget, Window};

pub use trellis_input::{
    DeviceId, Event, EventBatch, EventQueue, HandleStatus, Key, PointerButton, RawEvent,
};

use trellis_core::geometry::Rect;

/// The whole framework behind one handle: tree, dispatcher, bus, theme.
///
/// The pieces are usable separately; `Ui` wires them together for the
/// common case of one window with one widget tree.
pub struct Ui {
    tree: WidgetTree,
    dispatcher: EventDispatcher,
    bus: AddressBus,
    theme: Theme,
}

impl Ui {
    pub fn new() -> Self {
        Self::with_theme(Theme::default())
    }

    pub fn with_theme(theme: Theme) -> Self {
        Self {
            tree: WidgetTree::new(),
            dispatcher: EventDispatcher::new(),
            bus: AddressBus::new(),
            theme,
        }
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    pub fn bus(&self) -> &AddressBus {
        &self.bus
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn theme_mut(&mut self) -> &mut Theme {
        &mut self.theme
    }

    /// Replace the active theme wholesale; takes effect next frame.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Insert an orphan widget, registering it on the bus.
    pub fn insert(&mut self, widget: Box<dyn Widget>, rect: Rect<f32>) -> NodeId {
        let id = self.tree.insert(widget, rect);
        let address = self.bus.allocate();
        self.tree.set_address(id, address);
        id
    }

    /// Insert a widget directly under `parent`.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        widget: Box<dyn Widget>,
        rect: Rect<f32>,
    ) -> TreeResult<NodeId> {
        let id = self.insert(widget, rect);
        self.tree.add_child(parent, id)?;
        Ok(id)
    }

    /// Insert a widget and make it the root.
    pub fn insert_root(&mut self, widget: Box<dyn Widget>, rect: Rect<f32>) -> NodeId {
        let id = self.insert(widget, rect);
        // Freshly inserted nodes are orphans, so this cannot fail.
        let _ = self.tree.set_root(id);
        id
    }

    /// Remove a node and its subtree, releasing focus/hover state that
    /// pointed into it.
    pub fn remove(&mut self, id: NodeId) -> TreeResult<()> {
        self.tree.remove(id)?;
        self.dispatcher.prune(&self.tree);
        Ok(())
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.dispatcher.focused()
    }

    pub fn set_focus(&mut self, target: Option<NodeId>) {
        self.dispatcher.set_focus(&mut self.tree, &self.bus, target);
    }

    /// Process one frame: route the batch's events into the tree (consumed
    /// events are removed from the batch, the rest stay for the host), then
    /// tick every widget with the elapsed seconds.
    pub fn update(&mut self, batch: &mut EventBatch, dt: f32) {
        // Nodes may have been removed or hidden through `tree_mut` since
        // the last frame.
        self.dispatcher.prune(&self.tree);
        batch.dispatch(|raw| self.dispatcher.dispatch(&mut self.tree, &self.bus, raw));

        let ids: Vec<NodeId> = self.tree.iter().map(|(id, _)| id).collect();
        for id in ids {
            if let Some(widget) = self.tree.widget_mut(id) {
                widget.update(dt);
            }
        }
    }

    /// Draw the tree in paint order (parents before children, first child
    /// bottom-most). Invisible nodes skip their whole subtree.
    pub fn render(&mut self, ctx: &mut dyn DrawContext) {
        if let Some(root) = self.tree.root() {
            self.render_node(ctx, root);
        }
    }

    fn render_node(&mut self, ctx: &mut dyn DrawContext, id: NodeId) {
        if !self.tree.flags(id).contains(NodeFlags::VISIBLE) {
            return;
        }
        let Some(rect) = self.tree.absolute_rect(id) else {
            return;
        };
        let children = match self.tree.get(id) {
            Some(node) => node.children.clone(),
            None => return,
        };
        if let Some(node) = self.tree.get_mut(id) {
            node.widget.draw(ctx, &self.theme, rect);
        }
        for child in children {
            self.render_node(ctx, child);
        }
    }
}

impl Default for Ui {
    fn default() -> Self {
        Self::new()
    }
}
