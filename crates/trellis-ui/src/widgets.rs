//! The [`Widget`] trait and the built-in widget set.

use std::any::Any;
use std::rc::Rc;

use crate::event::{EventCtx, EventOutcome, WidgetEvent};
use crate::render::DrawContext;
use crate::theme::{Theme, keys};
use trellis_core::geometry::Rect;
use trellis_core::math::Vec2;
use trellis_input::{Key, PointerButton};

/// A widget: the behavior attached to a tree node.
///
/// Widgets are plain state machines. They receive events from the
/// dispatcher, mutate their own state, and draw themselves into the host's
/// [`DrawContext`] when asked. They never touch the tree directly.
pub trait Widget: Any {
    /// Stable name for logging and debugging.
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Per-frame tick with the elapsed time in seconds.
    fn update(&mut self, _dt: f32) {}

    /// React to an event. The default bubbles everything.
    fn handle_event(&mut self, _event: &WidgetEvent, _ctx: &mut EventCtx) -> EventOutcome {
        EventOutcome::Bubble
    }

    /// Draw into `rect`, the widget's absolute rectangle for this frame.
    fn draw(&mut self, _ctx: &mut dyn DrawContext, _theme: &Theme, _rect: Rect<f32>) {}
}

/// Structural widget that optionally paints a background panel.
///
/// A filled container consumes pointer events so clicks on a panel do not
/// reach whatever sits behind it; a plain group lets everything bubble.
pub struct Container {
    filled: bool,
    bordered: bool,
}

impl Container {
    /// Invisible grouping node. Draws nothing, bubbles everything.
    pub fn group() -> Self {
        Self {
            filled: false,
            bordered: false,
        }
    }

    /// Opaque panel with a border. Swallows pointer events inside it.
    pub fn panel() -> Self {
        Self {
            filled: true,
            bordered: true,
        }
    }
}

impl Widget for Container {
    fn type_name(&self) -> &'static str {
        "Container"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn handle_event(&mut self, event: &WidgetEvent, _ctx: &mut EventCtx) -> EventOutcome {
        if !self.filled {
            return EventOutcome::Bubble;
        }
        match event {
            WidgetEvent::PointerDown { .. }
            | WidgetEvent::PointerUp { .. }
            | WidgetEvent::PointerMoved { .. }
            | WidgetEvent::Click { .. } => EventOutcome::Consumed,
            _ => EventOutcome::Bubble,
        }
    }

    fn draw(&mut self, ctx: &mut dyn DrawContext, theme: &Theme, rect: Rect<f32>) {
        if self.filled {
            ctx.fill_rect(rect, theme.color(keys::WINDOW_BACKGROUND));
        }
        if self.bordered {
            ctx.stroke_rect(
                rect,
                theme.color(keys::WINDOW_BORDER),
                theme.number(keys::BORDER_WIDTH),
            );
        }
    }
}

/// Draggable in-UI window panel with a title bar.
///
/// Dragging the title bar moves the window's node (via a dispatcher move
/// request); pressing anywhere on it raises it above its siblings. When a
/// drag ends near an edge of the parent container the window snaps flush
/// against it. The body swallows pointer events like a [`Container::panel`]
/// so content behind the window stays untouched.
pub struct Window {
    title: String,
    movable: bool,
    snap_threshold: f32,
    drag_anchor: Option<Vec2>,
}

impl Window {
    pub const TITLE_HEIGHT: f32 = 24.0;

    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            movable: true,
            snap_threshold: 10.0,
            drag_anchor: None,
        }
    }

    /// A window that cannot be dragged. It still raises on press.
    pub fn fixed(mut self) -> Self {
        self.movable = false;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    fn in_title_bar(pos: Vec2, rect: Rect<f32>) -> bool {
        pos.y - rect.y <= Self::TITLE_HEIGHT
    }

    /// Offset that puts `rect` flush against any parent edge within the
    /// snap threshold, zero on the axes where none is close enough.
    fn snap_delta(&self, rect: Rect<f32>, parent: Rect<f32>) -> Vec2 {
        let left = parent.x - rect.x;
        let right = (parent.x + parent.width) - (rect.x + rect.width);
        let top = parent.y - rect.y;
        let bottom = (parent.y + parent.height) - (rect.y + rect.height);

        let dx = if left.abs() <= self.snap_threshold {
            left
        } else if right.abs() <= self.snap_threshold {
            right
        } else {
            0.0
        };
        let dy = if top.abs() <= self.snap_threshold {
            top
        } else if bottom.abs() <= self.snap_threshold {
            bottom
        } else {
            0.0
        };
        Vec2::new(dx, dy)
    }
}

impl Widget for Window {
    fn type_name(&self) -> &'static str {
        "Window"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn handle_event(&mut self, event: &WidgetEvent, ctx: &mut EventCtx) -> EventOutcome {
        match event {
            WidgetEvent::PointerDown {
                pos,
                button: PointerButton::Primary,
                ..
            } => {
                ctx.request_raise();
                if self.movable && Self::in_title_bar(*pos, ctx.rect()) {
                    self.drag_anchor = Some(*pos);
                }
                EventOutcome::Consumed
            }
            WidgetEvent::PointerMoved { pos, .. } => {
                if let Some(anchor) = self.drag_anchor {
                    ctx.request_move_by(*pos - anchor);
                    self.drag_anchor = Some(*pos);
                }
                EventOutcome::Consumed
            }
            WidgetEvent::PointerUp {
                button: PointerButton::Primary,
                ..
            } => {
                if self.drag_anchor.take().is_some() {
                    if let Some(parent) = ctx.parent_rect() {
                        let delta = self.snap_delta(ctx.rect(), parent);
                        if delta != Vec2::ZERO {
                            ctx.request_move_by(delta);
                        }
                    }
                }
                EventOutcome::Consumed
            }
            WidgetEvent::Click { .. } => EventOutcome::Consumed,
            _ => EventOutcome::Bubble,
        }
    }

    fn draw(&mut self, ctx: &mut dyn DrawContext, theme: &Theme, rect: Rect<f32>) {
        ctx.fill_rect(rect, theme.color(keys::WINDOW_BACKGROUND));

        let title_bar = Rect::new(rect.x, rect.y, rect.width, Self::TITLE_HEIGHT);
        ctx.fill_rect(title_bar, theme.color(keys::WINDOW_TITLE));

        let size = theme.number(keys::FONT_SIZE_BODY);
        let font = theme.font(keys::FONT_BODY);
        let padding = theme.number(keys::PADDING);
        let measured = ctx.measure_text(&self.title, size, &font);
        ctx.draw_text(
            &self.title,
            Vec2::new(
                title_bar.x + padding,
                title_bar.y + (title_bar.height - measured.height) / 2.0,
            ),
            theme.color(keys::WINDOW_TITLE_TEXT),
            size,
            &font,
        );

        ctx.stroke_rect(
            rect,
            theme.color(keys::WINDOW_BORDER),
            theme.number(keys::BORDER_WIDTH),
        );
    }
}

/// Horizontal text alignment for a [`Label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Static single-line text. Inert: ignores every event.
pub struct Label {
    text: String,
    align: TextAlign,
    muted: bool,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            align: TextAlign::Left,
            muted: false,
        }
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn muted(mut self) -> Self {
        self.muted = true;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Truncate `text` with a trailing ellipsis until it fits `max_width`.
    fn fit(
        ctx: &dyn DrawContext,
        text: &str,
        max_width: f32,
        size: f32,
        font: &str,
    ) -> Option<String> {
        if ctx.measure_text(text, size, font).width <= max_width {
            return None;
        }
        let mut end = text.chars().count();
        while end > 0 {
            end -= 1;
            let truncated: String = text.chars().take(end).chain("…".chars()).collect();
            if ctx.measure_text(&truncated, size, font).width <= max_width {
                return Some(truncated);
            }
        }
        Some("…".to_owned())
    }
}

impl Widget for Label {
    fn type_name(&self) -> &'static str {
        "Label"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn handle_event(&mut self, _event: &WidgetEvent, _ctx: &mut EventCtx) -> EventOutcome {
        EventOutcome::Ignored
    }

    fn draw(&mut self, ctx: &mut dyn DrawContext, theme: &Theme, rect: Rect<f32>) {
        let color = if self.muted {
            theme.color(keys::TEXT_MUTED)
        } else {
            theme.color(keys::TEXT_COLOR)
        };
        let size = theme.number(keys::FONT_SIZE_BODY);
        let font = theme.font(keys::FONT_BODY);

        let fitted = Self::fit(ctx, &self.text, rect.width, size, &font);
        let text = fitted.as_deref().unwrap_or(&self.text);
        let measured = ctx.measure_text(text, size, &font);

        let x = match self.align {
            TextAlign::Left => rect.x,
            TextAlign::Center => rect.x + (rect.width - measured.width) / 2.0,
            TextAlign::Right => rect.x + rect.width - measured.width,
        };
        let y = rect.y + (rect.height - measured.height) / 2.0;
        ctx.draw_text(text, Vec2::new(x, y), color, size, &font);
    }
}

/// Multi-line text with greedy word wrapping. Inert like [`Label`].
///
/// Explicit newlines start new paragraphs; within a paragraph words are
/// packed onto lines until the next word would overflow the widget width.
/// A single word wider than the widget gets a line of its own rather than
/// being split mid-word.
pub struct MultiLabel {
    text: String,
    align: TextAlign,
    padding: f32,
    line_spacing: f32,
}

impl MultiLabel {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            align: TextAlign::Left,
            padding: 2.0,
            line_spacing: 2.0,
        }
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    fn wrap(
        ctx: &dyn DrawContext,
        text: &str,
        max_width: f32,
        size: f32,
        font: &str,
    ) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            if paragraph.is_empty() {
                lines.push(String::new());
                continue;
            }
            let mut line = String::new();
            for word in paragraph.split_whitespace() {
                let candidate = if line.is_empty() {
                    word.to_owned()
                } else {
                    format!("{line} {word}")
                };
                if ctx.measure_text(&candidate, size, font).width <= max_width {
                    line = candidate;
                } else {
                    if !line.is_empty() {
                        lines.push(line);
                    }
                    line = word.to_owned();
                }
            }
            if !line.is_empty() {
                lines.push(line);
            }
        }
        lines
    }
}

impl Widget for MultiLabel {
    fn type_name(&self) -> &'static str {
        "MultiLabel"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn handle_event(&mut self, _event: &WidgetEvent, _ctx: &mut EventCtx) -> EventOutcome {
        EventOutcome::Ignored
    }

    fn draw(&mut self, ctx: &mut dyn DrawContext, theme: &Theme, rect: Rect<f32>) {
        let color = theme.color(keys::TEXT_COLOR);
        let size = theme.number(keys::FONT_SIZE_BODY);
        let font = theme.font(keys::FONT_BODY);

        let avail = (rect.width - 2.0 * self.padding).max(0.0);
        let lines = Self::wrap(ctx, &self.text, avail, size, &font);

        let mut y = rect.y + self.padding;
        for line in &lines {
            if y + size > rect.y + rect.height - self.padding {
                break;
            }
            let measured = ctx.measure_text(line, size, &font);
            let x = match self.align {
                TextAlign::Left => rect.x + self.padding,
                TextAlign::Center => rect.x + (rect.width - measured.width) / 2.0,
                TextAlign::Right => rect.x + rect.width - self.padding - measured.width,
            };
            ctx.draw_text(line, Vec2::new(x, y), color, size, &font);
            y += size + self.line_spacing;
        }
    }
}

/// Push button with hover and pressed feedback.
pub struct Button {
    label: String,
    on_click: Option<Rc<dyn Fn()>>,
    hovered: bool,
    pressed: bool,
    focused: bool,
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            on_click: None,
            hovered: false,
            pressed: false,
            focused: false,
        }
    }

    pub fn on_click(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_click = Some(Rc::new(callback));
        self
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    fn activate(&self) {
        if let Some(callback) = &self.on_click {
            callback();
        }
    }
}

impl Widget for Button {
    fn type_name(&self) -> &'static str {
        "Button"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn handle_event(&mut self, event: &WidgetEvent, ctx: &mut EventCtx) -> EventOutcome {
        match event {
            WidgetEvent::PointerEnter { .. } => {
                self.hovered = true;
                EventOutcome::Consumed
            }
            WidgetEvent::PointerLeave { .. } => {
                self.hovered = false;
                self.pressed = false;
                EventOutcome::Consumed
            }
            WidgetEvent::PointerDown {
                button: PointerButton::Primary,
                ..
            } => {
                self.pressed = true;
                ctx.claim_focus();
                EventOutcome::Consumed
            }
            WidgetEvent::PointerUp {
                button: PointerButton::Primary,
                ..
            } => {
                self.pressed = false;
                EventOutcome::Consumed
            }
            WidgetEvent::Click {
                button: PointerButton::Primary,
                ..
            } => {
                self.activate();
                EventOutcome::Consumed
            }
            WidgetEvent::KeyDown(Key::Enter) | WidgetEvent::KeyDown(Key::Space) => {
                self.activate();
                EventOutcome::Consumed
            }
            WidgetEvent::FocusGained => {
                self.focused = true;
                EventOutcome::Consumed
            }
            WidgetEvent::FocusLost => {
                self.focused = false;
                EventOutcome::Consumed
            }
            _ => EventOutcome::Bubble,
        }
    }

    fn draw(&mut self, ctx: &mut dyn DrawContext, theme: &Theme, rect: Rect<f32>) {
        let background = if self.pressed {
            theme.color(keys::BUTTON_ACTIVE)
        } else if self.hovered {
            theme.color(keys::BUTTON_HOVER)
        } else {
            theme.color(keys::BUTTON_BACKGROUND)
        };
        ctx.fill_rect(rect, background);
        if self.focused {
            ctx.stroke_rect(
                rect,
                theme.color(keys::ACCENT),
                theme.number(keys::BORDER_WIDTH),
            );
        }

        let size = theme.number(keys::FONT_SIZE_BODY);
        let font = theme.font(keys::FONT_BODY);
        let measured = ctx.measure_text(&self.label, size, &font);
        let pos = Vec2::new(
            rect.x + (rect.width - measured.width) / 2.0,
            rect.y + (rect.height - measured.height) / 2.0,
        );
        ctx.draw_text(&self.label, pos, theme.color(keys::BUTTON_TEXT), size, &font);
    }
}

/// Horizontal value slider over a closed range.
pub struct Slider {
    min: f32,
    max: f32,
    value: f32,
    on_change: Option<Rc<dyn Fn(f32)>>,
    dragging: bool,
}

impl Slider {
    pub fn new(min: f32, max: f32, value: f32) -> Self {
        Self {
            min,
            max,
            value: value.clamp(min, max),
            on_change: None,
            dragging: false,
        }
    }

    pub fn on_change(mut self, callback: impl Fn(f32) + 'static) -> Self {
        self.on_change = Some(Rc::new(callback));
        self
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set_value(&mut self, value: f32) {
        let value = value.clamp(self.min, self.max);
        if value != self.value {
            self.value = value;
            if let Some(callback) = &self.on_change {
                callback(value);
            }
        }
    }

    /// Fraction of the range covered by the current value, in `0.0..=1.0`.
    pub fn fraction(&self) -> f32 {
        if self.max > self.min {
            (self.value - self.min) / (self.max - self.min)
        } else {
            0.0
        }
    }

    fn value_at(&self, x: f32, track: Rect<f32>) -> f32 {
        if track.width <= 0.0 {
            return self.min;
        }
        let t = ((x - track.x) / track.width).clamp(0.0, 1.0);
        self.min + t * (self.max - self.min)
    }

    fn nudge(&mut self, direction: f32) {
        let step = (self.max - self.min) / 100.0;
        self.set_value(self.value + direction * step);
    }
}

impl Widget for Slider {
    fn type_name(&self) -> &'static str {
        "Slider"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn handle_event(&mut self, event: &WidgetEvent, ctx: &mut EventCtx) -> EventOutcome {
        match event {
            WidgetEvent::PointerDown {
                pos,
                button: PointerButton::Primary,
                ..
            } => {
                self.dragging = true;
                self.set_value(self.value_at(pos.x, ctx.rect()));
                ctx.claim_focus();
                EventOutcome::Consumed
            }
            WidgetEvent::PointerMoved { pos, .. } if self.dragging => {
                self.set_value(self.value_at(pos.x, ctx.rect()));
                EventOutcome::Consumed
            }
            WidgetEvent::PointerUp {
                button: PointerButton::Primary,
                ..
            } => {
                self.dragging = false;
                EventOutcome::Consumed
            }
            WidgetEvent::PointerLeave { .. } => {
                self.dragging = false;
                EventOutcome::Bubble
            }
            WidgetEvent::KeyDown(Key::ArrowLeft) => {
                self.nudge(-1.0);
                EventOutcome::Consumed
            }
            WidgetEvent::KeyDown(Key::ArrowRight) => {
                self.nudge(1.0);
                EventOutcome::Consumed
            }
            _ => EventOutcome::Bubble,
        }
    }

    fn draw(&mut self, ctx: &mut dyn DrawContext, theme: &Theme, rect: Rect<f32>) {
        let track_height = (rect.height * 0.25).max(2.0);
        let track = Rect::new(
            rect.x,
            rect.y + (rect.height - track_height) / 2.0,
            rect.width,
            track_height,
        );
        ctx.fill_rect(track, theme.color(keys::SLIDER_TRACK));

        let handle_width = rect.height * 0.5;
        let handle_x = rect.x + self.fraction() * (rect.width - handle_width);
        let handle = Rect::new(handle_x, rect.y, handle_width, rect.height);
        ctx.fill_rect(handle, theme.color(keys::SLIDER_HANDLE));
    }
}
