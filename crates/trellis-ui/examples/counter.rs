//! Classic counter, driven headlessly: a label, two buttons, and a fake
//! pointer clicking them. Swap `TermRenderer` for a real host to draw it.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use trellis_core::color::Color;
use trellis_core::geometry::{Rect, Size};
use trellis_core::math::Vec2;
use trellis_ui::{
    Button, Container, DeviceId, DrawContext, Event, EventQueue, Label, PointerButton, RawEvent,
    Ui,
};

/// Prints draw calls instead of rasterizing them.
struct TermRenderer;

impl DrawContext for TermRenderer {
    fn fill_rect(&mut self, rect: Rect<f32>, color: Color) {
        println!("fill   {rect:?} {color:?}");
    }

    fn stroke_rect(&mut self, rect: Rect<f32>, color: Color, width: f32) {
        println!("stroke {rect:?} {color:?} w={width}");
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, _color: Color, _size: f32, _font: &str) {
        println!("text   {text:?} at {pos:?}");
    }

    fn measure_text(&self, text: &str, size: f32, _font: &str) -> Size<f32> {
        Size::new(text.chars().count() as f32 * size * 0.6, size)
    }

    fn push_clip(&mut self, _rect: Rect<f32>) {}

    fn pop_clip(&mut self) {}
}

fn click(queue: &mut EventQueue, ms: u64, pos: Vec2) {
    let dev = DeviceId::PRIMARY;
    queue.push(RawEvent::new(
        Duration::from_millis(ms),
        dev,
        Event::PointerMoved(pos),
    ));
    queue.push(RawEvent::new(
        Duration::from_millis(ms + 1),
        dev,
        Event::PointerDown(PointerButton::Primary),
    ));
    queue.push(RawEvent::new(
        Duration::from_millis(ms + 2),
        dev,
        Event::PointerUp(PointerButton::Primary),
    ));
}

fn main() {
    trellis_core::logging::init();

    let count = Rc::new(Cell::new(0i32));

    let mut ui = Ui::new();
    let root = ui.insert_root(
        Box::new(Container::panel()),
        Rect::new(0.0, 0.0, 320.0, 120.0),
    );
    let label = ui
        .insert_child(
            root,
            Box::new(Label::new("0")),
            Rect::new(130.0, 20.0, 60.0, 24.0),
        )
        .unwrap();

    let c = Rc::clone(&count);
    ui.insert_child(
        root,
        Box::new(Button::new("-").on_click(move || c.set(c.get() - 1))),
        Rect::new(40.0, 60.0, 60.0, 32.0),
    )
    .unwrap();
    let c = Rc::clone(&count);
    ui.insert_child(
        root,
        Box::new(Button::new("+").on_click(move || c.set(c.get() + 1))),
        Rect::new(220.0, 60.0, 60.0, 32.0),
    )
    .unwrap();

    // One frame per click; queueing them together would collapse the
    // pointer moves into the last position.
    let mut queue = EventQueue::new();
    for (ms, pos) in [
        (0, Vec2::new(250.0, 76.0)),  // +
        (10, Vec2::new(250.0, 76.0)), // +
        (20, Vec2::new(70.0, 76.0)),  // -
    ] {
        click(&mut queue, ms, pos);
        let mut batch = queue.drain();
        ui.update(&mut batch, 0.016);
    }

    if let Some(label) = ui
        .tree_mut()
        .widget_mut(label)
        .and_then(|w| w.as_any_mut().downcast_mut::<Label>())
    {
        label.set_text(count.get().to_string());
    }

    ui.render(&mut TermRenderer);
    println!("count = {}", count.get());
}
