//! Drawing abstraction implemented by the host library.
//!
//! Trellis does not render anything itself. Once per frame the host hands
//! [`Ui::render`] a [`DrawContext`] and widgets issue primitive calls into
//! it; everything past that boundary (rasterization, fonts, swapchains)
//! belongs to the host.
//!
//! [`Ui::render`]: crate::Ui::render

use trellis_core::color::Color;
use trellis_core::geometry::{Rect, Size};
use trellis_core::math::Vec2;

/// Primitive drawing surface supplied by the host once per frame.
pub trait DrawContext {
    /// Fill a rectangle with a solid color.
    fn fill_rect(&mut self, rect: Rect<f32>, color: Color);

    /// Stroke a rectangle outline.
    fn stroke_rect(&mut self, rect: Rect<f32>, color: Color, width: f32);

    /// Draw a single line of text with its top-left corner at `pos`.
    fn draw_text(&mut self, text: &str, pos: Vec2, color: Color, size: f32, font: &str);

    /// Measure a single line of text without drawing it.
    fn measure_text(&self, text: &str, size: f32, font: &str) -> Size<f32>;

    /// Push a clip rectangle; subsequent drawing is clipped to the
    /// intersection of all pushed rects.
    fn push_clip(&mut self, rect: Rect<f32>);

    /// Pop the most recent clip rectangle.
    fn pop_clip(&mut self);
}
