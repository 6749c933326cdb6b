//! Flat style-attribute store consulted by widgets at draw time.
//!
//! The theme is a single mapping from string keys to values. Lookups never
//! fail: a key missing from the store falls back to the built-in default
//! table, and a key missing there falls back to a hard per-type default,
//! so rendering never halts on an absent style.
//!
//! # Example
//!
//! ```
//! use trellis_ui::theme::{StyleValue, Theme, keys};
//! use trellis_core::color::Color;
//!
//! let mut theme = Theme::dark();
//! theme.set(keys::ACCENT, StyleValue::Color(Color::from_hex(0xFF8800)));
//!
//! let accent = theme.color(keys::ACCENT);
//! let padding = theme.number(keys::PADDING);
//! # let _ = (accent, padding);
//! ```

use trellis_core::alloc::HashMap;
use trellis_core::color::Color;

/// Well-known style keys used by the built-in widgets.
pub mod keys {
    pub const WINDOW_BACKGROUND: &str = "window.background";
    pub const WINDOW_BORDER: &str = "window.border";
    pub const WINDOW_TITLE: &str = "window.title.background";
    pub const WINDOW_TITLE_TEXT: &str = "window.title.text";
    pub const TEXT_COLOR: &str = "text.color";
    pub const TEXT_MUTED: &str = "text.muted";
    pub const BUTTON_BACKGROUND: &str = "button.background";
    pub const BUTTON_HOVER: &str = "button.hover";
    pub const BUTTON_ACTIVE: &str = "button.active";
    pub const BUTTON_TEXT: &str = "button.text";
    pub const SLIDER_TRACK: &str = "slider.track";
    pub const SLIDER_HANDLE: &str = "slider.handle";
    pub const ACCENT: &str = "accent";
    pub const PADDING: &str = "padding";
    pub const BORDER_WIDTH: &str = "border.width";
    pub const FONT_BODY: &str = "font.body";
    pub const FONT_SIZE_BODY: &str = "font.size.body";
    pub const FONT_SIZE_SMALL: &str = "font.size.small";
}

/// A single style attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Color(Color),
    Number(f32),
    /// Font family reference, resolved by the host's text renderer.
    Font(String),
}

/// Hard fallbacks used when a key is absent from both the store and the
/// default table. Magenta makes a missing color style visible at a glance.
const FALLBACK_COLOR: Color = Color::rgb(1.0, 0.0, 1.0);
const FALLBACK_NUMBER: f32 = 0.0;
const FALLBACK_FONT: &str = "sans-serif";

/// The shared style store.
///
/// Mutated only through [`Theme::set`]; widgets receive `&Theme` during the
/// draw pass, making it read-only there by construction.
#[derive(Debug, Clone)]
pub struct Theme {
    values: HashMap<String, StyleValue>,
    defaults: HashMap<&'static str, StyleValue>,
}

impl Theme {
    /// The default dark theme.
    pub fn dark() -> Self {
        Self::from_palette(
            Color::from_rgb_u8(24, 24, 28),
            Color::from_rgb_u8(235, 235, 235),
            Color::from_rgb_u8(60, 120, 200),
        )
    }

    /// A light theme.
    pub fn light() -> Self {
        Self::from_palette(
            Color::from_rgb_u8(245, 245, 245),
            Color::from_rgb_u8(20, 20, 20),
            Color::from_rgb_u8(50, 100, 200),
        )
    }

    /// Generate a palette from a hue (degrees) and a contrast factor in
    /// `0.0..=1.0`. Backgrounds take the hue at low lightness; text
    /// lightness scales with contrast.
    pub fn from_hue(hue: f32, contrast: f32) -> Self {
        let contrast = contrast.clamp(0.0, 1.0);
        let background = Color::from_hsl(hue, 0.35, 0.10 + 0.08 * (1.0 - contrast));
        let foreground = Color::from_hsl(hue, 0.10, 0.55 + 0.40 * contrast);
        let accent = Color::from_hsl(hue, 0.60, 0.50);
        Self::from_palette(background, foreground, accent)
    }

    fn from_palette(background: Color, foreground: Color, accent: Color) -> Self {
        let mut defaults = HashMap::new();
        defaults.insert(keys::WINDOW_BACKGROUND, StyleValue::Color(background));
        defaults.insert(
            keys::WINDOW_BORDER,
            StyleValue::Color(background.lighten(0.25)),
        );
        defaults.insert(keys::WINDOW_TITLE, StyleValue::Color(accent.darken(0.30)));
        defaults.insert(keys::WINDOW_TITLE_TEXT, StyleValue::Color(foreground));
        defaults.insert(keys::TEXT_COLOR, StyleValue::Color(foreground));
        defaults.insert(keys::TEXT_MUTED, StyleValue::Color(foreground.darken(0.35)));
        defaults.insert(
            keys::BUTTON_BACKGROUND,
            StyleValue::Color(background.lighten(0.12)),
        );
        defaults.insert(
            keys::BUTTON_HOVER,
            StyleValue::Color(background.lighten(0.22)),
        );
        defaults.insert(keys::BUTTON_ACTIVE, StyleValue::Color(accent.darken(0.15)));
        defaults.insert(keys::BUTTON_TEXT, StyleValue::Color(foreground));
        defaults.insert(
            keys::SLIDER_TRACK,
            StyleValue::Color(background.lighten(0.18)),
        );
        defaults.insert(keys::SLIDER_HANDLE, StyleValue::Color(accent));
        defaults.insert(keys::ACCENT, StyleValue::Color(accent));
        defaults.insert(keys::PADDING, StyleValue::Number(4.0));
        defaults.insert(keys::BORDER_WIDTH, StyleValue::Number(1.0));
        defaults.insert(keys::FONT_BODY, StyleValue::Font("sans-serif".to_owned()));
        defaults.insert(keys::FONT_SIZE_BODY, StyleValue::Number(14.0));
        defaults.insert(keys::FONT_SIZE_SMALL, StyleValue::Number(11.0));

        Self {
            values: HashMap::new(),
            defaults,
        }
    }

    /// Look up a style value. Falls back to the built-in default for the
    /// key, then to a hard number default; never fails.
    pub fn get(&self, key: &str) -> StyleValue {
        if let Some(value) = self.values.get(key) {
            return value.clone();
        }
        if let Some(value) = self.defaults.get(key) {
            return value.clone();
        }
        StyleValue::Number(FALLBACK_NUMBER)
    }

    /// Whether `key` has been explicitly set (as opposed to defaulted).
    pub fn is_set(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Set or replace a style value.
    pub fn set(&mut self, key: impl Into<String>, value: StyleValue) {
        self.values.insert(key.into(), value);
    }

    /// Remove an explicit value, reverting the key to its default.
    pub fn unset(&mut self, key: &str) {
        self.values.remove(key);
    }

    /// Typed color lookup. Non-color values under `key` yield the visible
    /// magenta fallback rather than an error.
    pub fn color(&self, key: &str) -> Color {
        match self.get(key) {
            StyleValue::Color(color) => color,
            _ => FALLBACK_COLOR,
        }
    }

    /// Typed number lookup.
    pub fn number(&self, key: &str) -> f32 {
        match self.get(key) {
            StyleValue::Number(value) => value,
            _ => FALLBACK_NUMBER,
        }
    }

    /// Typed font lookup.
    pub fn font(&self, key: &str) -> String {
        match self.get(key) {
            StyleValue::Font(font) => font,
            _ => FALLBACK_FONT.to_owned(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
