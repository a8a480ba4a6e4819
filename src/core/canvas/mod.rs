// src/core/canvas/mod.rs
mod color;
mod context;
mod frame;
mod geometry;

pub use color::Color;
pub use context::{DrawContext, GLYPH_HEIGHT, GLYPH_WIDTH, LineStyle, text_width};
pub use frame::Frame;
pub use geometry::{Point, Rect, Size};
