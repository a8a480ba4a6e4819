use log::trace;
use smallvec::SmallVec;

use super::{Color, Frame, Point, Rect, Size};

pub const GLYPH_WIDTH: u32 = 8;
pub const GLYPH_HEIGHT: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Continuous,
    Dashed,
    Dotted,
}

impl LineStyle {
    /// Whether the pixel at `offset` along a stroke is painted.
    fn paints(self, offset: u32) -> bool {
        match self {
            LineStyle::Continuous => true,
            LineStyle::Dashed => (offset / 6) % 2 == 0,
            LineStyle::Dotted => (offset / 2) % 2 == 0,
        }
    }
}

/// Frame-scoped drawing context bound to one region of a [`Frame`].
///
/// Coordinates passed to drawing calls are relative to the region origin and
/// everything is clipped to the region. The context borrows the frame, so it
/// cannot outlive the redraw that created it; [`flush`](Self::flush) consumes
/// it.
pub struct DrawContext<'f> {
    frame: &'f mut Frame,
    region: Rect,
    background: Color,
    foreground: Color,
    line_width: u32,
    line_style: LineStyle,
    attributes: SmallVec<[(&'static str, String); 4]>,
    ops: usize,
}

impl<'f> DrawContext<'f> {
    pub fn new(frame: &'f mut Frame, region: Rect) -> Self {
        let region = frame.bounds().intersection(&region);
        Self {
            frame,
            region,
            background: Color::WHITE,
            foreground: Color::BLACK,
            line_width: 1,
            line_style: LineStyle::Continuous,
            attributes: SmallVec::new(),
            ops: 0,
        }
    }

    pub fn size(&self) -> Size {
        self.region.size
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    pub fn set_foreground(&mut self, color: Color) {
        self.foreground = color;
    }

    pub fn foreground(&self) -> Color {
        self.foreground
    }

    pub fn set_line_width(&mut self, width: u32) {
        self.line_width = width.max(1);
    }

    pub fn line_width(&self) -> u32 {
        self.line_width
    }

    pub fn set_line_style(&mut self, style: LineStyle) {
        self.line_style = style;
    }

    pub fn line_style(&self) -> LineStyle {
        self.line_style
    }

    /// Stores a named string attribute. No drawing call reads these.
    pub fn set_attribute(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Fills the whole region with the background colour.
    pub fn clear(&mut self) {
        self.frame.blend_rect(&self.region, self.background.with_alpha(255));
        self.ops += 1;
    }

    /// Outlines the rectangle spanning corners `(x1, y1)` and `(x2, y2)` with
    /// the current foreground, line width and style. The stroke grows inward.
    /// Zero-area rectangles produce no pixels.
    pub fn rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.ops += 1;
        let Some(r) = Rect::from_corners(Point::new(x1, y1), Point::new(x2, y2)) else {
            trace!("skipping zero-area rect ({x1},{y1})-({x2},{y2})");
            return;
        };
        let w = self.line_width.min(r.size.width).min(r.size.height) as i32;
        for i in 0..w {
            let ring = r.inset(i as u32, i as u32);
            if ring.is_empty() {
                break;
            }
            self.stroke_ring(&ring);
        }
    }

    /// Fills a rectangle with the foreground colour.
    pub fn fill(&mut self, rect: Rect) {
        self.ops += 1;
        let clipped = self.to_frame(rect).intersection(&self.region);
        self.frame.blend_rect(&clipped, self.foreground);
    }

    /// Draws `text` with the 8x16 bitmap font; returns the advance in pixels.
    pub fn text(&mut self, x: i32, y: i32, text: &str) -> u32 {
        use font8x8::legacy::{BASIC_LEGACY, NOTHING_TO_DISPLAY};

        self.ops += 1;
        let mut dx = 0;
        for c in text.chars() {
            let glyph = BASIC_LEGACY.get(c as usize).unwrap_or(&NOTHING_TO_DISPLAY);
            // each font row is doubled to get 8x16 cells
            for (dy, row) in glyph.iter().flat_map(|r| [*r, *r]).enumerate() {
                for bit in 0..8 {
                    if (row >> bit) & 1 != 0 {
                        self.plot(Point::new(x + dx + bit, y + dy as i32));
                    }
                }
            }
            dx += GLYPH_WIDTH as i32;
        }
        dx as u32
    }

    /// Ends the frame for this context.
    pub fn flush(self) {
        trace!(
            "flushed {} draw ops in {}x{} region at ({}, {})",
            self.ops,
            self.region.size.width,
            self.region.size.height,
            self.region.origin.x,
            self.region.origin.y
        );
    }

    fn stroke_ring(&mut self, r: &Rect) {
        let (l, t, rr, b) = (r.left(), r.top(), r.right() - 1, r.bottom() - 1);
        let mut offset = 0;
        for x in l..=rr {
            self.plot_styled(Point::new(x, t), offset);
            offset += 1;
        }
        for y in t + 1..=b {
            self.plot_styled(Point::new(rr, y), offset);
            offset += 1;
        }
        if b > t {
            for x in (l..rr).rev() {
                self.plot_styled(Point::new(x, b), offset);
                offset += 1;
            }
        }
        if rr > l {
            for y in (t + 1..b).rev() {
                self.plot_styled(Point::new(l, y), offset);
                offset += 1;
            }
        }
    }

    fn plot_styled(&mut self, p: Point, offset: u32) {
        if self.line_style.paints(offset) {
            self.plot(p);
        }
    }

    fn plot(&mut self, p: Point) {
        let p = p + self.region.origin;
        if self.region.contains(p) {
            self.frame.blend_pixel(p, self.foreground);
        }
    }

    fn to_frame(&self, rect: Rect) -> Rect {
        rect.translate(self.region.origin)
    }
}

pub fn text_width(text: &str) -> u32 {
    text.chars().count() as u32 * GLYPH_WIDTH
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::new(Size::new(64, 48), Color::BLACK)
    }

    #[test]
    fn clear_only_touches_the_region() {
        let mut frame = frame();
        let region = Rect::new(8, 8, 16, 16);
        let mut cx = DrawContext::new(&mut frame, region);
        cx.set_background(Color::BLUE);
        cx.clear();
        cx.flush();
        assert_eq!(frame.count_in(&region, Color::BLUE), 256);
        assert_eq!(frame.count_in(&frame.bounds(), Color::BLUE), 256);
    }

    #[test]
    fn rect_outline_respects_line_width() {
        let mut frame = frame();
        let mut cx = DrawContext::new(&mut frame, Rect::new(0, 0, 64, 48));
        cx.set_foreground(Color::WHITE);
        cx.set_line_width(3);
        cx.rect(10, 10, 29, 29);
        cx.flush();
        // 20x20 square minus its 14x14 interior
        assert_eq!(frame.count_in(&frame.bounds(), Color::WHITE), 400 - 196);
        assert_eq!(frame.pixel(Point::new(20, 20)), Some(Color::BLACK));
        assert_eq!(frame.pixel(Point::new(12, 20)), Some(Color::WHITE));
    }

    #[test]
    fn zero_area_rect_draws_nothing() {
        let mut frame = frame();
        let before = frame.clone();
        let mut cx = DrawContext::new(&mut frame, Rect::new(0, 0, 64, 48));
        cx.set_foreground(Color::WHITE);
        cx.set_line_width(3);
        cx.rect(20, 30, 20, 30);
        cx.flush();
        assert_eq!(frame, before);
    }

    #[test]
    fn drawing_is_clipped_and_offset_by_region() {
        let mut frame = frame();
        let mut cx = DrawContext::new(&mut frame, Rect::new(10, 10, 5, 5));
        cx.set_foreground(Color::WHITE);
        cx.fill(Rect::new(-3, -3, 100, 100));
        cx.flush();
        assert_eq!(frame.count_in(&frame.bounds(), Color::WHITE), 25);
        assert_eq!(frame.pixel(Point::new(10, 10)), Some(Color::WHITE));
        assert_eq!(frame.pixel(Point::new(9, 10)), Some(Color::BLACK));
    }

    #[test]
    fn dashed_outline_skips_pixels() {
        let mut frame = frame();
        let mut cx = DrawContext::new(&mut frame, Rect::new(0, 0, 64, 48));
        cx.set_foreground(Color::WHITE);
        cx.set_line_style(LineStyle::Dashed);
        cx.rect(0, 0, 23, 23);
        cx.flush();
        let painted = frame.count_in(&frame.bounds(), Color::WHITE);
        assert!(painted > 0 && painted < 92);
    }

    #[test]
    fn attributes_are_replaced_not_duplicated() {
        let mut frame = frame();
        let mut cx = DrawContext::new(&mut frame, Rect::new(0, 0, 1, 1));
        cx.set_attribute("DRAWCOLOR", "1 2 3");
        cx.set_attribute("DRAWCOLOR", "4 5 6");
        assert_eq!(cx.attribute("DRAWCOLOR"), Some("4 5 6"));
        assert_eq!(cx.attribute("MISSING"), None);
    }

    #[test]
    fn text_advances_one_cell_per_char() {
        let mut frame = frame();
        let mut cx = DrawContext::new(&mut frame, Rect::new(0, 0, 64, 48));
        cx.set_foreground(Color::WHITE);
        assert_eq!(cx.text(0, 0, "New"), 3 * GLYPH_WIDTH);
        cx.flush();
        assert!(frame.count_in(&Rect::new(0, 0, 24, 16), Color::WHITE) > 0);
        assert_eq!(text_width("File"), 32);
    }
}
