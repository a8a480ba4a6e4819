use super::{Color, Point, Rect, Size};

/// CPU-side pixel buffer for one presented frame, `0x00RRGGBB` per pixel,
/// row-major with no padding. A new one is allocated for every redraw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    size: Size,
    pixels: Vec<u32>,
}

impl Frame {
    pub fn new(size: Size, fill: Color) -> Self {
        Self {
            size,
            pixels: vec![fill.to_xrgb(); size.area()],
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.size)
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, p: Point) -> Option<Color> {
        self.index(p).map(|i| Color::from_xrgb(self.pixels[i]))
    }

    /// Composites `color` onto the pixel at `p`, ignoring out-of-bounds points.
    pub fn blend_pixel(&mut self, p: Point, color: Color) {
        if let Some(i) = self.index(p) {
            self.pixels[i] = color.blend_over(self.pixels[i]);
        }
    }

    /// Composites `color` over `rect` clipped to the frame.
    pub fn blend_rect(&mut self, rect: &Rect, color: Color) {
        let area = self.bounds().intersection(rect);
        if area.is_empty() {
            return;
        }
        let stride = self.size.width as usize;
        let (x0, x1) = (area.left() as usize, area.right() as usize);
        for y in area.top() as usize..area.bottom() as usize {
            let row = &mut self.pixels[y * stride + x0..y * stride + x1];
            if color.a == 255 {
                row.fill(color.to_xrgb());
            } else {
                for px in row {
                    *px = color.blend_over(*px);
                }
            }
        }
    }

    /// Number of pixels inside `rect` equal to `color`.
    pub fn count_in(&self, rect: &Rect, color: Color) -> usize {
        let area = self.bounds().intersection(rect);
        let want = color.to_xrgb();
        let stride = self.size.width as usize;
        (area.top()..area.bottom())
            .map(|y| {
                let start = y as usize * stride;
                self.pixels[start + area.left() as usize..start + area.right() as usize]
                    .iter()
                    .filter(|&&px| px == want)
                    .count()
            })
            .sum()
    }

    fn index(&self, p: Point) -> Option<usize> {
        self.bounds()
            .contains(p)
            .then(|| p.y as usize * self.size.width as usize + p.x as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_rect_clips_to_frame() {
        let mut frame = Frame::new(Size::new(4, 4), Color::BLACK);
        frame.blend_rect(&Rect::new(2, 2, 10, 10), Color::WHITE);
        assert_eq!(frame.count_in(&frame.bounds(), Color::WHITE), 4);
        assert_eq!(frame.pixel(Point::new(1, 1)), Some(Color::BLACK));
        assert_eq!(frame.pixel(Point::new(3, 3)), Some(Color::WHITE));
    }

    #[test]
    fn out_of_bounds_pixels_are_ignored() {
        let mut frame = Frame::new(Size::new(2, 2), Color::BLACK);
        frame.blend_pixel(Point::new(-1, 0), Color::WHITE);
        frame.blend_pixel(Point::new(2, 0), Color::WHITE);
        assert_eq!(frame.pixel(Point::new(2, 0)), None);
        assert_eq!(frame.count_in(&frame.bounds(), Color::BLACK), 4);
    }
}
