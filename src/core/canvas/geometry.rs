use std::ops::Add;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Axis-aligned rectangle, `origin` inclusive, `origin + size` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self {
            origin: Point::default(),
            size,
        }
    }

    /// Normalised rectangle spanning two corners, both corners included.
    /// Returns `None` when the corners share an x or y coordinate.
    pub fn from_corners(a: Point, b: Point) -> Option<Self> {
        if a.x == b.x || a.y == b.y {
            return None;
        }
        let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
        let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));
        Some(Self::new(
            x0,
            y0,
            (x1 - x0 + 1) as u32,
            (y1 - y0 + 1) as u32,
        ))
    }

    pub fn left(&self) -> i32 {
        self.origin.x
    }

    pub fn top(&self) -> i32 {
        self.origin.y
    }

    pub fn right(&self) -> i32 {
        self.origin.x + self.size.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.origin.y + self.size.height as i32
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }

    pub fn intersection(&self, other: &Rect) -> Rect {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return Rect::new(left, top, 0, 0);
        }
        Rect::new(left, top, (right - left) as u32, (bottom - top) as u32)
    }

    /// Shrinks every edge by `dx`/`dy`, saturating at an empty rectangle.
    pub fn inset(&self, dx: u32, dy: u32) -> Rect {
        Rect::new(
            self.origin.x + dx as i32,
            self.origin.y + dy as i32,
            self.size.width.saturating_sub(2 * dx),
            self.size.height.saturating_sub(2 * dy),
        )
    }

    pub fn translate(&self, by: Point) -> Rect {
        Rect {
            origin: self.origin + by,
            size: self.size,
        }
    }

    /// Rectangle of `size` centred inside `self`.
    pub fn centered(&self, size: Size) -> Rect {
        let x = self.origin.x + (self.size.width as i32 - size.width as i32) / 2;
        let y = self.origin.y + (self.size.height as i32 - size.height as i32) / 2;
        Rect {
            origin: Point::new(x, y),
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_sharing_an_axis_are_degenerate() {
        assert_eq!(Rect::from_corners(Point::new(100, 200), Point::new(100, 200)), None);
        assert_eq!(Rect::from_corners(Point::new(100, 200), Point::new(100, 400)), None);
    }

    #[test]
    fn corners_are_normalised_and_inclusive() {
        let r = Rect::from_corners(Point::new(30, 40), Point::new(10, 20)).unwrap();
        assert_eq!(r, Rect::new(10, 20, 21, 21));
        assert!(r.contains(Point::new(30, 40)));
        assert!(!r.contains(Point::new(31, 40)));
    }

    #[test]
    fn disjoint_intersection_is_empty() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(20, 20, 5, 5);
        assert!(a.intersection(&b).is_empty());
        assert_eq!(a.intersection(&Rect::new(5, 5, 10, 10)), Rect::new(5, 5, 5, 5));
    }

    #[test]
    fn inset_saturates() {
        assert_eq!(Rect::new(0, 0, 20, 6).inset(5, 5), Rect::new(5, 5, 10, 0));
    }
}
