// src/ui/layout.rs
use smallvec::SmallVec;

use crate::core::canvas::Rect;

/// How much vertical space a [`VBox`] child asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extent {
    Fixed(u32),
    /// Shares whatever the fixed children leave over.
    Fill,
}

/// Vertical box with a uniform margin and a gap between children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VBox {
    pub margin: (u32, u32),
    pub gap: u32,
}

impl VBox {
    pub fn arrange(&self, bounds: Rect, children: &[Extent]) -> SmallVec<[Rect; 4]> {
        let inner = bounds.inset(self.margin.0, self.margin.1);
        let gaps = self.gap * children.len().saturating_sub(1) as u32;
        let fixed: u32 = children
            .iter()
            .map(|c| match c {
                Extent::Fixed(h) => *h,
                Extent::Fill => 0,
            })
            .sum();
        let fills = children.iter().filter(|c| **c == Extent::Fill).count() as u32;
        let spare = inner.size.height.saturating_sub(fixed + gaps);

        let mut y = inner.top();
        let mut out = SmallVec::new();
        let mut fill_index = 0;
        for child in children {
            let h = match child {
                Extent::Fixed(h) => *h,
                Extent::Fill => {
                    // the last fill child absorbs the remainder
                    fill_index += 1;
                    if fill_index == fills {
                        spare - spare / fills * (fills - 1)
                    } else {
                        spare / fills
                    }
                }
            };
            out.push(Rect::new(inner.left(), y, inner.size.width, h));
            y += (h + self.gap) as i32;
        }
        out
    }
}

/// Where the window chrome and the canvas sit for a given window size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShellLayout {
    pub window: Rect,
    pub menu_bar: Rect,
    pub canvas: Rect,
}

impl ShellLayout {
    /// Menu bar across the top, then a [`VBox`] holding the canvas below it.
    pub fn compute(window: Rect, menu_bar_height: u32, vbox: VBox) -> Self {
        let bar_h = menu_bar_height.min(window.size.height);
        let menu_bar = Rect::new(window.left(), window.top(), window.size.width, bar_h);
        let client = Rect::new(
            window.left(),
            window.top() + bar_h as i32,
            window.size.width,
            window.size.height - bar_h,
        );
        let canvas = vbox.arrange(client, &[Extent::Fill])[0];
        Self {
            window,
            menu_bar,
            canvas,
        }
    }
}
