// src/ui/menu.rs
use std::fmt;

use log::debug;
use smallvec::SmallVec;

use crate::core::canvas::{Color, DrawContext, Frame, Point, Rect, text_width};
use crate::ui::event::WidgetId;

const TITLE_PADDING: u32 = 8;
const ITEM_HEIGHT: u32 = 20;
const DROPDOWN_MIN_WIDTH: u32 = 120;

/// Keyboard shortcut bound to a menu item, e.g. Ctrl+N.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accelerator {
    pub ctrl: bool,
    pub key: char,
}

impl Accelerator {
    pub fn ctrl(key: char) -> Self {
        Self {
            ctrl: true,
            key: key.to_ascii_lowercase(),
        }
    }

    pub fn matches(&self, key: char, ctrl: bool) -> bool {
        self.ctrl == ctrl && self.key == key.to_ascii_lowercase()
    }
}

impl fmt::Display for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("Ctrl+")?;
        }
        write!(f, "{}", self.key.to_ascii_uppercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: WidgetId,
    pub label: &'static str,
    pub accelerator: Option<Accelerator>,
}

impl MenuItem {
    pub fn new(id: WidgetId, label: &'static str) -> Self {
        Self {
            id,
            label,
            accelerator: None,
        }
    }

    pub fn with_accelerator(mut self, accelerator: Accelerator) -> Self {
        self.accelerator = Some(accelerator);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submenu {
    pub label: &'static str,
    pub items: SmallVec<[MenuItem; 4]>,
}

impl Submenu {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            items: SmallVec::new(),
        }
    }

    pub fn with_item(mut self, item: MenuItem) -> Self {
        self.items.push(item);
        self
    }
}

/// Result of hit-testing a point against the menu bar and its open dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuHit {
    Title(usize),
    Item(WidgetId),
    /// Inside the open dropdown but not on an item.
    Dropdown,
    Outside,
}

/// Menu bar drawn by the shell, with at most one dropdown open at a time.
#[derive(Debug, Clone)]
pub struct MenuBar {
    submenus: SmallVec<[Submenu; 4]>,
    area: Rect,
    open: Option<usize>,
    highlighted: Option<WidgetId>,
}

impl MenuBar {
    pub fn new(submenus: impl IntoIterator<Item = Submenu>) -> Self {
        Self {
            submenus: submenus.into_iter().collect(),
            area: Rect::default(),
            open: None,
            highlighted: None,
        }
    }

    pub fn submenus(&self) -> &[Submenu] {
        &self.submenus
    }

    pub fn items(&self) -> impl Iterator<Item = &MenuItem> {
        self.submenus.iter().flat_map(|s| s.items.iter())
    }

    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn open_index(&self) -> Option<usize> {
        self.open
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn open(&mut self, index: usize) {
        if index < self.submenus.len() && self.open != Some(index) {
            debug!("menu '{}' opened", self.submenus[index].label);
            self.open = Some(index);
            self.highlighted = None;
        }
    }

    pub fn close(&mut self) -> bool {
        let was_open = self.open.take().is_some();
        self.highlighted = None;
        was_open
    }

    pub fn toggle(&mut self, index: usize) {
        if self.open == Some(index) {
            self.close();
        } else {
            self.open(index);
        }
    }

    pub fn title_rect(&self, index: usize) -> Rect {
        let mut x = self.area.left() + 4;
        for s in &self.submenus[..index] {
            x += (text_width(s.label) + 2 * TITLE_PADDING) as i32;
        }
        let w = text_width(self.submenus[index].label) + 2 * TITLE_PADDING;
        Rect::new(x, self.area.top(), w, self.area.size.height)
    }

    pub fn dropdown_rect(&self, index: usize) -> Rect {
        let title = self.title_rect(index);
        let items = &self.submenus[index].items;
        let width = items
            .iter()
            .map(|i| {
                let accel = i.accelerator.map_or(0, |a| text_width(&a.to_string()) + 24);
                text_width(i.label) + accel + 2 * TITLE_PADDING
            })
            .max()
            .unwrap_or(0)
            .max(DROPDOWN_MIN_WIDTH);
        Rect::new(
            title.left(),
            title.bottom(),
            width,
            items.len() as u32 * ITEM_HEIGHT + 4,
        )
    }

    pub fn item_rect(&self, index: usize, item: usize) -> Rect {
        let dd = self.dropdown_rect(index);
        Rect::new(
            dd.left() + 2,
            dd.top() + 2 + (item as u32 * ITEM_HEIGHT) as i32,
            dd.size.width - 4,
            ITEM_HEIGHT,
        )
    }

    pub fn hit(&self, p: Point) -> MenuHit {
        if let Some(open) = self.open {
            if self.dropdown_rect(open).contains(p) {
                return (0..self.submenus[open].items.len())
                    .find(|&i| self.item_rect(open, i).contains(p))
                    .map_or(MenuHit::Dropdown, |i| {
                        MenuHit::Item(self.submenus[open].items[i].id)
                    });
            }
        }
        if self.area.contains(p) {
            if let Some(i) = (0..self.submenus.len()).find(|&i| self.title_rect(i).contains(p)) {
                return MenuHit::Title(i);
            }
        }
        MenuHit::Outside
    }

    /// Tracks the pointer while a dropdown is open. Returns whether anything
    /// visible changed.
    pub fn hover(&mut self, p: Point) -> bool {
        if self.open.is_none() {
            return false;
        }
        match self.hit(p) {
            MenuHit::Title(i) if Some(i) != self.open => {
                self.open(i);
                true
            }
            MenuHit::Item(id) => {
                let changed = self.highlighted != Some(id);
                self.highlighted = Some(id);
                changed
            }
            _ => self.highlighted.take().is_some(),
        }
    }

    pub fn find_accelerator(&self, key: char, ctrl: bool) -> Option<WidgetId> {
        self.items()
            .find(|i| i.accelerator.is_some_and(|a| a.matches(key, ctrl)))
            .map(|i| i.id)
    }

    pub fn draw_bar(&self, frame: &mut Frame) {
        let mut cx = DrawContext::new(frame, self.area);
        cx.set_background(Color::LIGHT_GRAY);
        cx.clear();
        cx.set_foreground(Color::GRAY);
        cx.fill(Rect::new(
            0,
            self.area.size.height as i32 - 1,
            self.area.size.width,
            1,
        ));
        for (i, submenu) in self.submenus.iter().enumerate() {
            let title = self
                .title_rect(i)
                .translate(Point::new(-self.area.left(), -self.area.top()));
            if self.open == Some(i) {
                cx.set_foreground(Color::NAVY);
                cx.fill(title);
                cx.set_foreground(Color::WHITE);
            } else {
                cx.set_foreground(Color::BLACK);
            }
            let ty = title.top() + (title.size.height as i32 - 16) / 2;
            cx.text(title.left() + TITLE_PADDING as i32, ty, submenu.label);
        }
        cx.flush();
    }

    pub fn draw_dropdown(&self, frame: &mut Frame) {
        let Some(open) = self.open else {
            return;
        };
        let dd = self.dropdown_rect(open);
        let mut cx = DrawContext::new(frame, dd);
        cx.set_background(Color::LIGHT_GRAY);
        cx.clear();
        cx.set_foreground(Color::DARK_GRAY);
        cx.rect(0, 0, dd.size.width as i32 - 1, dd.size.height as i32 - 1);

        for (i, item) in self.submenus[open].items.iter().enumerate() {
            let r = self
                .item_rect(open, i)
                .translate(Point::new(-dd.left(), -dd.top()));
            if self.highlighted == Some(item.id) {
                cx.set_foreground(Color::NAVY);
                cx.fill(r);
                cx.set_foreground(Color::WHITE);
            } else {
                cx.set_foreground(Color::BLACK);
            }
            let ty = r.top() + 2;
            cx.text(r.left() + TITLE_PADDING as i32 - 2, ty, item.label);
            if let Some(accel) = item.accelerator {
                let text = accel.to_string();
                let x = r.right() - (TITLE_PADDING + text_width(&text)) as i32;
                cx.text(x, ty, &text);
            }
        }
        cx.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::canvas::Size;

    fn file_menu() -> MenuBar {
        let mut bar = MenuBar::new([Submenu::new("File").with_item(
            MenuItem::new(WidgetId::ITEM_NEW, "New").with_accelerator(Accelerator::ctrl('n')),
        )]);
        bar.set_area(Rect::new(0, 0, 800, 20));
        bar
    }

    #[test]
    fn accelerator_text_and_matching() {
        let a = Accelerator::ctrl('N');
        assert_eq!(a.to_string(), "Ctrl+N");
        assert!(a.matches('n', true));
        assert!(a.matches('N', true));
        assert!(!a.matches('n', false));
    }

    #[test]
    fn title_then_item_hit_testing() {
        let mut bar = file_menu();
        let title = bar.title_rect(0);
        assert_eq!(title, Rect::new(4, 0, 48, 20));
        assert_eq!(bar.hit(Point::new(10, 10)), MenuHit::Title(0));
        assert_eq!(bar.hit(Point::new(10, 30)), MenuHit::Outside);

        bar.open(0);
        let item = bar.item_rect(0, 0);
        assert_eq!(
            bar.hit(Point::new(item.left() + 1, item.top() + 1)),
            MenuHit::Item(WidgetId::ITEM_NEW)
        );
        let dd = bar.dropdown_rect(0);
        assert_eq!(bar.hit(Point::new(dd.left(), dd.top())), MenuHit::Dropdown);
    }

    #[test]
    fn hover_highlights_items() {
        let mut bar = file_menu();
        let item = bar.item_rect(0, 0);
        let on_item = Point::new(item.left() + 3, item.top() + 3);
        assert!(!bar.hover(on_item));
        bar.toggle(0);
        assert!(bar.hover(on_item));
        assert!(!bar.hover(on_item));
        assert!(bar.hover(Point::new(700, 500)));
        bar.toggle(0);
        assert!(!bar.is_open());
    }

    #[test]
    fn open_dropdown_is_painted_below_the_bar() {
        let mut bar = file_menu();
        bar.open(0);
        let mut frame = Frame::new(Size::new(800, 600), Color::BLUE);
        bar.draw_bar(&mut frame);
        bar.draw_dropdown(&mut frame);
        let dd = bar.dropdown_rect(0);
        assert_eq!(frame.count_in(&dd, Color::BLUE), 0);
        assert!(frame.count_in(&bar.title_rect(0), Color::NAVY) > 0);
    }

    #[test]
    fn finds_items_by_accelerator() {
        let bar = file_menu();
        assert_eq!(bar.find_accelerator('n', true), Some(WidgetId::ITEM_NEW));
        assert_eq!(bar.find_accelerator('n', false), None);
        assert_eq!(bar.find_accelerator('q', true), None);
    }
}
