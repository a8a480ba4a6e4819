// src/ui/dialog.rs
use crate::core::canvas::{Color, DrawContext, Frame, GLYPH_HEIGHT, Point, Rect, Size, text_width};
use crate::ui::event::Key;

const TITLE_BAR_HEIGHT: u32 = 20;
const PADDING: u32 = 24;
const MIN_WIDTH: u32 = 200;
const BUTTON: Size = Size::new(64, 24);
const BUTTON_LABEL: &str = "OK";

/// Modal message box: a title, one line of body text and an OK button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDialog {
    title: String,
    body: String,
    ok_hovered: bool,
}

/// Placement of a [`MessageDialog`] inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogLayout {
    pub outer: Rect,
    pub title_bar: Rect,
    pub body: Point,
    pub ok_button: Rect,
}

impl MessageDialog {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ok_hovered: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn layout(&self, window: Rect) -> DialogLayout {
        let text = text_width(&self.title).max(text_width(&self.body));
        let width = (text + 2 * PADDING).max(MIN_WIDTH);
        let height = TITLE_BAR_HEIGHT + 16 + GLYPH_HEIGHT + 16 + BUTTON.height + 12;
        let outer = window.centered(Size::new(width, height));
        let title_bar = Rect::new(outer.left(), outer.top(), width, TITLE_BAR_HEIGHT);
        let body = Point::new(outer.left() + PADDING as i32, title_bar.bottom() + 16);
        let ok_button = Rect::new(
            outer.left() + (width - BUTTON.width) as i32 / 2,
            outer.bottom() - (BUTTON.height + 12) as i32,
            BUTTON.width,
            BUTTON.height,
        );
        DialogLayout {
            outer,
            title_bar,
            body,
            ok_button,
        }
    }

    /// Keys that dismiss the dialog.
    pub fn dismisses(key: Key) -> bool {
        matches!(key, Key::Enter | Key::Escape | Key::Space)
    }

    /// Updates the OK button hover state; returns whether it changed.
    pub fn hover(&mut self, p: Option<Point>, window: Rect) -> bool {
        let hovered = p.is_some_and(|p| self.layout(window).ok_button.contains(p));
        let changed = hovered != self.ok_hovered;
        self.ok_hovered = hovered;
        changed
    }

    pub fn draw(&self, frame: &mut Frame) {
        let window = frame.bounds();
        let layout = self.layout(window);

        // dim everything behind the dialog
        let mut shade = DrawContext::new(frame, window);
        shade.set_foreground(Color::BLACK.with_alpha(96));
        shade.fill(Rect::from_size(window.size));
        shade.flush();

        let o = layout.outer.origin;
        let local = |r: Rect| r.translate(Point::new(-o.x, -o.y));

        let mut cx = DrawContext::new(frame, layout.outer);
        cx.set_background(Color::LIGHT_GRAY);
        cx.clear();

        cx.set_foreground(Color::NAVY);
        cx.fill(local(layout.title_bar));
        cx.set_foreground(Color::WHITE);
        cx.text(8, 2, &self.title);

        cx.set_foreground(Color::BLACK);
        cx.text(layout.body.x - o.x, layout.body.y - o.y, &self.body);

        let button = local(layout.ok_button);
        cx.set_foreground(if self.ok_hovered { Color::WHITE } else { Color::GRAY });
        cx.fill(button);
        cx.set_foreground(Color::DARK_GRAY);
        cx.rect(button.left(), button.top(), button.right() - 1, button.bottom() - 1);
        cx.set_foreground(Color::BLACK);
        cx.text(
            button.left() + (button.size.width - text_width(BUTTON_LABEL)) as i32 / 2,
            button.top() + (button.size.height - GLYPH_HEIGHT) as i32 / 2,
            BUTTON_LABEL,
        );

        cx.rect(0, 0, layout.outer.size.width as i32 - 1, layout.outer.size.height as i32 - 1);
        cx.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_centred_with_button_inside() {
        let dialog = MessageDialog::new("Bye", "New position!");
        let window = Rect::new(0, 0, 800, 600);
        let layout = dialog.layout(window);
        assert_eq!(layout.outer.size, Size::new(200, 104));
        assert_eq!(layout.outer.origin, Point::new(300, 248));
        assert_eq!(layout.outer.intersection(&layout.ok_button), layout.ok_button);
    }

    #[test]
    fn long_body_widens_the_dialog() {
        let body = "x".repeat(40);
        let layout = MessageDialog::new("t", body).layout(Rect::new(0, 0, 800, 600));
        assert_eq!(layout.outer.size.width, 320 + 48);
    }

    #[test]
    fn enter_space_and_escape_dismiss() {
        assert!(MessageDialog::dismisses(Key::Enter));
        assert!(MessageDialog::dismisses(Key::Escape));
        assert!(MessageDialog::dismisses(Key::Space));
        assert!(!MessageDialog::dismisses(Key::Char('n')));
    }

    #[test]
    fn hover_tracks_the_ok_button() {
        let mut dialog = MessageDialog::new("Bye", "New position!");
        let window = Rect::new(0, 0, 800, 600);
        let ok = dialog.layout(window).ok_button;
        assert!(dialog.hover(Some(Point::new(ok.left() + 1, ok.top() + 1)), window));
        assert!(!dialog.hover(Some(Point::new(ok.left() + 2, ok.top() + 2)), window));
        assert!(dialog.hover(None, window));
    }

    #[test]
    fn draws_title_bar_over_shaded_window() {
        let dialog = MessageDialog::new("Bye", "New position!");
        let mut frame = Frame::new(Size::new(800, 600), Color::WHITE);
        dialog.draw(&mut frame);
        let layout = dialog.layout(frame.bounds());
        assert!(frame.count_in(&layout.title_bar, Color::NAVY) > 0);
        assert_eq!(frame.pixel(Point::new(0, 0)), Some(Color::rgb(159, 159, 159)));
    }
}
