// src/ui/canvas_view.rs
use log::trace;

use crate::core::canvas::{Color, DrawContext, LineStyle};
use crate::ui::event::{EventContext, EventSink, Handled, UiEvent};

pub const BACKGROUND: Color = Color::BLUE;
pub const RECT_COLOR: Color = Color::DARK_MAGENTA.with_alpha(128);
pub const RECT_LINE_WIDTH: u32 = 3;
/// Corners `(x1, y1, x2, y2)`. Both corners coincide, so the outline is
/// zero-area and paints nothing.
pub const RECT_CORNERS: (i32, i32, i32, i32) = (100, 200, 100, 200);
pub const DRAW_COLOR_ATTRIBUTE: &str = "DRAWCOLOR";
pub const DRAW_COLOR: &str = "252 186 3";

/// Redraw handler of the main drawing surface.
#[derive(Debug, Default)]
pub struct CanvasRenderer;

impl CanvasRenderer {
    pub fn paint(cx: &mut DrawContext<'_>) {
        cx.set_background(BACKGROUND);
        cx.clear();

        cx.set_line_width(RECT_LINE_WIDTH);
        cx.set_line_style(LineStyle::Continuous);
        cx.set_foreground(RECT_COLOR);
        let (x1, y1, x2, y2) = RECT_CORNERS;
        cx.rect(x1, y1, x2, y2);

        cx.set_attribute(DRAW_COLOR_ATTRIBUTE, DRAW_COLOR);
    }
}

impl EventSink for CanvasRenderer {
    fn handle(&mut self, event: UiEvent<'_>, _cx: &mut EventContext) -> Handled {
        let UiEvent::Redraw(request) = event else {
            return Handled::No;
        };
        let mut cx = DrawContext::new(request.frame, request.area);
        let size = cx.size();
        trace!("canvas redraw at {}x{}", size.width, size.height);
        Self::paint(&mut cx);
        cx.flush();
        Handled::Yes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::canvas::{Frame, Rect, Size};
    use crate::ui::event::RedrawRequest;

    fn redraw(frame: &mut Frame, area: Rect) -> Handled {
        let mut cx = EventContext::default();
        CanvasRenderer.handle(UiEvent::Redraw(RedrawRequest { frame, area }), &mut cx)
    }

    #[test]
    fn canvas_is_solid_blue() {
        let mut frame = Frame::new(Size::new(400, 300), Color::WHITE);
        let area = Rect::new(10, 10, 380, 280);
        assert_eq!(redraw(&mut frame, area), Handled::Yes);
        assert_eq!(frame.count_in(&area, BACKGROUND), 380 * 280);
        // outside the widget is untouched
        assert_eq!(frame.count_in(&frame.bounds(), Color::WHITE), 400 * 300 - 380 * 280);
    }

    #[test]
    fn degenerate_rectangle_leaves_no_magenta() {
        let mut frame = Frame::new(Size::new(400, 300), Color::WHITE);
        let bounds = frame.bounds();
        redraw(&mut frame, bounds);
        let blended = Color::from_xrgb(RECT_COLOR.blend_over(BACKGROUND.to_xrgb()));
        assert_eq!(frame.count_in(&frame.bounds(), blended), 0);
    }

    #[test]
    fn paint_sets_state_and_custom_attribute() {
        let mut frame = Frame::new(Size::new(50, 50), Color::WHITE);
        let mut cx = DrawContext::new(&mut frame, Rect::new(0, 0, 50, 50));
        CanvasRenderer::paint(&mut cx);
        assert_eq!(cx.line_width(), 3);
        assert_eq!(cx.line_style(), LineStyle::Continuous);
        assert_eq!(cx.foreground(), Color::rgb(128, 0, 128).with_alpha(128));
        assert_eq!(cx.attribute("DRAWCOLOR"), Some("252 186 3"));
        assert_eq!(
            cx.attribute("DRAWCOLOR").and_then(Color::parse_triple),
            Some(Color::rgb(252, 186, 3))
        );
        cx.flush();
    }

    #[test]
    fn repeated_redraws_are_identical() {
        let mut first = Frame::new(Size::new(320, 240), Color::WHITE);
        redraw(&mut first, Rect::new(5, 25, 310, 210));
        let mut second = first.clone();
        redraw(&mut second, Rect::new(5, 25, 310, 210));
        redraw(&mut second, Rect::new(5, 25, 310, 210));
        assert_eq!(first, second);
    }

    #[test]
    fn activation_is_not_handled() {
        let mut cx = EventContext::default();
        assert_eq!(CanvasRenderer.handle(UiEvent::Activate, &mut cx), Handled::No);
    }
}
