// src/ui/shell.rs
use log::{debug, info};

use crate::config::ShellConfig;
use crate::core::canvas::{Color, Frame, Point, Rect, Size};
use crate::ui::actions::NewPositionAction;
use crate::ui::canvas_view::CanvasRenderer;
use crate::ui::dialog::MessageDialog;
use crate::ui::event::{
    EventContext, EventRouter, Input, Key, RedrawRequest, Response, UiEvent, WidgetId,
};
use crate::ui::layout::{ShellLayout, VBox};
use crate::ui::menu::{Accelerator, MenuBar, MenuHit, MenuItem, Submenu};

/// Window chrome colour behind the menu bar and the canvas margins.
pub const CHROME: Color = Color::LIGHT_GRAY;

/// Everything inside the window, independent of the windowing backend.
///
/// The shell owns the menu, the widget sinks and the modal dialog state. It
/// turns [`Input`] into sink dispatches and composes frames in [`render`].
///
/// [`render`]: Shell::render
pub struct Shell {
    config: ShellConfig,
    size: Size,
    layout: ShellLayout,
    menu: MenuBar,
    dialog: Option<MessageDialog>,
    router: EventRouter,
    cursor: Option<Point>,
}

impl Shell {
    pub fn new(config: ShellConfig, size: Size) -> Self {
        let menu = MenuBar::new([Submenu::new("File").with_item(
            MenuItem::new(WidgetId::ITEM_NEW, "New").with_accelerator(Accelerator::ctrl('n')),
        )]);

        let mut router = EventRouter::default();
        router.register(WidgetId::CANVAS, CanvasRenderer);
        router.register(WidgetId::ITEM_NEW, NewPositionAction);

        let mut shell = Self {
            config,
            size: Size::default(),
            layout: ShellLayout::default(),
            menu,
            dialog: None,
            router,
            cursor: None,
        };
        shell.resize(size);
        shell
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn layout(&self) -> &ShellLayout {
        &self.layout
    }

    pub fn menu(&self) -> &MenuBar {
        &self.menu
    }

    pub fn dialog(&self) -> Option<&MessageDialog> {
        self.dialog.as_ref()
    }

    /// While a dialog is open no input reaches the menu or any sink.
    pub fn is_modal(&self) -> bool {
        self.dialog.is_some()
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
        let vbox = VBox {
            margin: self.config.margin,
            gap: self.config.gap,
        };
        self.layout = ShellLayout::compute(
            Rect::from_size(size),
            self.config.menu_bar_height,
            vbox,
        );
        self.menu.set_area(self.layout.menu_bar);
        debug!(
            "layout for {}x{}: canvas {:?}",
            size.width, size.height, self.layout.canvas
        );
    }

    pub fn handle(&mut self, input: Input) -> Response {
        match input {
            Input::Resized(size) => {
                self.resize(size);
                return Response::REDRAW;
            }
            Input::CursorMoved(p) => self.cursor = Some(p),
            Input::CursorLeft => self.cursor = None,
            _ => {}
        }

        if self.dialog.is_some() {
            return self.handle_modal(input);
        }

        match input {
            Input::CloseRequested => Response::EXIT,
            Input::CursorMoved(p) => Response::redraw_if(self.menu.hover(p)),
            Input::PointerPressed => self.press(),
            Input::Key {
                key: Key::Escape, ..
            } => Response::redraw_if(self.menu.close()),
            Input::Key {
                key: Key::Char(c),
                ctrl,
            } => match self.menu.find_accelerator(c, ctrl) {
                Some(id) => {
                    self.menu.close();
                    self.activate(id)
                }
                None => Response::default(),
            },
            _ => Response::default(),
        }
    }

    /// Dispatches an activation to the sink registered for `id`.
    pub fn activate(&mut self, id: WidgetId) -> Response {
        if self.dialog.is_some() {
            debug!("activation of {id:?} ignored while a dialog is open");
            return Response::default();
        }
        let mut cx = EventContext::default();
        self.router.dispatch(id, UiEvent::Activate, &mut cx);
        self.apply(cx)
    }

    pub fn new_frame(&self) -> Frame {
        Frame::new(self.size, CHROME)
    }

    /// Composes the whole window into `frame`: menu bar, canvas, open
    /// dropdown and the modal dialog on top.
    pub fn render(&mut self, frame: &mut Frame) {
        self.menu.draw_bar(frame);

        let mut cx = EventContext::default();
        let request = RedrawRequest {
            frame: &mut *frame,
            area: self.layout.canvas,
        };
        self.router
            .dispatch(WidgetId::CANVAS, UiEvent::Redraw(request), &mut cx);
        // sinks may request a dialog from a redraw too
        self.apply(cx);

        self.menu.draw_dropdown(frame);
        if let Some(dialog) = &self.dialog {
            dialog.draw(frame);
        }
    }

    fn press(&mut self) -> Response {
        let Some(p) = self.cursor else {
            return Response::default();
        };
        match self.menu.hit(p) {
            MenuHit::Title(i) => {
                self.menu.toggle(i);
                Response::REDRAW
            }
            MenuHit::Item(id) => {
                self.menu.close();
                let mut response = self.activate(id);
                response.redraw = true;
                response
            }
            MenuHit::Dropdown => Response::default(),
            MenuHit::Outside => Response::redraw_if(self.menu.close()),
        }
    }

    fn handle_modal(&mut self, input: Input) -> Response {
        let window = Rect::from_size(self.size);
        let Some(dialog) = self.dialog.as_mut() else {
            return Response::default();
        };
        match input {
            Input::CloseRequested => {
                info!("close request ignored while '{}' is open", dialog.title());
                Response::default()
            }
            Input::CursorMoved(_) | Input::CursorLeft => {
                Response::redraw_if(dialog.hover(self.cursor, window))
            }
            Input::PointerPressed => {
                let on_ok = self
                    .cursor
                    .is_some_and(|p| dialog.layout(window).ok_button.contains(p));
                if on_ok {
                    self.dismiss_dialog()
                } else {
                    Response::default()
                }
            }
            Input::Key { key, .. } if MessageDialog::dismisses(key) => self.dismiss_dialog(),
            _ => Response::default(),
        }
    }

    fn dismiss_dialog(&mut self) -> Response {
        if let Some(dialog) = self.dialog.take() {
            info!("dialog '{}' dismissed", dialog.title());
        }
        Response::REDRAW
    }

    fn apply(&mut self, cx: EventContext) -> Response {
        let (dialog, redraw) = cx.into_parts();
        match dialog {
            Some(d) if self.dialog.is_none() => {
                info!("dialog '{}' opened", d.title());
                self.dialog = Some(d);
                Response::REDRAW
            }
            Some(d) => {
                debug!("dialog '{}' dropped, another one is open", d.title());
                Response::redraw_if(redraw)
            }
            None => Response::redraw_if(redraw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::canvas_view::BACKGROUND;

    fn shell() -> Shell {
        Shell::new(ShellConfig::default(), Size::new(800, 600))
    }

    fn click(shell: &mut Shell, at: Point) -> Response {
        shell.handle(Input::CursorMoved(at));
        shell.handle(Input::PointerPressed)
    }

    fn centre(r: Rect) -> Point {
        Point::new(
            r.left() + r.size.width as i32 / 2,
            r.top() + r.size.height as i32 / 2,
        )
    }

    fn ctrl_n() -> Input {
        Input::Key {
            key: Key::Char('n'),
            ctrl: true,
        }
    }

    #[test]
    fn menu_has_exactly_file_new() {
        let shell = shell();
        let submenus = shell.menu().submenus();
        assert_eq!(submenus.len(), 1);
        assert_eq!(submenus[0].label, "File");
        let labels: Vec<_> = shell.menu().items().map(|i| i.label).collect();
        assert_eq!(labels, ["New"]);
    }

    #[test]
    fn clicking_file_then_new_opens_the_dialog() {
        let mut shell = shell();
        let file = centre(shell.menu().title_rect(0));
        assert_eq!(click(&mut shell, file), Response::REDRAW);
        assert!(shell.menu().is_open());

        let item = centre(shell.menu().item_rect(0, 0));
        assert_eq!(click(&mut shell, item), Response::REDRAW);
        assert!(!shell.menu().is_open());

        let dialog = shell.dialog().expect("dialog open");
        assert_eq!(dialog.title(), "Bye");
        assert_eq!(dialog.body(), "New position!");
    }

    #[test]
    fn accelerator_opens_exactly_one_dialog() {
        let mut shell = shell();
        assert_eq!(shell.handle(ctrl_n()), Response::REDRAW);
        assert!(shell.is_modal());

        // further activations are swallowed while modal
        assert_eq!(shell.handle(ctrl_n()), Response::default());
        assert_eq!(shell.activate(WidgetId::ITEM_NEW), Response::default());
        assert_eq!(shell.dialog().map(|d| d.title()), Some("Bye"));
    }

    #[test]
    fn plain_n_is_not_an_accelerator() {
        let mut shell = shell();
        let r = shell.handle(Input::Key {
            key: Key::Char('n'),
            ctrl: false,
        });
        assert_eq!(r, Response::default());
        assert!(!shell.is_modal());
    }

    #[test]
    fn close_is_ignored_while_modal() {
        let mut shell = shell();
        shell.activate(WidgetId::ITEM_NEW);
        assert_eq!(shell.handle(Input::CloseRequested), Response::default());

        let r = shell.handle(Input::Key {
            key: Key::Enter,
            ctrl: false,
        });
        assert_eq!(r, Response::REDRAW);
        assert!(!shell.is_modal());
        assert_eq!(shell.handle(Input::CloseRequested), Response::EXIT);
    }

    #[test]
    fn ok_button_dismisses_and_clicks_elsewhere_do_not() {
        let mut shell = shell();
        shell.activate(WidgetId::ITEM_NEW);
        let layout = shell.dialog().unwrap().layout(Rect::from_size(shell.size()));

        // the menu title is behind the modal dialog
        let file = centre(shell.menu().title_rect(0));
        assert_eq!(click(&mut shell, file), Response::default());
        assert!(!shell.menu().is_open());
        assert!(shell.is_modal());

        click(&mut shell, centre(layout.ok_button));
        assert!(!shell.is_modal());
    }

    #[test]
    fn escape_closes_the_dropdown() {
        let mut shell = shell();
        let file = centre(shell.menu().title_rect(0));
        click(&mut shell, file);
        let r = shell.handle(Input::Key {
            key: Key::Escape,
            ctrl: false,
        });
        assert_eq!(r, Response::REDRAW);
        assert!(!shell.menu().is_open());
    }

    #[test]
    fn clicking_outside_closes_the_dropdown() {
        let mut shell = shell();
        let file = centre(shell.menu().title_rect(0));
        click(&mut shell, file);
        assert_eq!(click(&mut shell, Point::new(600, 400)), Response::REDRAW);
        assert!(!shell.menu().is_open());
        assert!(!shell.is_modal());
    }

    #[test]
    fn rendered_canvas_is_blue_and_chrome_surrounds_it() {
        let mut shell = shell();
        let mut frame = shell.new_frame();
        shell.render(&mut frame);
        let canvas = shell.layout().canvas;
        assert_eq!(canvas, Rect::new(5, 25, 790, 570));
        assert_eq!(frame.count_in(&canvas, BACKGROUND), canvas.size.area());
        assert_eq!(frame.pixel(Point::new(2, 300)), Some(CHROME));
    }

    #[test]
    fn redraws_are_idempotent() {
        let mut shell = shell();
        let mut first = shell.new_frame();
        shell.render(&mut first);
        for _ in 0..3 {
            let mut again = shell.new_frame();
            shell.render(&mut again);
            assert_eq!(first, again);
        }
    }

    #[test]
    fn resize_relayouts_the_canvas() {
        let mut shell = shell();
        assert_eq!(shell.handle(Input::Resized(Size::new(400, 300))), Response::REDRAW);
        assert_eq!(shell.layout().canvas, Rect::new(5, 25, 390, 270));
        let frame = shell.new_frame();
        assert_eq!(frame.size(), Size::new(400, 300));
    }

    #[test]
    fn dialog_is_drawn_over_the_canvas() {
        let mut shell = shell();
        shell.activate(WidgetId::ITEM_NEW);
        let mut frame = shell.new_frame();
        shell.render(&mut frame);
        let canvas = shell.layout().canvas;
        // everything is shaded, so no pure canvas blue remains
        assert_eq!(frame.count_in(&canvas, BACKGROUND), 0);
        let layout = shell.dialog().unwrap().layout(frame.bounds());
        assert!(frame.count_in(&layout.title_bar, Color::NAVY) > 0);
    }
}
