// src/app.rs
use std::rc::Rc;

use crate::config::{ShellConfig, centered_position};
use crate::core::canvas::{Point, Size};
use crate::core::renderer::api::Presenter;
use crate::error::{AppError, Result};
use crate::ui::Shell;
use crate::ui::event::{Input, Key};
use log::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key as WinitKey, NamedKey},
    window::{Window, WindowId},
};

/// Owns the single window, the presenter and the shell for the process lifetime.
pub struct App<P: Presenter + Default> {
    presenter: P,
    window: Option<Rc<Window>>,
    shell: Shell,
    ctrl: bool,
    // startup failure to report once the loop has exited
    fatal: Option<AppError>,
}

impl<P: Presenter + Default> ApplicationHandler for App<P> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // exactly one window per process
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.open_window(event_loop) {
            error!("startup failed: {e}");
            self.fatal = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if window.id() != id {
            return;
        }

        let input = match event {
            WindowEvent::RedrawRequested => {
                self.redraw(&window);
                return;
            }
            WindowEvent::CloseRequested => Input::CloseRequested,
            WindowEvent::Resized(size) => {
                if let Err(e) = self.presenter.resize(size) {
                    warn!("presenter resize failed: {e}");
                }
                Input::Resized(to_size(size))
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.ctrl = modifiers.state().control_key();
                return;
            }
            WindowEvent::CursorMoved { position, .. } => {
                Input::CursorMoved(Point::new(position.x as i32, position.y as i32))
            }
            WindowEvent::CursorLeft { .. } => Input::CursorLeft,
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => Input::PointerPressed,
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                Input::Key {
                    key: translate_key(&event),
                    ctrl: self.ctrl,
                }
            }
            _ => return,
        };

        debug!("input {input:?}");
        let response = self.shell.handle(input);
        if response.exit {
            info!("close requested, leaving event loop");
            event_loop.exit();
        } else if response.redraw {
            window.request_redraw();
        }
    }
}

impl<P: Presenter + Default> App<P> {
    pub fn new(config: ShellConfig) -> Self {
        let initial: PhysicalSize<u32> = config.size.to_physical(1.0);
        Self {
            presenter: P::default(),
            window: None,
            shell: Shell::new(config, to_size(initial)),
            ctrl: false,
            fatal: None,
        }
    }

    pub fn run(config: ShellConfig) -> Result<()> {
        let mut app = App::<P>::new(config);

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Wait);
        event_loop.run_app(&mut app)?;

        app.presenter.shutdown();
        app.window = None;
        info!("event loop finished");
        match app.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn open_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let config = self.shell.config();
        let mut attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.size);

        // Wayland exposes no primary monitor; any monitor is better than none
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        if let Some(monitor) = monitor {
            let physical: PhysicalSize<u32> = config.size.to_physical(monitor.scale_factor());
            let position = centered_position(monitor.position(), monitor.size(), physical);
            attributes = attributes.with_position(position);
        }

        let window = Rc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        info!(
            "window '{}' created at {}x{}",
            self.shell.config().title,
            size.width,
            size.height
        );

        self.presenter.initialize(window.clone())?;
        self.shell.resize(to_size(size));
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn redraw(&mut self, window: &Window) {
        let size = to_size(window.inner_size());
        if size.is_empty() {
            return;
        }
        if size != self.shell.size() {
            self.shell.resize(size);
        }

        let mut frame = self.shell.new_frame();
        self.shell.render(&mut frame);
        window.pre_present_notify();
        if let Err(e) = self.presenter.present(&frame) {
            error!("present failed: {e}");
        }
    }
}

fn to_size(size: PhysicalSize<u32>) -> Size {
    Size::new(size.width, size.height)
}

fn translate_key(event: &KeyEvent) -> Key {
    match &event.logical_key {
        WinitKey::Named(NamedKey::Enter) => Key::Enter,
        WinitKey::Named(NamedKey::Escape) => Key::Escape,
        WinitKey::Named(NamedKey::Space) => Key::Space,
        WinitKey::Character(s) => match s.chars().next() {
            // some platforms report Ctrl+letter as the ASCII control code
            Some(c @ '\u{1}'..='\u{1a}') => Key::Char((b'a' + c as u8 - 1) as char),
            Some(c) => Key::Char(c.to_ascii_lowercase()),
            None => Key::Other,
        },
        _ => Key::Other,
    }
}
