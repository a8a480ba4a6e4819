use std::{num::NonZeroU32, rc::Rc};

use crate::core::canvas::Frame;
use crate::core::renderer::api::Presenter;
use crate::error::{AppError, Result};
use log::{debug, info};
use softbuffer::{Context, Surface};
use winit::{dpi::PhysicalSize, window::Window};

/// Presents frames by copying them into a softbuffer surface.
#[derive(Default)]
pub struct SoftwarePresenter {
    // surface before context: drop order matters
    surface: Option<Surface<Rc<Window>, Rc<Window>>>,
    context: Option<Context<Rc<Window>>>,
    size: (u32, u32),
}

impl SoftwarePresenter {
    fn resize_surface(&mut self, width: u32, height: u32) -> Result<()> {
        let surface = self.surface.as_mut().ok_or(AppError::NoSurface)?;
        let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
            // minimised; keep the old buffer until a real size arrives
            return Ok(());
        };
        surface.resize(w, h)?;
        self.size = (width, height);
        debug!("software surface resized to {width}x{height}");
        Ok(())
    }
}

impl Presenter for SoftwarePresenter {
    fn initialize(&mut self, window: Rc<Window>) -> Result<()> {
        let context = Context::new(window.clone())?;
        let surface = Surface::new(&context, window.clone())?;
        self.context = Some(context);
        self.surface = Some(surface);

        let size = window.inner_size();
        self.resize_surface(size.width, size.height)?;
        info!("✅ Software presenter ready");
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) -> Result<()> {
        self.resize_surface(size.width, size.height)
    }

    fn present(&mut self, frame: &Frame) -> Result<()> {
        let fs = frame.size();
        if fs.is_empty() {
            return Ok(());
        }
        if self.size != (fs.width, fs.height) {
            self.resize_surface(fs.width, fs.height)?;
        }

        let surface = self.surface.as_mut().ok_or(AppError::NoSurface)?;
        let mut buffer = surface.buffer_mut()?;
        // sizes match after the resize above, so this is a straight copy
        buffer.copy_from_slice(frame.pixels());
        buffer.present()?;
        Ok(())
    }

    fn shutdown(&mut self) {
        if self.surface.take().is_some() {
            info!("Software presenter shut down");
        }
        self.context = None;
        self.size = (0, 0);
    }
}
