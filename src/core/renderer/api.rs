use std::rc::Rc;

use crate::core::canvas::Frame;
use crate::error::Result;
use winit::{dpi::PhysicalSize, window::Window};

/// Moves finished CPU frames onto a window surface.
pub trait Presenter {
    /// Bind the presenter to the window. Called once, after the window exists.
    fn initialize(&mut self, window: Rc<Window>) -> Result<()>;

    /// The window's inner size changed.
    fn resize(&mut self, size: PhysicalSize<u32>) -> Result<()>;

    /// Show `frame`. The frame may be smaller or larger than the surface; the
    /// overlapping top-left area is presented.
    fn present(&mut self, frame: &Frame) -> Result<()>;

    /// Release every surface resource. Safe to call more than once.
    fn shutdown(&mut self);
}
