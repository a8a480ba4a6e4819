use std::{error::Error as StdError, fmt};

#[cfg(feature = "vulkan")]
use vulkanalia::vk;
use winit::error::{EventLoopError, OsError};

#[derive(Debug)]
pub enum AppError {
    Winit(EventLoopError), // winit’s EventLoopError
    Os(OsError),           // window creation
    Surface(String),       // presentation surface (softbuffer / swapchain setup)
    NoSurface,             // present() before initialize()
    #[cfg(feature = "vulkan")]
    Loader(String), // Vulkan loader / entry failures
    #[cfg(feature = "vulkan")]
    Vk(vk::ErrorCode, &'static str), // Vulkan API error + context
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Winit(e) => write!(f, "winit: {e}"),
            Self::Os(e) => write!(f, "window creation failed: {e}"),
            Self::Surface(msg) => write!(f, "surface: {msg}"),
            Self::NoSurface => f.write_str("presenter used before it was initialized"),
            #[cfg(feature = "vulkan")]
            Self::Loader(msg) => write!(f, "Vulkan loader: {msg}"),
            #[cfg(feature = "vulkan")]
            Self::Vk(code, ctx) => write!(f, "Vulkan error: {code:?} (context: {ctx})"),
        }
    }
}

impl StdError for AppError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Winit(e) => Some(e),
            Self::Os(e) => Some(e),
            _ => None,
        }
    }
}

/// `?` conversions
impl From<EventLoopError> for AppError {
    fn from(e: EventLoopError) -> Self {
        Self::Winit(e)
    }
}
impl From<OsError> for AppError {
    fn from(e: OsError) -> Self {
        Self::Os(e)
    }
}
#[cfg(feature = "software")]
impl From<softbuffer::SoftBufferError> for AppError {
    fn from(e: softbuffer::SoftBufferError) -> Self {
        Self::Surface(e.to_string())
    }
}
#[cfg(feature = "vulkan")]
impl From<vk::ErrorCode> for AppError {
    fn from(e: vk::ErrorCode) -> Self {
        Self::Vk(e, "unspecified") // fallback context
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(feature = "vulkan")]
pub trait VkResultExt<T> {
    fn context(self, context: &'static str) -> Result<T>;
}

#[cfg(feature = "vulkan")]
impl<T> VkResultExt<T> for std::result::Result<T, vk::ErrorCode> {
    fn context(self, context: &'static str) -> Result<T> {
        self.map_err(|code| AppError::Vk(code, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_surface_has_readable_message() {
        let err = AppError::NoSurface;
        assert_eq!(err.to_string(), "presenter used before it was initialized");
        assert!(err.source().is_none());
    }

    #[test]
    fn surface_error_carries_message() {
        let err = AppError::Surface("resize to 0x0".into());
        assert_eq!(err.to_string(), "surface: resize to 0x0");
    }
}
