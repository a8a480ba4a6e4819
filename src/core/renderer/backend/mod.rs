// src/core/renderer/backend/mod.rs
#[cfg(feature = "software")]
pub mod software;
#[cfg(feature = "vulkan")]
pub mod vulkan;

#[cfg(not(any(feature = "software", feature = "vulkan")))]
compile_error!("enable one presenter backend: `software` or `vulkan`");

// Re-export the selected backend under a common name (Vulkan wins when both are on):
#[cfg(all(feature = "software", not(feature = "vulkan")))]
pub use software::SoftwarePresenter as SelectedPresenter;
#[cfg(feature = "vulkan")]
pub use vulkan::VulkanPresenter as SelectedPresenter;
