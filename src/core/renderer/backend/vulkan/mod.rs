// src/core/renderer/backend/vulkan/mod.rs
#[allow(clippy::module_inception)]
mod vulkan;

pub use vulkan::VulkanPresenter;
