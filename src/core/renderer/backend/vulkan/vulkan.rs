// Import Vulkan debug utils extension only in debug builds
#[cfg(debug_assertions)]
use vulkanalia::vk::ExtDebugUtilsExtension;

// Only pull in error/warn when debug assertions are on
#[cfg(debug_assertions)]
use log::{error, warn};

use crate::core::canvas::Frame;
use crate::core::renderer::api::Presenter;
use crate::error::{AppError, Result, VkResultExt};
use log::{debug, info};
use smallvec::SmallVec;
use std::ffi::CStr;
use std::rc::Rc;

use vulkanalia::loader::{LIBRARY, LibloadingLoader};
use vulkanalia::prelude::v1_0::*;
use vulkanalia::vk::{EntryV1_1, Handle};

use vulkanalia::vk::KhrSurfaceExtension;
use vulkanalia::vk::{self, KhrSwapchainExtension};

use vulkanalia::window as vk_window;
use winit::dpi::PhysicalSize;
use winit::raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::window::Window;

// Portability extension needed on some platforms (e.g., macOS + MoltenVK)
const KHR_PORTABILITY_SUBSET_EXTENSION_NAME: &std::ffi::CStr =
    unsafe { std::ffi::CStr::from_bytes_with_nul_unchecked(b"VK_KHR_portability_subset\0") };

/// Presents CPU frames through Vulkan.
///
/// There is no graphics pipeline: every frame is written into a host-visible
/// staging buffer and copied straight into the acquired swapchain image.
#[derive(Default)]
pub struct VulkanPresenter {
    window: Option<Rc<Window>>,                // keeps the surface's window alive
    entry: Option<Entry>,                      // Vulkan entry point (library handle)
    instance: Option<Instance>,                // Vulkan instance
    debug: Option<vk::DebugUtilsMessengerEXT>, // Debug messenger (only in debug builds)
    surface: Option<vk::SurfaceKHR>,           // Window surface
    physical_device: Option<vk::PhysicalDevice>, // Chosen physical GPU
    device: Option<Device>,                    // Logical device
    graphics_queue: Option<vk::Queue>,         // Transfer work is submitted here
    present_queue: Option<vk::Queue>,          // Presentation queue
    queue_family_indices: Option<(u32, u32)>,  // (graphics, present)

    swapchain: Option<vk::SwapchainKHR>,
    // Usually 2–3 images; SmallVec avoids heap allocation for small counts
    swapchain_images: SmallVec<[vk::Image; 4]>,
    swapchain_format: Option<vk::Format>,
    swapchain_extent: Option<vk::Extent2D>,
    swapchain_dirty: bool,
    window_size: PhysicalSize<u32>,

    command_pool: Option<vk::CommandPool>,
    command_buffer: Option<vk::CommandBuffer>,
    image_available: Option<vk::Semaphore>,
    copy_finished: Option<vk::Semaphore>,
    in_flight: Option<vk::Fence>,

    staging: Option<StagingBuffer>,
}

/// Persistently mapped, host-coherent transfer source.
struct StagingBuffer {
    buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    mapped: *mut u32,
    width: u32,
    height: u32,
}

impl VulkanPresenter {
    fn device(&self) -> Result<&Device> {
        self.device.as_ref().ok_or(AppError::NoSurface)
    }

    /// Cleans up all Vulkan resources.
    /// Safe to call multiple times, called automatically in Drop.
    fn cleanup(&mut self) {
        unsafe {
            if let Some(device) = &self.device {
                // Wait until GPU is idle before tearing down
                device.device_wait_idle().ok();

                if let Some(staging) = self.staging.take() {
                    device.unmap_memory(staging.memory);
                    device.destroy_buffer(staging.buffer, None);
                    device.free_memory(staging.memory, None);
                }
                if let Some(fence) = self.in_flight.take() {
                    device.destroy_fence(fence, None);
                }
                for semaphore in [self.image_available.take(), self.copy_finished.take()]
                    .into_iter()
                    .flatten()
                {
                    device.destroy_semaphore(semaphore, None);
                }
                // Destroying the pool frees its command buffers
                if let Some(pool) = self.command_pool.take() {
                    device.destroy_command_pool(pool, None);
                }
                self.command_buffer = None;

                if let Some(swapchain) = self.swapchain.take() {
                    device.destroy_swapchain_khr(swapchain, None);
                }
            }

            // Destroy debug messenger (only created in debug builds)
            #[cfg(debug_assertions)]
            if let (Some(instance), Some(debug)) = (&self.instance, &self.debug) {
                destroy_debug_messenger(instance, debug);
            }
            self.debug = None;

            // Destroy surface
            if let (Some(instance), Some(surface)) = (&self.instance, self.surface) {
                instance.destroy_surface_khr(surface, None);
            }
            self.surface = None;

            // Destroy logical device
            if let Some(device) = &self.device {
                device.destroy_device(None);
            }
            self.device = None;

            // Destroy Vulkan instance
            if let Some(instance) = &self.instance {
                instance.destroy_instance(None);
            }
            self.instance = None;
        }

        // Clear CPU-side state
        self.entry = None;
        self.physical_device = None;
        self.graphics_queue = None;
        self.present_queue = None;
        self.queue_family_indices = None;
        self.swapchain_images.clear();
        self.swapchain_format = None;
        self.swapchain_extent = None;
        self.window = None;
    }

    /// Creates (or re-creates) the swapchain. Images are used as transfer
    /// destinations only.
    fn create_swapchain(&mut self) -> Result<()> {
        let instance = self.instance.as_ref().ok_or(AppError::NoSurface)?;
        let device = self.device.as_ref().ok_or(AppError::NoSurface)?;
        let surface = self.surface.ok_or(AppError::NoSurface)?;
        let physical_device = self.physical_device.ok_or(AppError::NoSurface)?;
        let (graphics_family, present_family) =
            self.queue_family_indices.ok_or(AppError::NoSurface)?;

        unsafe { device.device_wait_idle() }.context("wait idle before swapchain")?;

        let surface_caps = unsafe {
            instance.get_physical_device_surface_capabilities_khr(physical_device, surface)
        }
        .context("surface capabilities")?;

        if !surface_caps
            .supported_usage_flags
            .contains(vk::ImageUsageFlags::TRANSFER_DST)
        {
            return Err(AppError::Surface(
                "swapchain images cannot be transfer destinations".into(),
            ));
        }

        let surface_formats = unsafe {
            instance.get_physical_device_surface_formats_khr(physical_device, surface)
        }
        .context("surface formats")?;

        let format = choose_surface_format(&surface_formats)?;

        // Pick swapchain resolution (use current_extent if fixed)
        let extent = match surface_caps.current_extent.width {
            u32::MAX => vk::Extent2D {
                width: self.window_size.width.clamp(
                    surface_caps.min_image_extent.width,
                    surface_caps.max_image_extent.width,
                ),
                height: self.window_size.height.clamp(
                    surface_caps.min_image_extent.height,
                    surface_caps.max_image_extent.height,
                ),
            },
            _ => surface_caps.current_extent,
        };

        // FIFO is always available and redraws are on demand anyway
        let present_mode = vk::PresentModeKHR::FIFO;

        // Request one more image than minimum if possible
        let mut image_count = surface_caps.min_image_count + 1;
        if surface_caps.max_image_count > 0 && image_count > surface_caps.max_image_count {
            image_count = surface_caps.max_image_count;
        }

        let families = [graphics_family, present_family];
        let (sharing_mode, family_slice): (_, &[u32]) = if graphics_family != present_family {
            (vk::SharingMode::CONCURRENT, &families)
        } else {
            (vk::SharingMode::EXCLUSIVE, &[])
        };

        let old_swapchain = self.swapchain.unwrap_or_else(vk::SwapchainKHR::null);
        let swapchain_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(surface)
            .min_image_count(image_count)
            .image_format(format.format)
            .image_color_space(format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::TRANSFER_DST)
            .image_sharing_mode(sharing_mode)
            .queue_family_indices(family_slice)
            .pre_transform(surface_caps.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(old_swapchain);

        let swapchain = unsafe { device.create_swapchain_khr(&swapchain_info, None) }
            .context("create swapchain")?;
        if let Some(old) = self.swapchain.take() {
            unsafe { device.destroy_swapchain_khr(old, None) };
        }

        let images_raw =
            unsafe { device.get_swapchain_images_khr(swapchain) }.context("swapchain images")?;
        let mut images: SmallVec<[vk::Image; 4]> = SmallVec::with_capacity(images_raw.len());
        images.extend_from_slice(&images_raw);

        self.swapchain = Some(swapchain);
        self.swapchain_images = images;
        self.swapchain_format = Some(format.format);
        self.swapchain_extent = Some(extent);
        self.swapchain_dirty = false;

        info!(
            "✅ Swapchain ready: {}x{} {:?}, {} images",
            extent.width,
            extent.height,
            format.format,
            self.swapchain_images.len()
        );
        Ok(())
    }

    /// Command pool, command buffer and the per-frame sync objects.
    fn create_frame_resources(&mut self) -> Result<()> {
        let (graphics_family, _) = self.queue_family_indices.ok_or(AppError::NoSurface)?;
        let device = self.device()?;

        let pool_info = vk::CommandPoolCreateInfo::builder()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(graphics_family);
        let pool = unsafe { device.create_command_pool(&pool_info, None) }
            .context("create command pool")?;

        let alloc_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);
        let command_buffer = unsafe { device.allocate_command_buffers(&alloc_info) }
            .context("allocate command buffer")?[0];

        let semaphore_info = vk::SemaphoreCreateInfo::builder();
        let image_available = unsafe { device.create_semaphore(&semaphore_info, None) }
            .context("create semaphore")?;
        let copy_finished = unsafe { device.create_semaphore(&semaphore_info, None) }
            .context("create semaphore")?;

        // Signaled so the first present does not wait forever
        let fence_info = vk::FenceCreateInfo::builder().flags(vk::FenceCreateFlags::SIGNALED);
        let in_flight =
            unsafe { device.create_fence(&fence_info, None) }.context("create fence")?;

        self.command_pool = Some(pool);
        self.command_buffer = Some(command_buffer);
        self.image_available = Some(image_available);
        self.copy_finished = Some(copy_finished);
        self.in_flight = Some(in_flight);
        Ok(())
    }

    /// Makes sure the staging buffer matches the frame dimensions.
    fn ensure_staging(&mut self, width: u32, height: u32) -> Result<()> {
        if let Some(s) = &self.staging {
            if s.width == width && s.height == height {
                return Ok(());
            }
        }

        let instance = self.instance.as_ref().ok_or(AppError::NoSurface)?;
        let physical_device = self.physical_device.ok_or(AppError::NoSurface)?;
        let device = self.device.as_ref().ok_or(AppError::NoSurface)?;

        if let Some(old) = self.staging.take() {
            unsafe {
                device.device_wait_idle().ok();
                device.unmap_memory(old.memory);
                device.destroy_buffer(old.buffer, None);
                device.free_memory(old.memory, None);
            }
        }

        let size = width as u64 * height as u64 * 4;
        let buffer_info = vk::BufferCreateInfo::builder()
            .size(size)
            .usage(vk::BufferUsageFlags::TRANSFER_SRC)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);
        let buffer =
            unsafe { device.create_buffer(&buffer_info, None) }.context("create staging buffer")?;

        let requirements = unsafe { device.get_buffer_memory_requirements(buffer) };
        let memory_props =
            unsafe { instance.get_physical_device_memory_properties(physical_device) };
        let wanted = vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT;
        let memory_type = (0..memory_props.memory_type_count)
            .find(|&i| {
                requirements.memory_type_bits & (1 << i) != 0
                    && memory_props.memory_types[i as usize]
                        .property_flags
                        .contains(wanted)
            })
            .ok_or_else(|| AppError::Surface("no host-visible memory type".into()))?;

        let alloc_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type);
        let memory =
            unsafe { device.allocate_memory(&alloc_info, None) }.context("allocate staging")?;
        unsafe { device.bind_buffer_memory(buffer, memory, 0) }.context("bind staging")?;
        let mapped = unsafe { device.map_memory(memory, 0, size, vk::MemoryMapFlags::empty()) }
            .context("map staging")? as *mut u32;

        debug!("staging buffer resized to {width}x{height}");
        self.staging = Some(StagingBuffer {
            buffer,
            memory,
            mapped,
            width,
            height,
        });
        Ok(())
    }

    /// Records: undefined -> transfer dst, buffer copy, transfer dst -> present.
    fn record_copy(&self, image: vk::Image) -> Result<()> {
        let device = self.device()?;
        let command_buffer = self.command_buffer.ok_or(AppError::NoSurface)?;
        let staging = self.staging.as_ref().ok_or(AppError::NoSurface)?;
        let extent = self.swapchain_extent.ok_or(AppError::NoSurface)?;

        let range = vk::ImageSubresourceRange::builder()
            .aspect_mask(vk::ImageAspectFlags::COLOR)
            .base_mip_level(0)
            .level_count(1)
            .base_array_layer(0)
            .layer_count(1)
            .build();

        let to_transfer = vk::ImageMemoryBarrier::builder()
            .old_layout(vk::ImageLayout::UNDEFINED)
            .new_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .image(image)
            .subresource_range(range)
            .src_access_mask(vk::AccessFlags::empty())
            .dst_access_mask(vk::AccessFlags::TRANSFER_WRITE);

        let to_present = vk::ImageMemoryBarrier::builder()
            .old_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
            .new_layout(vk::ImageLayout::PRESENT_SRC_KHR)
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .image(image)
            .subresource_range(range)
            .src_access_mask(vk::AccessFlags::TRANSFER_WRITE)
            .dst_access_mask(vk::AccessFlags::empty());

        let layers = vk::ImageSubresourceLayers::builder()
            .aspect_mask(vk::ImageAspectFlags::COLOR)
            .mip_level(0)
            .base_array_layer(0)
            .layer_count(1)
            .build();

        // Copy the overlapping top-left area; row length keeps the frame stride
        let region = vk::BufferImageCopy::builder()
            .buffer_offset(0)
            .buffer_row_length(staging.width)
            .buffer_image_height(staging.height)
            .image_subresource(layers)
            .image_offset(vk::Offset3D { x: 0, y: 0, z: 0 })
            .image_extent(vk::Extent3D {
                width: staging.width.min(extent.width),
                height: staging.height.min(extent.height),
                depth: 1,
            });

        unsafe {
            device
                .reset_command_buffer(command_buffer, vk::CommandBufferResetFlags::empty())
                .context("reset command buffer")?;
            let begin = vk::CommandBufferBeginInfo::builder()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            device
                .begin_command_buffer(command_buffer, &begin)
                .context("begin command buffer")?;

            device.cmd_pipeline_barrier(
                command_buffer,
                vk::PipelineStageFlags::TOP_OF_PIPE,
                vk::PipelineStageFlags::TRANSFER,
                vk::DependencyFlags::empty(),
                &[] as &[vk::MemoryBarrier],
                &[] as &[vk::BufferMemoryBarrier],
                &[to_transfer],
            );
            device.cmd_copy_buffer_to_image(
                command_buffer,
                staging.buffer,
                image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
            );
            device.cmd_pipeline_barrier(
                command_buffer,
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::BOTTOM_OF_PIPE,
                vk::DependencyFlags::empty(),
                &[] as &[vk::MemoryBarrier],
                &[] as &[vk::BufferMemoryBarrier],
                &[to_present],
            );

            device
                .end_command_buffer(command_buffer)
                .context("end command buffer")?;
        }
        Ok(())
    }

    /// Writes `frame` into the mapped staging memory in the swapchain's byte order.
    fn upload(&mut self, frame: &Frame) {
        let swap_rb = self.swapchain_format == Some(vk::Format::R8G8B8A8_UNORM);
        let Some(staging) = &self.staging else {
            return;
        };
        let len = (staging.width * staging.height) as usize;
        // SAFETY: mapped points at `len` u32s of host-coherent memory owned by `staging`
        let dst = unsafe { std::slice::from_raw_parts_mut(staging.mapped, len) };
        for (d, &px) in dst.iter_mut().zip(frame.pixels()) {
            *d = if swap_rb {
                0xFF00_0000 | ((px & 0xFF) << 16) | (px & 0xFF00) | ((px >> 16) & 0xFF)
            } else {
                0xFF00_0000 | px
            };
        }
    }
}

impl Presenter for VulkanPresenter {
    /// Initialize Vulkan: create instance, device, swapchain and frame resources.
    fn initialize(&mut self, window: Rc<Window>) -> Result<()> {
        // Load Vulkan library
        let loader = unsafe { LibloadingLoader::new(LIBRARY) }
            .map_err(|e| AppError::Loader(e.to_string()))?;
        let entry =
            unsafe { Entry::new(loader) }.map_err(|e| AppError::Loader(e.to_string()))?;

        // Query required instance extensions from winit
        let mut exts: SmallVec<[*const i8; 8]> =
            vk_window::get_required_instance_extensions(window.as_ref())
                .iter()
                .map(|e| e.as_ptr())
                .collect();

        // Add debug utils extension in debug builds
        #[cfg(debug_assertions)]
        {
            exts.push(vk::EXT_DEBUG_UTILS_EXTENSION.name.as_ptr());
        }

        // On macOS, require portability extension
        #[cfg(target_os = "macos")]
        exts.push(vk::KHR_PORTABILITY_ENUMERATION_EXTENSION.name.as_ptr());

        // Check for validation layer availability (debug builds only)
        #[cfg(debug_assertions)]
        let has_validation_layer = unsafe { entry.enumerate_instance_layer_properties() }
            .context("enumerate layers")?
            .iter()
            .any(|p| unsafe {
                CStr::from_ptr(p.layer_name.as_ptr()).to_bytes() == b"VK_LAYER_KHRONOS_validation"
            });

        #[cfg(debug_assertions)]
        let mut layer_pointers: SmallVec<[*const i8; 4]> = SmallVec::new();

        #[cfg(not(debug_assertions))]
        let layer_pointers: SmallVec<[*const i8; 4]> = SmallVec::new();

        #[cfg(debug_assertions)]
        if has_validation_layer {
            layer_pointers.push(b"VK_LAYER_KHRONOS_validation\0".as_ptr() as *const i8);
            info!("✅ Validation layer enabled");
        }

        // macOS portability flag
        let mut flags = vk::InstanceCreateFlags::empty();
        #[cfg(target_os = "macos")]
        {
            flags |= vk::InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR;
        }

        let supported =
            unsafe { entry.enumerate_instance_version() }.context("instance version")?;

        let app_info = vk::ApplicationInfo::builder()
            .application_name(b"blunderDB\0")
            .engine_name(b"blunderDB\0")
            .api_version(supported);

        #[cfg(debug_assertions)]
        let mut create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&exts)
            .enabled_layer_names(&layer_pointers)
            .flags(flags);

        #[cfg(not(debug_assertions))]
        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&exts)
            .enabled_layer_names(&layer_pointers)
            .flags(flags);

        #[cfg(debug_assertions)]
        let mut debug_ci = build_debug_messenger_ci();
        #[cfg(debug_assertions)]
        {
            create_info = create_info.push_next(&mut debug_ci);
        }

        let instance =
            unsafe { entry.create_instance(&create_info, None) }.context("vkCreateInstance")?;
        info!("🎉 Vulkan instance ready");

        #[cfg(debug_assertions)]
        let debug = Some(create_debug_messenger(&instance, &debug_ci)?);

        #[cfg(not(debug_assertions))]
        let debug = None;

        // Create window surface
        let window_handle = window
            .window_handle()
            .map_err(|e| AppError::Surface(e.to_string()))?;
        let display_handle = window
            .display_handle()
            .map_err(|e| AppError::Surface(e.to_string()))?;
        let surface = unsafe {
            vk_window::create_surface(
                &instance,
                &display_handle as &dyn HasDisplayHandle,
                &window_handle as &dyn HasWindowHandle,
            )
        }
        .context("create surface")?;

        // Pick physical device + queue families
        let devices =
            unsafe { instance.enumerate_physical_devices() }.context("enumerate devices")?;
        let (physical_device, graphics_family, present_family) = devices
            .iter()
            .find_map(|&dev| {
                let props = unsafe { instance.get_physical_device_queue_family_properties(dev) };
                let mut graphics_index = None;
                let mut present_index = None;
                for (i, info) in props.iter().enumerate() {
                    if info.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
                        graphics_index.get_or_insert(i as u32);
                    }
                    let present_support = unsafe {
                        instance.get_physical_device_surface_support_khr(dev, i as u32, surface)
                    }
                    .unwrap_or(false);
                    if present_support {
                        present_index.get_or_insert(i as u32);
                    }
                }
                Some((dev, graphics_index?, present_index?))
            })
            .ok_or_else(|| AppError::Surface("no GPU can present to this window".into()))?;

        let has_portability_subset =
            unsafe { instance.enumerate_device_extension_properties(physical_device, None) }
                .context("device extensions")?
                .iter()
                .any(|e| {
                    let name = unsafe { CStr::from_ptr(e.extension_name.as_ptr()) };
                    name == KHR_PORTABILITY_SUBSET_EXTENSION_NAME
                });

        let mut device_exts: SmallVec<[*const i8; 4]> = SmallVec::new();
        device_exts.push(vk::KHR_SWAPCHAIN_EXTENSION.name.as_ptr());
        if has_portability_subset {
            device_exts.push(KHR_PORTABILITY_SUBSET_EXTENSION_NAME.as_ptr());
            info!("✅ VK_KHR_portability_subset enabled");
        }

        let mut unique_queues: SmallVec<[u32; 2]> = SmallVec::new();
        unique_queues.push(graphics_family);
        if graphics_family != present_family {
            unique_queues.push(present_family);
        }

        let queue_priorities = [1.0_f32];
        let queue_create_infos: SmallVec<[vk::DeviceQueueCreateInfo; 2]> = unique_queues
            .iter()
            .map(|&family| {
                vk::DeviceQueueCreateInfo::builder()
                    .queue_family_index(family)
                    .queue_priorities(&queue_priorities)
                    .build()
            })
            .collect();

        let device_create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&device_exts);

        let device = unsafe { instance.create_device(physical_device, &device_create_info, None) }
            .context("create logical device")?;

        let graphics_queue = unsafe { device.get_device_queue(graphics_family, 0) };
        let present_queue = unsafe { device.get_device_queue(present_family, 0) };

        self.window_size = window.inner_size();
        self.window = Some(window);
        self.entry = Some(entry);
        self.instance = Some(instance);
        self.debug = debug;
        self.surface = Some(surface);
        self.physical_device = Some(physical_device);
        self.queue_family_indices = Some((graphics_family, present_family));
        self.device = Some(device);
        self.graphics_queue = Some(graphics_queue);
        self.present_queue = Some(present_queue);

        self.create_swapchain()?;
        self.create_frame_resources()?;
        info!("✅ Vulkan presenter ready");
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) -> Result<()> {
        if size != self.window_size {
            self.window_size = size;
            self.swapchain_dirty = true;
        }
        Ok(())
    }

    fn present(&mut self, frame: &Frame) -> Result<()> {
        let fs = frame.size();
        if fs.is_empty() || self.window_size.width == 0 || self.window_size.height == 0 {
            return Ok(());
        }
        if self.swapchain_dirty {
            self.create_swapchain()?;
        }

        let fence = self.in_flight.ok_or(AppError::NoSurface)?;
        unsafe {
            let device = self.device()?;
            device
                .wait_for_fences(&[fence], true, u64::MAX)
                .context("wait for fence")?;
        }

        self.ensure_staging(fs.width, fs.height)?;
        self.upload(frame);

        let swapchain = self.swapchain.ok_or(AppError::NoSurface)?;
        let image_available = self.image_available.ok_or(AppError::NoSurface)?;
        let acquired = unsafe {
            self.device()?.acquire_next_image_khr(
                swapchain,
                u64::MAX,
                image_available,
                vk::Fence::null(),
            )
        };
        let image_index = match acquired {
            Ok((index, _)) => index,
            Err(vk::ErrorCode::OUT_OF_DATE_KHR) => {
                debug!("swapchain out of date on acquire");
                self.swapchain_dirty = true;
                return Ok(());
            }
            Err(e) => return Err(AppError::Vk(e, "acquire next image")),
        };

        let image = self.swapchain_images[image_index as usize];
        self.record_copy(image)?;

        let device = self.device()?;
        let command_buffer = self.command_buffer.ok_or(AppError::NoSurface)?;
        let copy_finished = self.copy_finished.ok_or(AppError::NoSurface)?;
        let graphics_queue = self.graphics_queue.ok_or(AppError::NoSurface)?;
        let present_queue = self.present_queue.ok_or(AppError::NoSurface)?;

        let wait_semaphores = [image_available];
        let wait_stages = [vk::PipelineStageFlags::TRANSFER];
        let command_buffers = [command_buffer];
        let signal_semaphores = [copy_finished];
        let submit_info = vk::SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            device.reset_fences(&[fence]).context("reset fence")?;
            device
                .queue_submit(graphics_queue, &[submit_info], fence)
                .context("submit copy")?;
        }

        let swapchains = [swapchain];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(&signal_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let presented = unsafe { device.queue_present_khr(present_queue, &present_info) };
        match presented {
            Ok(vk::SuccessCode::SUBOPTIMAL_KHR) | Err(vk::ErrorCode::OUT_OF_DATE_KHR) => {
                self.swapchain_dirty = true;
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(e) => Err(AppError::Vk(e, "queue present")),
        }
    }

    fn shutdown(&mut self) {
        if self.device.is_some() {
            info!("Vulkan presenter shut down");
        }
        self.cleanup();
    }
}

impl Drop for VulkanPresenter {
    fn drop(&mut self) {
        // Ensure cleanup happens when the presenter goes out of scope.
        // Must not panic.
        self.cleanup();
    }
}

/// Picks a swapchain format the packed 8-bit frame can be copied into.
///
/// Frames are stored as 0x00RRGGBB, which is BGRA in memory on little-endian
/// hosts. RGBA is accepted too and swizzled in `upload`; anything else would
/// show garbled colours.
fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Result<vk::SurfaceFormatKHR> {
    [vk::Format::B8G8R8A8_UNORM, vk::Format::R8G8B8A8_UNORM]
        .iter()
        .find_map(|wanted| formats.iter().find(|f| f.format == *wanted))
        .copied()
        .ok_or_else(|| {
            let offered: Vec<_> = formats.iter().map(|f| f.format).collect();
            AppError::Surface(format!("no 8-bit BGRA/RGBA surface format in {offered:?}"))
        })
}

//
// ===== Debug Utils helpers (only compiled in debug builds) =====
//

#[cfg(debug_assertions)]
unsafe extern "system" fn debug_callback(
    sev: vk::DebugUtilsMessageSeverityFlagsEXT,
    ty: vk::DebugUtilsMessageTypeFlagsEXT,
    data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _ud: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let message = unsafe { std::ffi::CStr::from_ptr((*data).message).to_string_lossy() };

    if sev.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        error!("[{ty:?}] {message}");
    } else if sev.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        warn!("[{ty:?}] {message}");
    } else {
        info!("[{ty:?}] {message}");
    }
    vk::FALSE
}

#[cfg(debug_assertions)]
fn build_debug_messenger_ci() -> vk::DebugUtilsMessengerCreateInfoEXTBuilder<'static> {
    vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .user_callback(Some(debug_callback))
}

#[cfg(debug_assertions)]
fn create_debug_messenger(
    instance: &Instance,
    ci: &vk::DebugUtilsMessengerCreateInfoEXT,
) -> Result<vk::DebugUtilsMessengerEXT> {
    unsafe { instance.create_debug_utils_messenger_ext(ci, None) }.context("debug utils messenger")
}

#[cfg(debug_assertions)]
fn destroy_debug_messenger(instance: &Instance, messenger: &vk::DebugUtilsMessengerEXT) {
    unsafe { instance.destroy_debug_utils_messenger_ext(*messenger, None) };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_format(format: vk::Format) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR {
            format,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        }
    }

    #[test]
    fn prefers_bgra_over_rgba() {
        let formats = [
            surface_format(vk::Format::R8G8B8A8_UNORM),
            surface_format(vk::Format::B8G8R8A8_UNORM),
        ];
        let chosen = choose_surface_format(&formats).unwrap();
        assert_eq!(chosen.format, vk::Format::B8G8R8A8_UNORM);
    }

    #[test]
    fn falls_back_to_rgba() {
        let formats = [
            surface_format(vk::Format::A2B10G10R10_UNORM_PACK32),
            surface_format(vk::Format::R8G8B8A8_UNORM),
        ];
        let chosen = choose_surface_format(&formats).unwrap();
        assert_eq!(chosen.format, vk::Format::R8G8B8A8_UNORM);
    }

    #[test]
    fn rejects_surfaces_without_an_8_bit_format() {
        let formats = [surface_format(vk::Format::A2B10G10R10_UNORM_PACK32)];
        assert!(matches!(
            choose_surface_format(&formats),
            Err(AppError::Surface(_))
        ));
        assert!(matches!(choose_surface_format(&[]), Err(AppError::Surface(_))));
    }
}
