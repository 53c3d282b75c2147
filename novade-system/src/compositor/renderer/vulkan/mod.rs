// This file declares the vulkan module and its submodules.

pub mod instance;
pub mod physical_device;
pub mod device;
pub mod allocator;
pub mod surface_swapchain;
pub mod pipeline;
pub mod render_pass;
pub mod framebuffer;
pub mod frame_renderer;
pub mod texture;
