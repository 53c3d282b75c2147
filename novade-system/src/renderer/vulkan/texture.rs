// novade-system/src/renderer/vulkan/texture.rs
use std::sync::Arc;
use uuid::Uuid;
use crate::compositor::renderer_interface::abstraction::{RenderableTexture, RendererError};
use smithay::backend::renderer::utils::Fourcc;
use vulkano::image::ImageViewAbstract; // For actual Vulkan texture later
// use vk_mem; // For vk_mem::Allocation if used directly in VulkanTexture

#[derive(Debug)]
pub struct VulkanTexture {
    id: Uuid,
    // pub image_view: Arc<dyn ImageViewAbstract>, // Actual Vulkano ImageView
    // pub memory_alloc: Arc<vk_mem::Allocation>,   // Actual vk-mem allocation
    width: u32,
    height: u32,
    format: Option<Fourcc>, // Or a Vulkano format
}

impl VulkanTexture {
    // Constructor for the placeholder. Real constructor will take Vulkan resources.
    pub fn new(width: u32, height: u32, format: Option<Fourcc> /*, image_view: Arc<dyn ImageViewAbstract>, memory_alloc: Arc<vk_mem::Allocation> */) -> Self {
        tracing::debug!("Creating new VulkanTexture (placeholder) with id: {}, size: {}x{}", Uuid::new_v4(), width, height);
        Self {
            id: Uuid::new_v4(),
            // image_view,
            // memory_alloc,
            width, 
            height, 
            format,
        }
    }
}

impl RenderableTexture for VulkanTexture {
    fn id(&self) -> Uuid {
        self.id
    }

    fn bind(&self, _slot: u32) -> Result<(), RendererError> {
        // Placeholder: Actual binding logic for Vulkan descriptor sets would go here
        tracing::trace!("VulkanTexture::bind (placeholder) called for texture {}", self.id);
        // In a real scenario, this might involve updating a descriptor set
        // or binding the texture to a fixed sampler in a shader.
        Ok(())
    }

    fn width_px(&self) -> u32 {
        self.width
    }

    fn height_px(&self) -> u32 {
        self.height
    }

    fn format(&self) -> Option<Fourcc> {
        self.format
        // Placeholder: Convert Vulkan format to Fourcc
        // e.g., if self.image_view was present:
        // match self.image_view.format() {
        //    Some(vulkano::format::Format::R8G8B8A8_UNORM) => Some(Fourcc::Argb8888), // Or Abgr8888 depending on byte order interpretation
        //    Some(vulkano::format::Format::B8G8R8A8_UNORM) => Some(Fourcc::Abgr8888),
        //    // ... other format mappings
        //    _ => None,
        // }
    }
}
