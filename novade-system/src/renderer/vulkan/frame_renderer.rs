// novade-system/src/renderer/vulkan/frame_renderer.rs
use std::sync::Arc;
use uuid::Uuid;
use smithay::{
    backend::allocator::dmabuf::Dmabuf,
    reexports::wayland_server::protocol::wl_buffer::WlBuffer,
    utils::{Physical, Rectangle, Size},
    backend::renderer::utils::Fourcc, // Added for SHM texture creation format
};
use crate::compositor::renderer_interface::abstraction::{
    FrameRenderer, RenderElement, RenderableTexture, RendererError,
};
use super::VulkanCoreContext; // Assuming VulkanCoreContext is in super (vulkan/mod.rs)
use super::texture::VulkanTexture; // From the new texture.rs

#[derive(Debug)]
pub struct VulkanFrameRenderer {
    id: Uuid,
    core: Arc<VulkanCoreContext>,
    // Add other necessary fields: command pools, descriptor pools, per-frame data, pipelines etc.
    // screen_size: Size<i32, Physical>, // Will be derived from swapchain or output config
}

impl VulkanFrameRenderer {
    pub fn new(core: Arc<VulkanCoreContext> /*, initial_screen_size: Size<i32, Physical> */) -> Result<Self, RendererError> {
        let id = Uuid::new_v4();
        tracing::info!("Creating new VulkanFrameRenderer with id: {}", id);
        // Here, one would typically initialize Vulkan specific resources needed for rendering frames:
        // - Command pools
        // - Descriptor set layouts and pools (if not managed globally)
        // - Render passes (if not dynamic rendering)
        // - Default pipelines (e.g., for solid colors, textured quads)
        Ok(Self {
            id,
            core,
            // screen_size,
        })
    }
}

impl FrameRenderer for VulkanFrameRenderer {
    fn id(&self) -> Uuid {
        self.id
    }

    fn render_frame<'a>(
        &mut self,
        elements: impl IntoIterator<Item = RenderElement<'a>>,
        output_geometry: Rectangle<i32, Physical>,
        output_scale: f64,
    ) -> Result<(), RendererError> {
        tracing::info!("VulkanFrameRenderer::render_frame (placeholder) called for renderer {}", self.id);
        tracing::debug!("Output geometry: {:?}, scale: {}", output_geometry, output_scale);
        for (idx, element) in elements.into_iter().enumerate() {
            tracing::trace!("  Element [{}]: type: {:?}, geo: {:?}, alpha: {}", 
                idx, element.element_type(), element.geometry(output_scale), element.alpha());
            // Further processing based on element type (texture, solid color, etc.)
        }
        // Placeholder: Actual Vulkan rendering logic for a frame
        // This would involve:
        // 1. Acquiring a swapchain image (if rendering to swapchain, handled by a higher layer typically)
        // 2. Beginning a command buffer from a command pool specific to the current frame/thread.
        // 3. Beginning a render pass (or using dynamic rendering with Vulkan 1.3).
        //    - Setting clear values, render area, etc.
        // 4. Iterating through RenderElement:
        //    - Setting viewport and scissor.
        //    - Binding appropriate graphics pipeline (e.g., for textured quads, solid colors).
        //    - Binding descriptor sets (containing textures, uniforms for transformations).
        //    - Pushing constants (e.g., for specific color or transformation matrix).
        //    - Issuing draw calls (vkCmdDraw, vkCmdDrawIndexed).
        // 5. Ending render pass and command buffer.
        // 6. Submitting command buffer to a queue (likely graphics_queue from VulkanCoreContext).
        //    - Managing synchronization (fences, semaphores).
        Ok(())
    }

    fn present_frame(&mut self) -> Result<(), RendererError> {
        tracing::info!("VulkanFrameRenderer::present_frame (placeholder) called for renderer {}", self.id);
        // Placeholder: Actual Vulkan presentation logic
        // This would involve:
        // 1. Presenting the rendered image (from a swapchain typically, managed by a higher layer).
        //    - This means queueing a present operation on a presentation-capable queue.
        // 2. Handling swapchain recreation if it's out of date or suboptimal.
        //    - This often requires recreating framebuffers and potentially other resources.
        Ok(())
    }

    fn create_texture_from_shm(
        &mut self,
        buffer: &WlBuffer,
    ) -> Result<Box<dyn RenderableTexture>, RendererError> {
        tracing::info!("VulkanFrameRenderer::create_texture_from_shm (placeholder) called for buffer: {:?}", buffer.id());
        // Placeholder: Actual Vulkan SHM buffer import and texture creation
        // This would involve:
        // 1. Getting SHM buffer details (width, height, format, data pointer).
        // 2. Creating a Vulkan staging buffer and copying SHM data to it.
        // 3. Creating a Vulkan image with appropriate format and usage flags (e.g., SAMPLED, TRANSFER_DST).
        // 4. Allocating memory for the image using vk-mem.
        // 5. Binding the image to memory.
        // 6. Transitioning image layout from UNDEFINED to TRANSFER_DST_OPTIMAL.
        // 7. Copying data from staging buffer to the image.
        // 8. Transitioning image layout from TRANSFER_DST_OPTIMAL to SHADER_READ_ONLY_OPTIMAL.
        // 9. Creating an ImageView for the image.
        // 10. Returning a VulkanTexture wrapping the ImageView and memory.
        let shm_data = smithay::wayland::shm::with_buffer_contents(buffer, |ptr, len, data| {
            tracing::debug!("SHM buffer details: len={}, width={}, height={}, stride={}, format={:?}", len, data.width, data.height, data.stride, data.format);
            // For now, just acknowledge we can access it.
            // In a real implementation, data would be copied here.
            Ok((data.width, data.height, data.format))
        }).map_err(|e| RendererError::ImportFailed(format!("Failed to access SHM buffer contents: {:?}", e)))?;

        // For now, return a dummy texture
        Ok(Box::new(VulkanTexture::new(shm_data.0 as u32, shm_data.1 as u32, Some(shm_data.2.try_into().unwrap_or(Fourcc::Abgr8888)))))
    }

    fn create_texture_from_dmabuf(
        &mut self,
        dmabuf_attributes: &Dmabuf,
    ) -> Result<Box<dyn RenderableTexture>, RendererError> {
        tracing::info!("VulkanFrameRenderer::create_texture_from_dmabuf (placeholder) called for dmabuf with {} planes", dmabuf_attributes.num_planes());
        // Placeholder: Actual Vulkan DMA-BUF import
        // This is a complex process involving:
        // 1. Querying Vulkan for DMA-BUF import capabilities.
        // 2. Getting memory properties for the DMA-BUF FDs.
        // 3. Creating an external memory Vulkan image.
        // 4. Allocating and binding memory imported from the DMA-BUF FDs.
        // 5. Handling multi-planar formats (YUV, etc.) by potentially creating multiple ImageViews
        //    or using sampler YCbCr conversion.
        Err(RendererError::Unsupported("DMA-BUF import not yet implemented for VulkanFrameRenderer".to_string()))
    }

    fn screen_size(&self) -> Size<i32, Physical> {
        // Placeholder: Return actual screen/swapchain size from VulkanCoreContext or internal state
        // For now, a dummy size:
        tracing::trace!("VulkanFrameRenderer::screen_size (placeholder) called");
        Size::from((1920, 1080))
    }
}
