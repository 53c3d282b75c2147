// novade-system/src/compositor/render/dmabuf_importer.rs

use smithay::backend::allocator::dmabuf::Dmabuf;
use smithay::backend::renderer::gles2::Gles2Texture; // Placeholder, will need to be generic later
use smithay::backend::renderer::Texture; // For texture dimensions
use std::sync::Arc; // If textures are ref-counted

// Assuming CompositorError is accessible, e.g., from crate::compositor::core::errors
// If not, this path needs adjustment or RenderError needs to be defined.
use crate::compositor::core::errors::CompositorError;
// Or, if we define a local RenderError:
// use super::error::RenderError as CompositorError; // Assuming error.rs is created in render module

/// Represents an imported DMABUF buffer, likely as a texture.
/// This will need to be generic over the renderer's texture type.
/// For now, using Gles2Texture as a placeholder.
#[derive(Debug)]
pub struct AllocatedBuffer {
    // pub texture: Box<dyn RenderableTexture>, // Using a trait object
    pub texture: Arc<Gles2Texture>, // Placeholder: Specific texture type
    // Add any other relevant information, e.g., dimensions, format
    pub width: u32,
    pub height: u32,
}

/// Handles the import of DMABUF buffers into a usable format for the renderer.
#[derive(Debug)]
pub struct DmabufImporter {
    // For now, this struct might be simple.
    // It could hold references to renderer-specific EGL contexts or similar
    // if direct EGL interaction is needed here, though ideally that's in the renderer.
    // For GLES2, Dmabuf import is often tied to an EGLContext and Display.
    // Let's assume the renderer itself will handle the actual import for now,
    // and this importer is more of a high-level coordinator or state holder if needed.
}

impl DmabufImporter {
    /// Creates a new `DmabufImporter`.
    ///
    /// The creation might involve initializing EGL contexts or other backend-specific
    /// setup if the importer is directly responsible for parts of the import.
    /// For now, it's simple as the main logic is deferred to the renderer.
    pub fn new() -> Result<Self, CompositorError> {
        // In a real scenario, this might involve:
        // - Getting an EGL display/context if not already available.
        // - Checking for necessary EGL extensions (e.g., EGL_EXT_image_dma_buf_import).
        // For this plan, we assume such setup is part of the renderer that will consume the Dmabuf.
        tracing::info!("DmabufImporter created");
        Ok(Self {})
    }

    /// Imports a DMABUF into a renderer-specific `AllocatedBuffer`.
    ///
    /// This function is a placeholder. The actual import logic will likely
    /// be part of the `CompositorRenderer` trait implementation, as DMABUF import
    /// is highly dependent on the specific rendering backend (GLES2, Vulkan, WGPU).
    ///
    /// # Arguments
    ///
    /// * `dmabuf`: A reference to the `Dmabuf` object provided by Smithay.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AllocatedBuffer` on success, or a `CompositorError`
    /// on failure.
    pub fn import_dmabuf(
        &self,
        dmabuf: &Dmabuf,
        // renderer: &mut dyn CompositorRenderer, // This would be needed if renderer does the import
    ) -> Result<AllocatedBuffer, CompositorError> {
        // This is a conceptual placeholder.
        // The actual import mechanism will depend on how `CompositorRenderer` is structured
        // and which renderer backend is active.
        //
        // For GLES2, this would involve:
        // 1. Getting EGLImageKHR from the dmabuf FDs and attributes.
        // 2. Creating a GL_TEXTURE_EXTERNAL_OES texture.
        // 3. Binding the EGLImage to the texture using glEGLImageTargetTexture2DOES.
        //
        // The `smithay::backend::renderer::gles2::Gles2Renderer` has an `import_dmabuf`
        // method that does this. We'd likely call that from the active renderer.

        tracing::info!(
            "Attempting to import DMABUF: format={:?}, planes={}, width={}, height={}, flags={:?}",
            dmabuf.format(),
            dmabuf.num_planes(),
            dmabuf.width(),
            dmabuf.height(),
            dmabuf.flags()
        );

        // This function, as part of DmabufImporter, might not directly perform the import
        // if the CompositorRenderer trait's `create_texture_from_dmabuf` is used.
        // Instead, DmabufImporter might be responsible for format negotiation or
        // holding state related to dmabuf capabilities.
        // For now, let's return an error indicating it's not fully implemented here.
        Err(CompositorError::FeatureUnavailable(
            "DMABUF import logic is deferred to the active CompositorRenderer. DmabufImporter::import_dmabuf is a placeholder.".to_string()
        ))

        // If DmabufImporter *were* to do it directly (less likely with the trait design):
        // let egl_display = ...; // Get EGL display
        // let gles_texture = Gles2Texture::from_dmabuf(egl_display, dmabuf, Gles2TextureFlags::empty())
        //     .map_err(|e| CompositorError::DmabufImportFailed(format!("GLES2 DMABUF import: {:?}", e)))?;
        // Ok(AllocatedBuffer {
        //     texture: Arc::new(gles_texture), // Assuming Gles2Texture is Arc-able or cloneable into Arc
        //     width: dmabuf.width() as u32,
        //     height: dmabuf.height() as u32,
        // })
    }

    // TODO: Add methods for format negotiation if the DmabufImporter becomes responsible for it.
    // pub fn supported_formats(&self) -> Vec<Fourcc> { ... }
}
