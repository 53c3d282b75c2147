//! Software Rendering Module for NovaDE Compositor.
//!
//! This module handles rendering client surfaces to an output, initially using
//! Smithay's `SoftwareRenderer`. It's designed to work with a CPU-accessible
//! framebuffer, such as one provided by `softbuffer` for Winit integration.
//!
//! The current implementation is basic and clears the screen to a solid color.
//! TODO: Implement actual surface rendering using SHM buffers.

#![allow(unused_variables)]
#![allow(dead_code)]

use crate::compositor::state::NovaCompositorState;
use smithay::{
    backend::renderer::{
        damage::OutputDamageTracker,
        element::surface::WaylandSurfaceRenderElement,
        software::SoftwareRenderer,
        Renderer,
    },
    desktop::{Space, Window},
    output::{Mode, Output, PhysicalProperties, Scale},
    reexports::wayland_server::protocol::wl_shm,
    utils::{Point, Rectangle, Transform},
};
use std::collections::HashMap; // Not currently used, but might be for caching render elements.

/// A simple software renderer for a single output, typically a Winit window.
///
/// This renderer uses Smithay's `SoftwareRenderer` to draw client surfaces
/// onto a raw pixel buffer provided by a backend (e.g., `softbuffer`).
///
/// It includes a basic damage tracker, though full damage tracking integration
/// for optimized rendering is a TODO.
pub struct SimpleSoftwareRenderer {
    /// Smithay's core software rendering logic.
    renderer: SoftwareRenderer,
    /// Tracks damage regions on the output to optimize rendering.
    /// TODO: Fully integrate damage tracking into the `render_output` method.
    damage_tracker: OutputDamageTracker,
    /// Logger instance for renderer-specific messages.
    logger: slog::Logger,
}

impl SimpleSoftwareRenderer {
    /// Creates a new `SimpleSoftwareRenderer`.
    ///
    /// Initializes Smithay's `SoftwareRenderer` and a default `OutputDamageTracker`.
    /// The damage tracker is initialized with a placeholder size and will be updated
    /// by calling `resize()` when the output dimensions are known.
    ///
    /// # Arguments
    ///
    /// * `logger`: A `slog::Logger` for logging.
    pub fn new(logger: slog::Logger) -> Self {
        let renderer = SoftwareRenderer::new();

        // Initialize damage tracker with a default size.
        // It should be updated via `resize()` once the actual output dimensions are known.
        let damage_tracker = OutputDamageTracker::new((800, 600), 1.0, Transform::Normal);

        Self {
            renderer,
            damage_tracker,
            logger,
        }
    }

    /// Renders the contents of the provided `Space` to a target pixel buffer.
    ///
    /// This method currently clears the `target_buffer` to a solid grey color.
    /// The actual rendering of window contents (from their SHM buffers) is a TODO.
    ///
    /// # Arguments
    ///
    /// * `space`: The compositor's `Space` containing the windows to render.
    /// * `output`: Smithay's `Output` object representing the display characteristics.
    /// * `target_buffer_age`: Age of the buffer, used for damage tracking (0 means full repaint).
    ///   TODO: Properly use this with `damage_tracker`.
    /// * `target_buffer`: A mutable slice representing the raw pixel buffer to render into.
    ///   The format is assumed to be XRGB8888 (4 bytes per pixel).
    /// * `buffer_width`: Width of the `target_buffer` in pixels.
    /// * `buffer_height`: Height of the `target_buffer` in pixels.
    /// * `buffer_stride`: Stride (bytes per row) of the `target_buffer`.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the rendering (clearing) was successful.
    /// * `Err(smithay::backend::renderer::software::Error)` on rendering failure (not currently possible with clear).
    ///
    /// TODO: Implement full rendering of window surfaces using `SoftwareRenderer::render_shm_buffer`
    ///       or by creating `WaylandSurfaceRenderElement`s and using `Renderer::render_output`.
    /// TODO: Integrate `damage_tracker` to only re-render damaged regions.
    pub fn render_output(
        &mut self,
        space: &Space<Window>,
        output: &Output,
        target_buffer_age: usize,
        target_buffer: &mut [u8],
        buffer_width: u32,
        buffer_height: u32,
        buffer_stride: u32,
    ) -> Result<(), smithay::backend::renderer::software::Error> {

        let output_geometry = Rectangle::from_loc_and_size((0,0), (buffer_width as i32, buffer_height as i32));
        let output_scale = output.current_scale().fractional_scale();

        // 1. Clear the background to solid grey.
        // Assumes XRGB8888 format (B, G, R, X bytes).
        let clear_color = [0x80, 0x80, 0x80, 0xFF]; // BGR_ (Grey)

        for row in 0..buffer_height as usize {
            let row_start = row * buffer_stride as usize;
            for x_pixel in 0..buffer_width as usize {
                let pixel_start = row_start + x_pixel * 4; // 4 bytes per pixel
                if pixel_start + 3 < target_buffer.len() { // Ensure we don't write out of bounds
                    target_buffer[pixel_start + 0] = clear_color[0]; // Blue
                    target_buffer[pixel_start + 1] = clear_color[1]; // Green
                    target_buffer[pixel_start + 2] = clear_color[2]; // Red
                    target_buffer[pixel_start + 3] = clear_color[3]; // Alpha (or X)
                }
            }
        }

        // 2. TODO: Actual rendering of windows from the `space`.
        // This would involve:
        //    a. Iterating `space.elements_for_output(output)`.
        //    b. For each visible `Window`, get its `wl_surface`.
        //    c. Access the surface's SHM buffer using `smithay::wayland::shm::with_buffer_contents`.
        //    d. Use `self.renderer.render_shm_buffer()` or similar to draw the buffer onto
        //       the `target_buffer`, considering window position, transformations, and damage.
        //    e. Alternatively, construct `WaylandSurfaceRenderElement`s and use a generic
        //       `Renderer::render_output` method if available and suitable for `SoftwareRenderer`.

        // Example conceptual loop:
        // for window_element in space.elements_for_output(output) {
        //     let window = window_element.window; // Assuming elements_for_output gives access to Window
        //     if !window.is_mapped() { continue; }
        //     let Some(surface) = window.wl_surface() else { continue; };
        //     if !surface.is_alive() { continue; }
        //     // ... get SHM buffer and call self.renderer.render_shm_buffer(...) ...
        // }

        slog::trace!(self.logger, "Render pass completed (cleared buffer). Implement actual window drawing!");
        Ok(())
    }

    /// Resizes the internal `OutputDamageTracker` when the output dimensions change.
    ///
    /// # Arguments
    ///
    /// * `new_size`: A tuple `(width, height)` representing the new output size in pixels.
    /// * `new_scale`: The new scale factor of the output.
    pub fn resize(&mut self, new_size: (i32, i32), new_scale: f64) {
        // Damage tracker expects physical size and scale.
        self.damage_tracker = OutputDamageTracker::new(new_size, new_scale, Transform::Normal);
        slog::info!(self.logger, "Renderer damage tracker resized to {:?}, scale {}", new_size, new_scale);
    }
}
```
