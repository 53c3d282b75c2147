// novade-system/src/compositor/backend/drm_backend.rs

use anyhow::{Result, anyhow};
use calloop::LoopHandle;
use smithay::reexports::wayland_server::DisplayHandle;

use crate::compositor::state::DesktopState;
use super::CompositorBackend; // Super refers to novade-system/src/compositor/backend/mod.rs

pub struct DrmBackend {
    event_loop_handle: LoopHandle<'static, DesktopState>,
    // display_handle: DisplayHandle, // Store if needed for run()
    // Add DRM specific fields here later, e.g.:
    // session: Option<DirectSession>, // Or SessionNotifier from smithay::backend::session
    // drm_device: Option<DrmDevice<GbmAllocator<DrmDeviceFd>>>, // Example with GBM
    // drm_event_loop: Option<DrmEventLoop<...>>,
    // input_backend: Option<LibinputInputBackend>,
}

impl CompositorBackend for DrmBackend {
    fn init(
        event_loop_handle: LoopHandle<'static, DesktopState>,
        _display_handle: DisplayHandle, // Mark as unused for now
        _desktop_state: &mut DesktopState, // Mark as unused for now
    ) -> Result<Self>
    where
        Self: Sized,
    {
        tracing::info!("Initializing DRM backend (Placeholder)...");
        // Full DRM initialization is complex and involves:
        // 1. Opening a session (e.g., with libseat or systemd-logind).
        // 2. Finding a suitable DRM device.
        // 3. Creating a DrmDevice and DrmGraphicsBackend (e.g., Gbm).
        // 4. Initializing a renderer (e.g., Egl, Wgpu).
        // 5. Setting up input (e.g., LibinputInputBackend).
        // For now, this is a placeholder.
        tracing::warn!("DRM backend is a placeholder and not functional.");
        Ok(DrmBackend {
            event_loop_handle,
            // display_handle,
        })
    }

    fn run(self, _desktop_state: &mut DesktopState) -> Result<()> {
        tracing::info!("Running DRM backend event loop (Placeholder)...");
        // The actual DRM run loop would involve:
        // - Dispatching events from the DrmEventLoop.
        // - Dispatching events from the LibinputInputBackend.
        // - Handling session events.
        // - Performing rendering on DRM CRTCs.
        // This will likely involve `self.event_loop_handle.run(...)` if this backend
        // directly owns and runs a new event loop, or it inserts sources into the
        // main event loop passed in `init`. Smithay examples vary.
        // For now, it does nothing and returns an error.
        Err(anyhow!("DRM backend is a placeholder and cannot be run."))
    }

    fn loop_handle(&self) -> LoopHandle<'static, DesktopState> {
        self.event_loop_handle.clone()
    }
}
