// novade-system/src/input/libinput_handler.rs

use anyhow::{Result, Context};
use smithay::backend::input::{InputEvent, LibinputInputBackend, SeatName};
use calloop::{LoopHandle, Interest, PostAction, RegistrationToken};
use calloop::source::PollOnce; // For direct polling if not using as regular event source
use std::path::PathBuf; // May not be needed if not using Udev or direct session here

use crate::compositor::core::state::DesktopState; // To potentially dispatch events

// Forward declare other input modules if they are created and used by this handler
// pub mod input_dispatcher;
// pub mod keyboard_layout;

/// Manages the Libinput backend for input event processing.
pub struct NovadeLibinputManager {
    pub backend: LibinputInputBackend,
    // reg_token: Option<RegistrationToken>, // If registered as a persistent source
}

impl NovadeLibinputManager {
    /// Creates a new `NovadeLibinputManager`.
    ///
    /// # Arguments
    ///
    /// * `seat_name`: The name of the seat this libinput backend is associated with.
    ///                This must match the seat name provided to `Seat::new_wl_seat`.
    ///
    /// # Errors
    ///
    /// Returns an error if `LibinputInputBackend` fails to initialize or
    /// link to the specified seat.
    pub fn new(seat_name: &str) -> Result<Self> {
        // Initialize LibinputInputBackend.
        // The `None::<fn(_)>` argument means we are not providing a specific
        // logger function to libinput, it will use its default or stderr.
        // For a production compositor, integrating with a session manager (libseat, logind)
        // would be done here, potentially using UdevBackend or DirectSession from Smithay.
        // For now, this basic setup is similar to what was in main.rs.
        let mut libinput_backend = LibinputInputBackend::new(None::<fn(_)>)
            .context("Failed to initialize LibinputInputBackend")?;

        // Link the libinput backend to the specified seat name.
        // This is crucial for Smithay to correctly associate input events.
        // If this fails, input events might not be routed correctly or at all.
        libinput_backend.link_seat(seat_name)
            .map_err(|e| anyhow::anyhow!("Failed to link libinput backend to seat '{}': {}", seat_name, e))?;

        tracing::info!("NovadeLibinputManager initialized and linked to seat: {}", seat_name);
        Ok(Self {
            backend: libinput_backend,
            // reg_token: None,
        })
    }

    /// Prepares the libinput backend as a Calloop event source.
    ///
    /// The returned `LibinputInputBackend` can be inserted into a Calloop event loop.
    /// The callback provided to `EventLoop::insert_source` will receive `InputEvent`s.
    ///
    /// This method consumes the manager and returns the backend because
    /// `LibinputInputBackend` itself is the event source.
    pub fn into_event_source(self) -> LibinputInputBackend {
        self.backend
    }

    // Alternatively, if we want to keep NovadeLibinputManager around and poll manually,
    // or if it manages more state:
    /*
    pub fn register_event_source(
        &mut self,
        loop_handle: &LoopHandle<'static, DesktopState>,
        // Define how events are dispatched, e.g., via a channel or callback to InputDispatcher
        // For now, assume the caller handles event dispatch from the callback given to insert_source
    ) -> Result<()> {
        // This example shows how one might register it if it were a persistent source.
        // However, LibinputInputBackend itself is typically the source.
        // If we were wrapping a raw FD from libinput, this would be different.

        // This is not the typical way to use LibinputInputBackend with Calloop.
        // Usually, the LibinputInputBackend *is* the source.
        // This method is more of a conceptual placeholder.
        tracing::warn!("register_event_source is conceptual; LibinputInputBackend is the source itself.");
        Ok(())
    }
    */

    // Example of how to process events if polled directly (less common with Calloop integration)
    /*
    pub fn dispatch_new_events(&mut self, desktop_state: &mut DesktopState) -> Result<()> {
        // This is how you might manually poll if not using Calloop's event loop integration.
        // Note: This is generally not how you'd integrate with Calloop for LibinputInputBackend.
        // You'd insert `self.backend` as an event source.
        let source = PollOnce::new(&mut self.backend); // This is not quite right for direct use.
                                                       // LibinputInputBackend implements EventSource directly.

        // The correct way is to insert self.backend into the event loop.
        // This method is just for conceptual understanding of event dispatch.

        // This is a simplified placeholder. The actual event dispatch would involve
        // matching on InputEvent and calling handlers in DesktopState or InputDispatcher.
        // The event processing logic from main.rs (the match statement) will be moved
        // to the InputDispatcher or the callback provided when inserting the libinput source.

        // self.backend.dispatch_new_events(|event| {
        //    desktop_state.process_input_event(event); // Example call
        // })?;
        tracing::warn!("dispatch_new_events is conceptual; use Calloop event source integration.");
        Ok(())
    }
    */
}
