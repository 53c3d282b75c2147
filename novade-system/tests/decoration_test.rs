use std::sync::Arc;
use novade_system::compositor;

#[tokio::test]
async fn test_decoration_mode_negotiation() {
    // 1. Start a compositor instance
    // This is the tricky part. We need to run the compositor in a separate thread.
    // For now, I'll just initialize it.
    let compositor_state = compositor::initialize_compositor().await.unwrap();

    // 2. Start a simple Wayland client
    // This requires a Wayland client library. I'll use `wayland-client`.
    // I'll need to add it to the dev-dependencies in novade-system/Cargo.toml.

    // 3. The client creates a window and requests decoration mode.

    // 4. Check if the compositor sends the correct decoration mode.
    // This would involve checking the D-Bus signal or some other mechanism.

    // For now, this test is just a placeholder.
    assert!(true);
}
