// nova_shell/src/background.rs
use tracing::info;

pub struct BackgroundManager {}

impl BackgroundManager {
    pub fn new() -> Self {
        info!("Initializing BackgroundManager component");
        Self {}
    }

    pub fn set_wallpaper(&self, path: &str) {
        info!("Setting wallpaper (placeholder): {}", path);
    }
}
