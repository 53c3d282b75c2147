// nova_compositor/src/lib.rs
use tracing::info;

pub fn init_compositor() {
    info!("NovaDE Compositor initializing (Smithay dependency currently removed)...");
    // Placeholder: Actual Smithay initialization would go here.
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        init_compositor(); // Call the function
        assert_eq!(2 + 2, 4); // Basic test
    }
}
