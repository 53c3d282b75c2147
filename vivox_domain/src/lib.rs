// Module declarations will be added here as components are built.
// For now, it can be empty or just declare the modules:
pub mod user;
pub mod channel;
pub mod events;
pub mod repositories;
pub mod services;
pub mod error;
