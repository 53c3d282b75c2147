// Declare modules
pub mod types;
pub mod traits;
pub mod default_service;

// Re-export key items
pub use types::StdioProcess;
pub use traits::IMCPClientService;
pub use default_service::DefaultMCPClientService;
