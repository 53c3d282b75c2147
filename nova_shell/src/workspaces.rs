// nova_shell/src/workspaces.rs
use tracing::info;

pub struct WorkspaceManager {
    current_workspace: u32,
    total_workspaces: u32,
}

impl WorkspaceManager {
    pub fn new() -> Self {
        info!("Initializing WorkspaceManager component");
        Self {
            current_workspace: 1,
            total_workspaces: 4, // Default
        }
    }

    pub fn switch_to(&mut self, workspace_id: u32) {
        info!("Switching to workspace (placeholder): {}", workspace_id);
        self.current_workspace = workspace_id;
    }
}
