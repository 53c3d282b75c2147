// novade-ui/src/system_health_dashboard/overview_panel.rs
// Displays a summary of system health: key metrics, active alert count.
// Interacts with SystemHealthViewModel to get data.

// #[cfg(feature = "gtk")]
// use gtk::prelude::*;
// #[cfg(feature = "gtk")]
// use gtk::{Box as GtkBox, Label, Orientation}; // Renamed Box to GtkBox to avoid conflict

// use std::sync::Arc;
// use tokio::sync::Mutex;
// use super::view_model::SystemHealthViewModel;

pub struct OverviewPanel {
    // view_model: Arc<Mutex<SystemHealthViewModel>>,
    // Placeholder for UI elements like labels for CPU usage, memory, alert count etc.
    // cpu_usage_label: Option<Label>,
    // memory_usage_label: Option<Label>,
    // active_alerts_label: Option<Label>,
    // container: Option<GtkBox>,
}

impl OverviewPanel {
    // pub fn new(view_model: Arc<Mutex<SystemHealthViewModel>>) -> Self {
    pub fn new() -> Self { // Simplified for now
        println!("UI: OverviewPanel created (placeholder).");
        // Self { view_model, cpu_usage_label: None, memory_usage_label: None, active_alerts_label: None, container: None }
        Self {}
    }

    // #[cfg(feature = "gtk")]
    // pub fn get_widget(&mut self) -> &GtkBox {
    //     if self.container.is_none() {
    //         let container = GtkBox::new(Orientation::Vertical, 5);
    //         let title_label = Label::new(Some("Overview Panel (Placeholder)"));
    //         container.append(&title_label);
    //
    //         // Initialize and add specific labels
    //         let cpu_label = Label::new(Some("CPU: N/A"));
    //         container.append(&cpu_label);
    //         self.cpu_usage_label = Some(cpu_label);
    //         // ... and so on for other labels
    //
    //         self.container = Some(container);
    //         // TODO: Add logic to subscribe to ViewModel updates and refresh labels
    //     }
    //     self.container.as_ref().expect("Container should be initialized")
    // }
}

// The println! statement from the prompt is not part of the file content itself,
// but rather an action to be performed when the file is processed by the build system or similar.
// For a direct file creation, it's better to have it as a print during struct instantiation or similar,
// which I've done in the new() method.
