// novade-ui/src/system_health_dashboard/main_view.rs

// This would be the main widget/component for the System Health Dashboard.
// It will compose other panels (overview, metrics, logs, diagnostics, alerts).
// The actual UI implementation (e.g., using GTK, iced, or another toolkit)
// would happen here or be delegated to a UI builder.

// For now, a placeholder struct.
// It would likely hold instances of the ViewModel and sub-panels.

// #[cfg(feature = "gtk")] // Example if using GTK and feature flags
// use gtk::prelude::*;
// #[cfg(feature = "gtk")]
// use gtk::{Box, Orientation, Label};

use std::sync::Arc;
use tokio::sync::Mutex; // Changed from RwLock to Mutex as ViewModels often involve sequential operations or interior mutability patterns that Mutex handles well.
use super::view_model::SystemHealthViewModel;
// Import panel structs once they are defined
// use super::overview_panel::OverviewPanel;
// use super::metrics_panel::MetricsPanel;
// use super::log_viewer_panel::LogViewerPanel;
// use super::diagnostics_panel::DiagnosticsPanel;
// use super::alerts_panel::AlertsPanel;


pub struct SystemHealthDashboardMainView {
    view_model: Arc<Mutex<SystemHealthViewModel>>,
    // Placeholder for actual UI elements or structs representing them
    // overview_panel_widget: OverviewPanel,
    // metrics_panel_widget: MetricsPanel,
    // log_viewer_panel_widget: LogViewerPanel,
    // diagnostics_panel_widget: DiagnosticsPanel,
    // alerts_panel_widget: AlertsPanel,
    // ui_container: Option<gtk::Box> // Example for GTK
}

impl SystemHealthDashboardMainView {
    pub fn new(view_model: Arc<Mutex<SystemHealthViewModel>>) -> Self {
        println!("UI: SystemHealthDashboardMainView created (placeholder).");
        // In a real UI, you would:
        // 1. Instantiate the panel structs (OverviewPanel::new(view_model.clone()), etc.)
        // 2. Create the main UI container (e.g., a GTKBox or an Iced Element).
        // 3. Add the panel widgets to this container.
        // 4. Store the container if needed, or return it directly via a method.
        Self {
            view_model,
            // overview_panel_widget: OverviewPanel::new(view_model.clone()), // Example
            // ... instantiate other panels ...
            // ui_container: None, // Initialize appropriately
        }
    }

    // This method would be called to construct and get the actual UI widget.
    // The exact signature and return type depend on the UI toolkit.
    // Example for a conceptual UI toolkit:
    // pub fn build_ui(&mut self) -> impl Widget {
    //     // ... layout panels ...
    // }

    // Placeholder for a method that would return the main widget to be added to the app's UI
    // #[cfg(feature = "gtk")]
    // pub fn get_widget(&mut self) -> &gtk::Box {
    //     if self.ui_container.is_none() {
    //         let container = Box::new(Orientation::Vertical, 5);
    //         container.append(&Label::new(Some("System Health Dashboard (Main View Placeholder)")));
    //
    //         // Example: Adding an overview panel's widget
    //         // let overview_widget = self.overview_panel_widget.get_widget();
    //         // container.append(&overview_widget);
    //
    //         // ... add other panel widgets to container ...
    //         self.ui_container = Some(container);
    //     }
    //     self.ui_container.as_ref().expect("UI container should be initialized")
    // }

    #[allow(dead_code)]
    fn print_message(&self, message: &str) {
        // In a real application, this would interact with the UI,
        // perhaps by updating a status bar or logging to a UI console.
        println!("[SystemHealthDashboardMainView]: {}", message);
    }
}
