// novade-ui/src/system_health_dashboard/log_viewer_panel.rs
// Provides UI for viewing, filtering, and searching log entries.
// Uses SystemHealthViewModel to fetch/stream logs.

// #[cfg(feature = "gtk")]
// use gtk::prelude::*;
// #[cfg(feature = "gtk")]
// use gtk::{Box as GtkBox, ScrolledWindow, TextView, Entry, Orientation, Button};

// use std::sync::Arc;
// use tokio::sync::Mutex;
// use super::view_model::SystemHealthViewModel;
// use novade_core::types::system_health::LogFilter; // For filter controls

pub struct LogViewerPanel {
    // view_model: Arc<Mutex<SystemHealthViewModel>>,
    // Placeholder for UI elements
    // log_text_view: Option<TextView>,
    // filter_entry: Option<Entry>,
    // container: Option<GtkBox>,
}

impl LogViewerPanel {
    // pub fn new(view_model: Arc<Mutex<SystemHealthViewModel>>) -> Self {
    pub fn new() -> Self { // Simplified for now
        println!("UI: LogViewerPanel created (placeholder).");
        // Self { view_model, container: None /*, initialize other fields */ }
        Self {}
    }

    // #[cfg(feature = "gtk")]
    // pub fn get_widget(&mut self) -> &GtkBox {
    //     if self.container.is_none() {
    //         let container = GtkBox::new(Orientation::Vertical, 5);
    //         let title_label = gtk::Label::new(Some("Log Viewer Panel (Placeholder)"));
    //         container.append(&title_label);
    //
    //         // Filter controls
    //         let filter_box = GtkBox::new(Orientation::Horizontal, 5);
    //         let filter_entry = Entry::new();
    //         filter_entry.set_placeholder_text(Some("Filter logs..."));
    //         self.filter_entry = Some(filter_entry.clone());
    //         filter_box.append(&filter_entry);
    //         let apply_button = Button::with_label("Apply Filter");
    //         // apply_button.connect_clicked(glib::clone!(@weak self as panel => move |_| {
    //         //    panel.apply_log_filter();
    //         // }));
    //         filter_box.append(&apply_button);
    //         container.append(&filter_box);
    //
    //         // Log display area
    //         let scrolled_window = ScrolledWindow::new();
    //         scrolled_window.set_vexpand(true);
    //         let text_view = TextView::builder()
    //             .editable(false)
    //             .cursor_visible(false)
    //             .build();
    //         scrolled_window.set_child(Some(&text_view));
    //         self.log_text_view = Some(text_view);
    //         container.append(&scrolled_window);
    //
    //         self.container = Some(container);
    //         // TODO: Add logic to fetch/stream logs via ViewModel and update TextView
    //     }
    //     self.container.as_ref().expect("Container should be initialized")
    // }

    // fn apply_log_filter(&self) {
    //    if let (Some(entry), Some(vm_arc)) = (&self.filter_entry, &self.view_model) {
    //        let filter_text = entry.text().to_string();
    //        let vm = vm_arc.clone();
    //        tokio::spawn(async move {
    //            let mut vm_guard = vm.lock().await;
    //            // This is conceptual. Actual filter creation would be more complex.
    //            let filter = LogFilter { keywords: Some(vec![filter_text]), ..Default::default() };
    //            // vm_guard.set_log_filter_and_reload(filter).await;
    //            println!("UI: Applying log filter (placeholder): {:?}", filter);
    //        });
    //    }
    // }
}
