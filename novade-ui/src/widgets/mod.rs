// novade-ui/src/widgets/mod.rs
pub mod basic_widget;
pub mod notification_popup;
pub mod window_decoration;
pub use notification_popup::NotificationPopupWidget;
pub use window_decoration::WindowDecoration;
