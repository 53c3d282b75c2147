pub mod xkb_config;
pub use xkb_config::XkbKeyboardData;

pub mod key_event_translator;
pub use key_event_translator::handle_keyboard_key_event;

pub mod focus;
pub use focus::set_keyboard_focus;
