use xkbcommon::xkb; // For key symbols and other xkb types if needed directly

// Consider adding derives for Debug, Clone, PartialEq, Eq, Default as appropriate.
// For state types, Default might be useful. For event types, partial equality might be enough.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyboardState {
    pub modifiers: ModifiersState,
    // We might store a set of currently pressed keys (scancodes or keysyms)
    // For simplicity, let's assume xkbcommon handles most of this internally for now
    // pub pressed_keys: std::collections::HashSet<xkb::Keysym>, // Example
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModifiersState {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub caps_lock: bool,
    pub logo: bool, // Super or Windows key
    // Add other modifiers if necessary (e.g., NumLock)
}

#[derive(Debug, Clone, PartialEq, Default)] // PartialEq might be tricky with f64
pub struct PointerState {
    pub position_absolute: (f64, f64), // Current absolute position if available
    pub position_relative: (f64, f64), // Relative motion since last event
    // Consider using a bitmask or separate booleans for buttons
    pub pressed_buttons: std::collections::HashSet<u32>, // e.g., BTN_LEFT (from linux/input-event-codes.h)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TouchState {
    // Map of touch ID to its current position and state
    pub active_points: std::collections::HashMap<i32, TouchPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TouchPoint {
    pub id: i32,
    pub position: (f64, f64),
    // Add other properties like pressure, orientation if needed
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Keyboard(KeyboardEventInfo),
    PointerMotion(PointerMotionInfo),
    PointerButton(PointerButtonInfo),
    PointerAxis(PointerAxisInfo), // For scroll events
    TouchDown(TouchDownInfo),
    TouchUp(TouchUpInfo),
    TouchMotion(TouchMotionInfo),
    // Potentially others: GestureBegin, GestureUpdate, GestureEnd
}

// --- Detailed Event Info Structs ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardEventInfo {
    pub time_usec: u64, // Timestamp in microseconds
    pub key_code: u32,  // Raw scancode from libinput
    pub key_state: KeyState, // Pressed or Released
    pub keysym: xkb::Keysym, // Translated symbol using xkbcommon
    pub utf8: Option<String>, // UTF-8 string if the keysym translates to a character
    pub modifiers: ModifiersState, // State of modifiers at the time of event
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Pressed,
    Released,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointerMotionInfo {
    pub time_usec: u64,
    pub dx: f64,
    pub dy: f64,
    // Absolute position if available from the event
    // pub abs_x: Option<f64>,
    // pub abs_y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerButtonInfo {
    pub time_usec: u64,
    pub button_code: u32, // e.g., BTN_LEFT
    pub button_state: ButtonState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointerAxisInfo {
    pub time_usec: u64,
    pub horizontal: AxisMovement,
    pub vertical: AxisMovement,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxisMovement {
    pub discrete_steps: i32, // For traditional scroll wheels
    pub continuous_value: f64, // For high-resolution scrolling / trackpads
}

#[derive(Debug, Clone, PartialEq)]
pub struct TouchDownInfo {
    pub time_usec: u64,
    pub slot_id: i32, // Or just id if libinput provides a stable one per point
    pub x: f64,
    pub y: f64,
    // pub pressure: Option<f64>,
    // pub major_axis_size: Option<f64>,
    // pub minor_axis_size: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchUpInfo {
    pub time_usec: u64,
    pub slot_id: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TouchMotionInfo {
    pub time_usec: u64,
    pub slot_id: i32,
    pub x: f64,
    pub y: f64,
    // pub pressure: Option<f64>,
    // pub major_axis_size: Option<f64>,
    // pub minor_axis_size: Option<f64>,
}


// Seat struct and its impl block removed.

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use xkbcommon::xkb; // For Keysym in potential future tests

    // --- KeyboardState and ModifiersState Tests ---
    #[test]
    fn test_keyboard_state_default() {
        let kb_state = KeyboardState::default();
        assert_eq!(kb_state.modifiers, ModifiersState::default());
        // assert!(kb_state.pressed_keys.is_empty()); // If using pressed_keys
    }

    #[test]
    fn test_modifiers_state_default() {
        let mods = ModifiersState::default();
        assert!(!mods.ctrl);
        assert!(!mods.alt);
        assert!(!mods.shift);
        assert!(!mods.caps_lock);
        assert!(!mods.logo);
    }

    #[test]
    fn test_modifiers_state_construction() {
        let mods = ModifiersState {
            ctrl: true,
            alt: false,
            shift: true,
            caps_lock: false,
            logo: true,
        };
        assert!(mods.ctrl);
        assert!(!mods.alt);
        assert!(mods.shift);
        assert!(!mods.caps_lock);
        assert!(mods.logo);
    }

    // --- PointerState Tests ---
    #[test]
    fn test_pointer_state_default() {
        let ptr_state = PointerState::default();
        assert_eq!(ptr_state.position_absolute, (0.0, 0.0));
        assert_eq!(ptr_state.position_relative, (0.0, 0.0));
        assert!(ptr_state.pressed_buttons.is_empty());
    }

    #[test]
    fn test_pointer_state_construction() {
        let mut pressed_buttons = HashSet::new();
        pressed_buttons.insert(272); // BTN_LEFT
        let ptr_state = PointerState {
            position_absolute: (100.0, 200.0),
            position_relative: (1.0, -1.0),
            pressed_buttons,
        };
        assert_eq!(ptr_state.position_absolute, (100.0, 200.0));
        assert_eq!(ptr_state.position_relative, (1.0, -1.0));
        assert!(ptr_state.pressed_buttons.contains(&272));
        assert_eq!(ptr_state.pressed_buttons.len(), 1);
    }

    // --- TouchState and TouchPoint Tests ---
    #[test]
    fn test_touch_state_default() {
        let touch_state = TouchState::default();
        assert!(touch_state.active_points.is_empty());
    }

    #[test]
    fn test_touch_point_construction() {
        let point = TouchPoint {
            id: 1,
            position: (50.0, 75.0),
        };
        assert_eq!(point.id, 1);
        assert_eq!(point.position, (50.0, 75.0));
    }

    #[test]
    fn test_touch_state_with_points() {
        let mut active_points = HashMap::new();
        active_points.insert(0, TouchPoint { id: 0, position: (10.0, 20.0) });
        active_points.insert(1, TouchPoint { id: 1, position: (30.0, 40.0) });

        let touch_state = TouchState { active_points };
        assert_eq!(touch_state.active_points.len(), 2);
        assert_eq!(touch_state.active_points.get(&0).unwrap().position, (10.0, 20.0));
        assert_eq!(touch_state.active_points.get(&1).unwrap().position, (30.0, 40.0));
    }

    // --- InputEvent Enum and Info Structs (Basic Construction) ---
    // These tests primarily check that the structs can be created and fields accessed.
    // Equality tests ensure all fields are compared if PartialEq is derived.

    #[test]
    fn test_keyboard_event_info() {
        let event_info = KeyboardEventInfo {
            time_usec: 1000,
            key_code: 30, // 'a' scancode
            key_state: KeyState::Pressed,
            keysym: xkb::KEY_a,
            utf8: Some("a".to_string()),
            modifiers: ModifiersState::default(),
        };
        let event_info_clone = event_info.clone();
        assert_eq!(event_info, event_info_clone);
        assert_eq!(event_info.keysym, xkb::KEY_a);
    }

    #[test]
    fn test_pointer_motion_info() {
        let event_info = PointerMotionInfo {
            time_usec: 2000,
            dx: 5.0,
            dy: -2.5,
        };
        let event_info_clone = event_info.clone();
        assert_eq!(event_info, event_info_clone);
        assert_eq!(event_info.dx, 5.0);
    }

    #[test]
    fn test_pointer_button_info() {
        let event_info = PointerButtonInfo {
            time_usec: 3000,
            button_code: 272, // BTN_LEFT
            button_state: ButtonState::Pressed,
        };
        let event_info_clone = event_info.clone();
        assert_eq!(event_info, event_info_clone);
        assert_eq!(event_info.button_code, 272);
    }

    #[test]
    fn test_pointer_axis_info() {
        let event_info = PointerAxisInfo {
            time_usec: 4000,
            horizontal: AxisMovement { discrete_steps: 0, continuous_value: 0.0 },
            vertical: AxisMovement { discrete_steps: -1, continuous_value: -15.0 },
        };
        let event_info_clone = event_info.clone();
        assert_eq!(event_info, event_info_clone);
        assert_eq!(event_info.vertical.discrete_steps, -1);
    }


    #[test]
    fn test_touch_down_info() {
        let event_info = TouchDownInfo {
            time_usec: 5000,
            slot_id: 0,
            x: 100.0,
            y: 150.0,
        };
        let event_info_clone = event_info.clone();
        assert_eq!(event_info, event_info_clone);
        assert_eq!(event_info.x, 100.0);
    }

    #[test]
    fn test_touch_up_info() {
        let event_info = TouchUpInfo {
            time_usec: 6000,
            slot_id: 0,
        };
        let event_info_clone = event_info.clone();
        assert_eq!(event_info, event_info_clone);
        assert_eq!(event_info.slot_id, 0);
    }

    #[test]
    fn test_touch_motion_info() {
        let event_info = TouchMotionInfo {
            time_usec: 7000,
            slot_id: 0,
            x: 102.0,
            y: 155.0,
        };
        let event_info_clone = event_info.clone();
        assert_eq!(event_info, event_info_clone);
        assert_eq!(event_info.y, 155.0);
    }

    // Seat tests (test_seat_new, test_seat_clonability_and_equality_if_needed) removed.
}
