//! The executor-facing operation vocabulary. A dynamically-typed "do this"
//! record in the original design becomes a tagged sum type here; the
//! executor matches on it exhaustively instead of dispatching by string tag.

use super::types::Maximized;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    MoveToMonitor(i32),
    MoveToWorkspace(i32),
    Place(i32, i32, u32, u32),
    Move(i32, i32),
    Maximize(Maximized),
    Unmaximize,
    Minimize,
    SetFullscreen(bool),
    ToggleFullscreen,
    SetOnAllWorkspaces(bool),
    SetAbove(bool),
    Close(bool),
}
