use serde::{Deserialize, Serialize};
use std::fmt;

/// Тип распознанного жеста
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GestureType {
    Tap,
    Drag,
    Pinch,
    Rotate,
    DoubleTap,
    TapAndHold,
}

impl fmt::Display for GestureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GestureType::Tap => "TAP",
            GestureType::Drag => "DRAG",
            GestureType::Pinch => "PINCH",
            GestureType::Rotate => "ROTATE",
            GestureType::DoubleTap => "DOUBLE_TAP",
            GestureType::TapAndHold => "TAP_AND_HOLD",
        };
        f.write_str(name)
    }
}

/// Направление жеста
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GestureDirection {
    NoDirection,
    #[default]
    All,
    Up,
    Down,
    Left,
    Right,
    In,
    Out,
}

impl fmt::Display for GestureDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GestureDirection::NoDirection => "NO_DIRECTION",
            GestureDirection::All => "ALL",
            GestureDirection::Up => "UP",
            GestureDirection::Down => "DOWN",
            GestureDirection::Left => "LEFT",
            GestureDirection::Right => "RIGHT",
            GestureDirection::In => "IN",
            GestureDirection::Out => "OUT",
        };
        f.write_str(name)
    }
}

/// Фаза жизненного цикла жеста
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GesturePhase {
    Created,
    Started,
    Updated,
    Finished,
}
