use serde::{Deserialize, Serialize};
use std::fmt;

/// Тег типа действия, привязываемый к экземпляру при создании
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    #[default]
    NoAction,
    MouseClick,
    MaximizeRestoreWindow,
    MinimizeWindow,
    CloseWindow,
    RunCommand,
}

impl ActionType {
    /// Действие требует окна-цели
    pub fn targets_window(&self) -> bool {
        matches!(
            self,
            ActionType::MaximizeRestoreWindow | ActionType::MinimizeWindow | ActionType::CloseWindow
        )
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionType::NoAction => "NO_ACTION",
            ActionType::MouseClick => "MOUSE_CLICK",
            ActionType::MaximizeRestoreWindow => "MAXIMIZE_RESTORE_WINDOW",
            ActionType::MinimizeWindow => "MINIMIZE_WINDOW",
            ActionType::CloseWindow => "CLOSE_WINDOW",
            ActionType::RunCommand => "RUN_COMMAND",
        };
        f.write_str(name)
    }
}
