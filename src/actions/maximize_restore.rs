use crate::events::{StateChange, WindowId, WmStateFlag};
use crate::services::windowing::WindowingProtocol;
use tracing::{debug, warn};

const MAXIMIZED: [WmStateFlag; 2] = [WmStateFlag::MaximizedVert, WmStateFlag::MaximizedHorz];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaximizeMode {
    Toggle,
    Maximize,
    Restore,
}

impl MaximizeMode {
    pub fn from_settings(settings: &str) -> Self {
        match settings.trim() {
            "TOGGLE" => MaximizeMode::Toggle,
            "MAXIMIZE" => MaximizeMode::Maximize,
            "RESTORE" => MaximizeMode::Restore,
            other => {
                warn!(
                    "Некорректные настройки MAXIMIZE_RESTORE_WINDOW '{}', используется TOGGLE",
                    other
                );
                MaximizeMode::Toggle
            }
        }
    }

    /// Какое изменение нужно окну в текущем состоянии
    pub fn change_for(&self, maximized: bool) -> Option<StateChange> {
        let toward = if maximized { StateChange::Remove } else { StateChange::Add };
        match self {
            MaximizeMode::Toggle => Some(toward),
            MaximizeMode::Maximize if !maximized => Some(StateChange::Add),
            MaximizeMode::Restore if maximized => Some(StateChange::Remove),
            _ => None,
        }
    }
}

/// Развернуть/восстановить окно по `_NET_WM_STATE`
pub fn execute(protocol: &dyn WindowingProtocol, window: WindowId, mode: MaximizeMode) {
    let state = match protocol.window_state(window) {
        Ok(state) => state,
        Err(e) => {
            warn!("Не удалось прочитать состояние окна {}: {}", window, e);
            return;
        }
    };
    let maximized = MAXIMIZED.iter().all(|flag| state.contains(flag));

    let Some(change) = mode.change_for(maximized) else {
        debug!("Окно {} уже в нужном состоянии ({:?})", window, mode);
        return;
    };

    if let Err(e) = protocol.request_state_change(window, &MAXIMIZED, change) {
        warn!("Не удалось изменить состояние окна {}: {}", window, e);
    }
}
