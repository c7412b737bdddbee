use crate::error::Result;
use crate::events::{StateChange, WindowId, WmStateFlag};
use crate::touchd_error;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::info;

use super::{WindowState, WindowingProtocol};

/// Корень эмулируемого рабочего стола
pub const DEMO_ROOT: WindowId = WindowId(0x1);
/// Рамка окна, прямой потомок корня
pub const DEMO_FRAME: WindowId = WindowId(0x100);
/// Клиентское окно, которое видит оконный менеджер
pub const DEMO_CLIENT: WindowId = WindowId(0x101);
/// Дочернее input-only окно, о котором сообщают события жестов
pub const DEMO_CHILD: WindowId = WindowId(0x102);

/// Запрос к оконной системе, записанный dry-run бэкендом
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolRequest {
    StateChange {
        window: WindowId,
        flags: Vec<WmStateFlag>,
        change: StateChange,
    },
    Minimize(WindowId),
    Close(WindowId),
    Click(u8),
}

#[derive(Debug, Default)]
struct Desktop {
    parents: HashMap<WindowId, WindowId>,
    classes: HashMap<WindowId, String>,
    states: HashMap<WindowId, WindowState>,
    stacking: Vec<WindowId>,
    #[cfg(test)]
    requests: Vec<ProtocolRequest>,
}

/// Эмуляция оконной системы в памяти. Окна без записи о родителе считаются
/// недоступными для запроса, как удалённые окна в X11.
pub struct DryRunProtocol {
    root: WindowId,
    desktop: Mutex<Desktop>,
}

impl DryRunProtocol {
    pub fn new(root: WindowId) -> Self {
        Self {
            root,
            desktop: Mutex::new(Desktop::default()),
        }
    }

    /// Рабочий стол с одним приложением `DryRun`
    pub fn demo() -> Self {
        Self::new(DEMO_ROOT)
            .with_window(DEMO_FRAME, DEMO_ROOT, None)
            .with_window(DEMO_CLIENT, DEMO_FRAME, Some("DryRun"))
            .with_window(DEMO_CHILD, DEMO_CLIENT, None)
            .with_stacking(vec![DEMO_CLIENT])
    }

    pub fn with_window(self, window: WindowId, parent: WindowId, class: Option<&str>) -> Self {
        {
            let mut desktop = self.desktop.lock();
            desktop.parents.insert(window, parent);
            if let Some(class) = class {
                desktop.classes.insert(window, class.to_string());
            }
        }
        self
    }

    pub fn with_stacking(self, stacking: Vec<WindowId>) -> Self {
        self.desktop.lock().stacking = stacking;
        self
    }

    #[cfg(test)]
    pub fn with_state(self, window: WindowId, flags: &[WmStateFlag]) -> Self {
        self.desktop.lock().states.insert(window, flags.iter().copied().collect());
        self
    }

    /// Все запросы на изменение, в порядке поступления
    #[cfg(test)]
    pub fn requests(&self) -> Vec<ProtocolRequest> {
        self.desktop.lock().requests.clone()
    }

    #[cfg(test)]
    fn record(&self, request: ProtocolRequest) {
        self.desktop.lock().requests.push(request);
    }

    fn ensure_known(desktop: &Desktop, root: WindowId, window: WindowId) -> Result<()> {
        if window == root || desktop.parents.contains_key(&window) {
            Ok(())
        } else {
            Err(touchd_error!(protocol, "BadWindow: {}", window))
        }
    }
}

impl WindowingProtocol for DryRunProtocol {
    fn root_window(&self) -> Result<WindowId> {
        Ok(self.root)
    }

    fn parent_of(&self, window: WindowId) -> Result<Option<WindowId>> {
        if window == self.root {
            return Ok(None);
        }
        let desktop = self.desktop.lock();
        desktop
            .parents
            .get(&window)
            .copied()
            .map(Some)
            .ok_or_else(|| touchd_error!(protocol, "BadWindow: {}", window))
    }

    fn stacking_order(&self) -> Result<Vec<WindowId>> {
        Ok(self.desktop.lock().stacking.clone())
    }

    fn class_hint(&self, window: WindowId) -> Result<Option<String>> {
        let desktop = self.desktop.lock();
        Self::ensure_known(&desktop, self.root, window)?;
        Ok(desktop.classes.get(&window).cloned())
    }

    fn window_state(&self, window: WindowId) -> Result<WindowState> {
        let desktop = self.desktop.lock();
        Self::ensure_known(&desktop, self.root, window)?;
        Ok(desktop.states.get(&window).cloned().unwrap_or_default())
    }

    fn request_state_change(
        &self,
        window: WindowId,
        flags: &[WmStateFlag],
        change: StateChange,
    ) -> Result<()> {
        {
            let mut desktop = self.desktop.lock();
            Self::ensure_known(&desktop, self.root, window)?;
            info!("[DRY RUN] {:?} {:?} для окна {}", change, flags, window);

            let state = desktop.states.entry(window).or_default();
            match change {
                StateChange::Add => {
                    for flag in flags {
                        if !state.contains(flag) {
                            state.push(*flag);
                        }
                    }
                }
                StateChange::Remove => state.retain(|flag| !flags.contains(flag)),
            }
        }
        #[cfg(test)]
        self.record(ProtocolRequest::StateChange {
            window,
            flags: flags.to_vec(),
            change,
        });
        Ok(())
    }

    fn minimize(&self, window: WindowId) -> Result<()> {
        Self::ensure_known(&self.desktop.lock(), self.root, window)?;
        info!("[DRY RUN] Сворачивание окна {}", window);
        #[cfg(test)]
        self.record(ProtocolRequest::Minimize(window));
        Ok(())
    }

    fn close(&self, window: WindowId) -> Result<()> {
        Self::ensure_known(&self.desktop.lock(), self.root, window)?;
        info!("[DRY RUN] Закрытие окна {}", window);
        #[cfg(test)]
        self.record(ProtocolRequest::Close(window));
        Ok(())
    }

    fn click(&self, button: u8) -> Result<()> {
        info!("[DRY RUN] Клик кнопкой {}", button);
        #[cfg(test)]
        self.record(ProtocolRequest::Click(button));
        Ok(())
    }
}
