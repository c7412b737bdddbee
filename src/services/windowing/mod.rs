//! Windowing protocol: responsibility and boundaries
//!
//! This module is a thin, blocking query/command layer over the window system.
//! It MUST NOT decide anything about gestures or actions. Backends report
//! failures as `Err`; callers on the dispatch path (WindowResolver, actions)
//! turn them into "no information" and never propagate them further.

mod dry_run;
mod x11_tools;

pub use self::dry_run::{DryRunProtocol, DEMO_CHILD};
#[cfg(test)]
pub use self::dry_run::{ProtocolRequest, DEMO_CLIENT};
pub use self::x11_tools::X11ToolsProtocol;

use crate::error::Result;
use crate::events::{StateChange, WindowId, WmStateFlag};
use smallvec::SmallVec;
use std::sync::Arc;

/// Набор флагов `_NET_WM_STATE` окна
pub type WindowState = SmallVec<[WmStateFlag; 4]>;

/// Блокирующие вызовы к оконной системе
pub trait WindowingProtocol: Send + Sync {
    fn root_window(&self) -> Result<WindowId>;

    /// Родитель окна; `Ok(None)` у корня
    fn parent_of(&self, window: WindowId) -> Result<Option<WindowId>>;

    /// Окна, отслеживаемые оконным менеджером, от переднего к заднему
    fn stacking_order(&self) -> Result<Vec<WindowId>>;

    /// Класс из `WM_CLASS`; `Ok(None)`, если подсказка не установлена
    fn class_hint(&self, window: WindowId) -> Result<Option<String>>;

    fn window_state(&self, window: WindowId) -> Result<WindowState>;

    fn request_state_change(
        &self,
        window: WindowId,
        flags: &[WmStateFlag],
        change: StateChange,
    ) -> Result<()>;

    fn minimize(&self, window: WindowId) -> Result<()>;

    fn close(&self, window: WindowId) -> Result<()>;

    fn click(&self, button: u8) -> Result<()>;
}

/// Factory function to create an appropriate windowing backend based on the dry_run flag
pub fn create_windowing_protocol(dry_run: bool) -> Arc<dyn WindowingProtocol> {
    if dry_run {
        Arc::new(DryRunProtocol::demo())
    } else {
        Arc::new(X11ToolsProtocol::new())
    }
}
