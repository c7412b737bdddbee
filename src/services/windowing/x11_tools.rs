use crate::error::Result;
use crate::events::{StateChange, WindowId, WmStateFlag};
use crate::touchd_error;
use once_cell::sync::OnceCell;
use std::process::Command;
use tracing::debug;

use super::{WindowState, WindowingProtocol};

/// Бэкенд X11 через утилиты `xwininfo`, `xprop`, `wmctrl` и `xdotool`
pub struct X11ToolsProtocol {
    root: OnceCell<WindowId>,
}

impl Default for X11ToolsProtocol {
    fn default() -> Self {
        Self::new()
    }
}

impl X11ToolsProtocol {
    pub fn new() -> Self {
        Self {
            root: OnceCell::new(),
        }
    }

    fn run_tool(program: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(program).args(args).output().map_err(|e| {
            debug!("{} не найден или не работает: {}", program, e);
            touchd_error!(protocol, "{} не найден: {}", program, e)
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("{} {:?} вернул ошибку: {}", program, args, stderr.trim());
            return Err(touchd_error!(protocol, "{} вернул ошибку: {}", program, stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl WindowingProtocol for X11ToolsProtocol {
    fn root_window(&self) -> Result<WindowId> {
        self.root
            .get_or_try_init(|| {
                let output = Self::run_tool("xwininfo", &["-root"])?;
                parse_window_id_line(&output, "Window id:")
                    .ok_or_else(|| touchd_error!(protocol, "xwininfo не сообщил id корневого окна"))
            })
            .copied()
    }

    fn parent_of(&self, window: WindowId) -> Result<Option<WindowId>> {
        let id = window.to_string();
        let output = Self::run_tool("xwininfo", &["-children", "-id", &id])?;
        match parse_window_id_line(&output, "Parent window id:") {
            Some(WindowId(0)) => Ok(None),
            Some(parent) => Ok(Some(parent)),
            None => Err(touchd_error!(protocol, "xwininfo не сообщил родителя окна {}", window)),
        }
    }

    fn stacking_order(&self) -> Result<Vec<WindowId>> {
        let output = Self::run_tool("xprop", &["-root", "_NET_CLIENT_LIST_STACKING"])?;
        let mut windows = parse_window_list(&output).ok_or_else(|| {
            touchd_error!(protocol, "_NET_CLIENT_LIST_STACKING недоступен")
        })?;
        // EWMH хранит порядок снизу вверх
        windows.reverse();
        Ok(windows)
    }

    fn class_hint(&self, window: WindowId) -> Result<Option<String>> {
        let id = window.to_string();
        let output = Self::run_tool("xprop", &["-id", &id, "WM_CLASS"])?;
        Ok(parse_wm_class(&output))
    }

    fn window_state(&self, window: WindowId) -> Result<WindowState> {
        let id = window.to_string();
        let output = Self::run_tool("xprop", &["-id", &id, "_NET_WM_STATE"])?;
        Ok(parse_wm_state(&output))
    }

    fn request_state_change(
        &self,
        window: WindowId,
        flags: &[WmStateFlag],
        change: StateChange,
    ) -> Result<()> {
        let id = window.to_string();
        // wmctrl принимает не более двух свойств за вызов
        for chunk in flags.chunks(2) {
            let mut property = change.wmctrl_verb().to_string();
            for flag in chunk {
                property.push(',');
                property.push_str(flag.wmctrl_name());
            }
            Self::run_tool("wmctrl", &["-i", "-r", &id, "-b", &property])?;
        }
        Ok(())
    }

    fn minimize(&self, window: WindowId) -> Result<()> {
        let id = window.value().to_string();
        Self::run_tool("xdotool", &["windowminimize", &id]).map(|_| ())
    }

    fn close(&self, window: WindowId) -> Result<()> {
        let id = window.to_string();
        Self::run_tool("wmctrl", &["-i", "-c", &id]).map(|_| ())
    }

    fn click(&self, button: u8) -> Result<()> {
        let button = button.to_string();
        Self::run_tool("xdotool", &["click", &button]).map(|_| ())
    }
}

/// Найти строку вида `<label> 0x1e1 (...)` и вернуть id
fn parse_window_id_line(output: &str, label: &str) -> Option<WindowId> {
    output.lines().find_map(|line| {
        let (_, rest) = line.split_once(label)?;
        rest.split_whitespace().next().and_then(WindowId::parse)
    })
}

/// `_NET_CLIENT_LIST_STACKING(WINDOW): window id # 0x1400003, 0x1a00004`
fn parse_window_list(output: &str) -> Option<Vec<WindowId>> {
    let line = output.lines().next()?;
    if line.contains("not found") || line.contains("no such atom") {
        return None;
    }
    let Some((_, ids)) = line.split_once('#') else {
        return Some(Vec::new());
    };
    Some(ids.split(',').filter_map(WindowId::parse).collect())
}

/// `WM_CLASS(STRING) = "navigator", "firefox"`: класс приложения вторая строка
fn parse_wm_class(output: &str) -> Option<String> {
    let (_, values) = output.lines().next()?.split_once('=')?;
    let strings: Vec<&str> = values
        .split('"')
        .enumerate()
        .filter(|(i, _)| i % 2 == 1)
        .map(|(_, s)| s)
        .collect();
    strings
        .get(1)
        .or_else(|| strings.first())
        .map(|s| s.to_string())
}

/// `_NET_WM_STATE(ATOM) = _NET_WM_STATE_MAXIMIZED_VERT, _NET_WM_STATE_MAXIMIZED_HORZ`
fn parse_wm_state(output: &str) -> WindowState {
    output
        .lines()
        .next()
        .and_then(|line| line.split_once('='))
        .map(|(_, atoms)| atoms.split(',').filter_map(WmStateFlag::from_atom_name).collect())
        .unwrap_or_default()
}
