use serde::{Deserialize, Serialize};
use std::fmt;

/// Идентификатор окна X11
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl WindowId {
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Разбор идентификатора в форме `0x1400003` или десятичной
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().trim_end_matches(',');
        let value = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).ok()?,
            None => raw.parse().ok()?,
        };
        Some(Self(value))
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Окно приложения и его класс, вычисленные один раз при создании жеста
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedTarget {
    pub window: Option<WindowId>,
    pub app_class: String,
}

impl ResolvedTarget {
    pub fn new(window: Option<WindowId>, app_class: String) -> Self {
        Self { window, app_class }
    }

    /// Цель без окна: действия обязаны ничего не делать
    pub fn none() -> Self {
        Self::default()
    }
}

impl fmt::Display for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.window {
            Some(window) if self.app_class.is_empty() => write!(f, "{}", window),
            Some(window) => write!(f, "{} ({})", window, self.app_class),
            None => write!(f, "<нет окна>"),
        }
    }
}

/// Флаги `_NET_WM_STATE`, которые меняют действия каталога
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WmStateFlag {
    MaximizedVert,
    MaximizedHorz,
}

impl WmStateFlag {
    const ALL: [WmStateFlag; 2] = [WmStateFlag::MaximizedVert, WmStateFlag::MaximizedHorz];

    pub fn atom_name(&self) -> &'static str {
        match self {
            WmStateFlag::MaximizedVert => "_NET_WM_STATE_MAXIMIZED_VERT",
            WmStateFlag::MaximizedHorz => "_NET_WM_STATE_MAXIMIZED_HORZ",
        }
    }

    /// Имя свойства в нотации `wmctrl -b`
    pub fn wmctrl_name(&self) -> &'static str {
        match self {
            WmStateFlag::MaximizedVert => "maximized_vert",
            WmStateFlag::MaximizedHorz => "maximized_horz",
        }
    }

    /// Прочие атомы состояния (`_NET_WM_STATE_HIDDEN` и т.п.) пропускаются
    pub fn from_atom_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|flag| flag.atom_name() == name)
    }
}

/// Направление изменения состояния окна
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateChange {
    Add,
    Remove,
}

impl StateChange {
    pub fn wmctrl_verb(&self) -> &'static str {
        match self {
            StateChange::Add => "add",
            StateChange::Remove => "remove",
        }
    }
}
