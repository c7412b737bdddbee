use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::window::WindowId;

/// Атрибут количества касаний
pub const ATTR_TOUCHES: &str = "touches";
/// Атрибут дочернего окна, над которым выполнен жест
pub const ATTR_CHILD_WINDOW_ID: &str = "child window id";
pub const ATTR_DELTA_X: &str = "delta x";
pub const ATTR_DELTA_Y: &str = "delta y";
pub const ATTR_RADIUS_DELTA: &str = "radius delta";
pub const ATTR_ANGLE_DELTA: &str = "angle delta";

/// Значение атрибута жеста (числовое или строковое)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttrValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            AttrValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            AttrValue::Float(_) => None,
            AttrValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Float(v) => Some(*v),
            AttrValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(value.into())
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

/// Упорядоченный снимок атрибутов. При каждом обновлении заменяется целиком.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, AttrValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.get(name)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(AttrValue::as_i64)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(AttrValue::as_f64)
    }

    pub fn touches(&self) -> Option<u32> {
        self.get_i64(ATTR_TOUCHES)
            .and_then(|v| u32::try_from(v).ok())
    }

    /// Окно доставки события. Ноль означает отсутствие окна.
    pub fn child_window(&self) -> Option<WindowId> {
        self.get_i64(ATTR_CHILD_WINDOW_ID)
            .and_then(|v| u64::try_from(v).ok())
            .filter(|v| *v != 0)
            .map(WindowId)
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}

/// Фаза события от распознавателя
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventPhase {
    Start,
    Update,
    Finish,
}

/// Событие жеста: (тип, id, атрибуты). Неизменяемо после получения.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub phase: EventPhase,
    #[serde(rename = "type")]
    pub gesture_type: String,
    pub id: i64,
    #[serde(default)]
    pub attributes: Attributes,
}

impl GestureEvent {
    pub fn new(phase: EventPhase, gesture_type: &str, id: i64, attributes: Attributes) -> Self {
        Self {
            phase,
            gesture_type: gesture_type.to_string(),
            id,
            attributes,
        }
    }

    pub fn start(gesture_type: &str, id: i64, attributes: Attributes) -> Self {
        Self::new(EventPhase::Start, gesture_type, id, attributes)
    }

    pub fn update(gesture_type: &str, id: i64, attributes: Attributes) -> Self {
        Self::new(EventPhase::Update, gesture_type, id, attributes)
    }

    pub fn finish(gesture_type: &str, id: i64, attributes: Attributes) -> Self {
        Self::new(EventPhase::Finish, gesture_type, id, attributes)
    }
}

impl fmt::Display for GestureEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} {}#{} {}",
            self.phase, self.gesture_type, self.id, self.attributes
        )
    }
}
