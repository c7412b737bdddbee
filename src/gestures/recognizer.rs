use crate::events::gesture::{ATTR_ANGLE_DELTA, ATTR_DELTA_X, ATTR_DELTA_Y, ATTR_RADIUS_DELTA};
use crate::events::Attributes;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::gesture::Gesture;
use super::types::{GestureDirection, GestureType};

/// Источник распознавания: превращает (тип, id, атрибуты) в жест
pub trait GestureRecognizer: Send + Sync {
    /// Простой жест, начинающийся с этого события
    fn recognize_simple(&self, gesture_type: &str, id: i64, attrs: &Attributes) -> Option<Gesture>;

    /// Составной жест, которым это событие продолжает ожидающий tap
    fn recognize_composed(&self, gesture_type: &str, id: i64, attrs: &Attributes) -> Option<Gesture>;
}

static SIMPLE_TYPES: Lazy<HashMap<&'static str, GestureType>> = Lazy::new(|| {
    HashMap::from([
        ("Tap", GestureType::Tap),
        ("Drag", GestureType::Drag),
        ("Pinch", GestureType::Pinch),
        ("Rotate", GestureType::Rotate),
    ])
});

static COMPOSED_TYPES: Lazy<HashMap<&'static str, GestureType>> = Lazy::new(|| {
    HashMap::from([
        ("Tap", GestureType::DoubleTap),
        ("DoubleTap", GestureType::DoubleTap),
        ("Drag", GestureType::TapAndHold),
        ("TapAndHold", GestureType::TapAndHold),
    ])
});

/// Распознаватель по тегу типа и атрибутам события
#[derive(Debug, Default, Clone, Copy)]
pub struct AttributeRecognizer;

impl AttributeRecognizer {
    pub fn new() -> Self {
        Self
    }

    fn build(gesture_type: GestureType, id: i64, attrs: &Attributes) -> Option<Gesture> {
        let num_fingers = attrs.touches().filter(|n| *n >= 1)?;
        let direction = Self::direction_of(gesture_type, attrs);
        Some(Gesture::new(id, gesture_type, num_fingers, direction, attrs.clone()))
    }

    fn direction_of(gesture_type: GestureType, attrs: &Attributes) -> GestureDirection {
        match gesture_type {
            GestureType::Drag | GestureType::TapAndHold => {
                let dx = attrs.get_f64(ATTR_DELTA_X).unwrap_or(0.0);
                let dy = attrs.get_f64(ATTR_DELTA_Y).unwrap_or(0.0);
                if dx == 0.0 && dy == 0.0 {
                    GestureDirection::All
                } else if dx.abs() >= dy.abs() {
                    if dx > 0.0 { GestureDirection::Right } else { GestureDirection::Left }
                } else if dy > 0.0 {
                    // Ось y экрана направлена вниз
                    GestureDirection::Down
                } else {
                    GestureDirection::Up
                }
            }
            GestureType::Pinch => match attrs.get_f64(ATTR_RADIUS_DELTA) {
                Some(delta) if delta > 0.0 => GestureDirection::Out,
                Some(delta) if delta < 0.0 => GestureDirection::In,
                _ => GestureDirection::All,
            },
            GestureType::Rotate => match attrs.get_f64(ATTR_ANGLE_DELTA) {
                Some(delta) if delta > 0.0 => GestureDirection::Right,
                Some(delta) if delta < 0.0 => GestureDirection::Left,
                _ => GestureDirection::All,
            },
            GestureType::Tap | GestureType::DoubleTap => GestureDirection::NoDirection,
        }
    }
}

impl GestureRecognizer for AttributeRecognizer {
    fn recognize_simple(&self, gesture_type: &str, id: i64, attrs: &Attributes) -> Option<Gesture> {
        let kind = *SIMPLE_TYPES.get(gesture_type)?;
        Self::build(kind, id, attrs)
    }

    fn recognize_composed(&self, gesture_type: &str, id: i64, attrs: &Attributes) -> Option<Gesture> {
        let kind = *COMPOSED_TYPES.get(gesture_type)?;
        Self::build(kind, id, attrs)
    }
}
