use crate::actions::{ActionType, GestureAction};
use crate::events::Attributes;
use std::fmt;
use tracing::warn;

use super::types::{GestureDirection, GesturePhase, GestureType};

/// Один логический мультитач-жест.
///
/// Пока жест активен, им эксклюзивно владеет диспетчер. Действие привязывается
/// ровно один раз, до первого вызова жизненного цикла. Фазы дополняются
/// автоматически: `update` без `start` сначала вызывает `start`, а `finish`
/// вызывает недостающие `start`/`update`, поэтому действие всегда видит
/// последовательность start → update+ → finish.
pub struct Gesture {
    id: i64,
    gesture_type: GestureType,
    num_fingers: u32,
    direction: GestureDirection,
    attrs: Attributes,
    action: Option<Box<dyn GestureAction>>,
    phase: GesturePhase,
}

impl Gesture {
    pub fn new(
        id: i64,
        gesture_type: GestureType,
        num_fingers: u32,
        direction: GestureDirection,
        attrs: Attributes,
    ) -> Self {
        Self {
            id,
            gesture_type,
            num_fingers,
            direction,
            attrs,
            action: None,
            phase: GesturePhase::Created,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn gesture_type(&self) -> GestureType {
        self.gesture_type
    }

    pub fn num_fingers(&self) -> u32 {
        self.num_fingers
    }

    pub fn direction(&self) -> GestureDirection {
        self.direction
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    #[cfg(test)]
    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// Заменить снимок атрибутов целиком
    pub fn set_attrs(&mut self, attrs: Attributes) {
        self.attrs = attrs;
    }

    pub fn set_action(&mut self, action: Box<dyn GestureAction>) {
        if self.action.is_some() {
            warn!("Повторная привязка действия к жесту #{} проигнорирована", self.id);
            return;
        }
        self.action = Some(action);
    }

    pub fn action_type(&self) -> ActionType {
        self.action
            .as_ref()
            .map(|action| action.action_type())
            .unwrap_or(ActionType::NoAction)
    }

    pub fn start(&mut self) {
        if self.phase != GesturePhase::Created {
            return;
        }
        if let Some(action) = self.action.as_mut() {
            action.execute_start(&self.attrs);
        }
        self.phase = GesturePhase::Started;
    }

    pub fn update(&mut self) {
        if self.phase == GesturePhase::Finished {
            return;
        }
        self.start();
        if let Some(action) = self.action.as_mut() {
            action.execute_update(&self.attrs);
        }
        self.phase = GesturePhase::Updated;
    }

    pub fn finish(&mut self) {
        match self.phase {
            GesturePhase::Finished => return,
            GesturePhase::Created | GesturePhase::Started => self.update(),
            GesturePhase::Updated => {}
        }
        if let Some(action) = self.action.as_mut() {
            action.execute_finish(&self.attrs);
        }
        self.phase = GesturePhase::Finished;
    }
}

impl fmt::Debug for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gesture")
            .field("id", &self.id)
            .field("gesture_type", &self.gesture_type)
            .field("num_fingers", &self.num_fingers)
            .field("direction", &self.direction)
            .field("attrs", &self.attrs)
            .field("action", &self.action_type())
            .field("phase", &self.phase)
            .finish()
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{} ({} пальц., {})",
            self.gesture_type, self.id, self.num_fingers, self.direction
        )
    }
}
