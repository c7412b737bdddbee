use crate::events::{Attributes, WindowId};

use super::action_type::ActionType;

/// Three-phase lifecycle every action implements, mirroring the gesture's own
/// start/update/finish. Calls arrive under the dispatcher lock and may block.
pub trait GestureAction: Send {
    fn action_type(&self) -> ActionType;

    fn execute_start(&mut self, attrs: &Attributes);

    fn execute_update(&mut self, attrs: &Attributes);

    fn execute_finish(&mut self, attrs: &Attributes);
}

/// Builds the action bound to a freshly recognized gesture
pub trait ActionFactory: Send + Sync {
    fn create_action(
        &self,
        action_type: ActionType,
        settings: &str,
        window: Option<WindowId>,
    ) -> Box<dyn GestureAction>;
}
