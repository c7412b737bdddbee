pub mod gesture;
pub mod window;

pub use gesture::{Attributes, EventPhase, GestureEvent};
pub use window::{ResolvedTarget, StateChange, WindowId, WmStateFlag};
