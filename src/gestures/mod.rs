mod gesture;
mod recognizer;
mod types;

pub use gesture::Gesture;
pub use recognizer::{AttributeRecognizer, GestureRecognizer};
pub use types::{GestureDirection, GestureType};
