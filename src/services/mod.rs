pub mod dispatcher;
pub mod event_source;
pub mod window_resolver;
pub mod windowing;

pub use dispatcher::{GestureDispatcher, TokioTimer};
pub use event_source::create_event_source;
pub use window_resolver::WindowResolver;
pub use windowing::create_windowing_protocol;
