//! GestureDispatcher: responsibility and boundaries
//!
//! Owns at most one in-flight gesture, decides when a pending tap turns into
//! a double tap or a tap & hold, and drives the bound action's lifecycle.
//! Window lookups go through WindowResolver, action targets and settings come
//! from ActionConfig; this module never talks to the window system directly.

#[allow(clippy::module_inception)]
mod dispatcher;
mod timer;

#[cfg(test)]
mod tests;

pub use self::dispatcher::GestureDispatcher;
#[cfg(test)]
pub use self::dispatcher::DispatcherPhase;
pub use self::timer::TokioTimer;
