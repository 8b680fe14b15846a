//! Worker primitives for deferred diagram work.
//!
//! Provides task classification, classified spawning onto the active Tokio
//! runtime, and the keyed [`Debouncer`] that turns bursts of edits into a
//! single delayed unit of work per key.

mod class;
mod debounce;
mod panic;
mod spawn;
mod token;

pub use class::TaskClass;
pub use debounce::Debouncer;
pub use panic::join_error_panic_message;
pub use spawn::spawn;
