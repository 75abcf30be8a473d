//! Pure data structures shared by the store, the event bus and the poller.

pub mod event;
pub mod order;

pub use event::*;
pub use order::*;
