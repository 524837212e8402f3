//! The watch engine: debounced filesystem watching per configured
//! directory, regenerating declarations as sources change.

mod event;
mod target;

pub use event::{PendingQueue, WatchEvent, DEBOUNCE_MS};
pub use target::{run, WatchTarget};
