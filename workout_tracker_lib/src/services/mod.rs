//! Collaborators the session engine drives but does not own the behavior of.

mod clock;
mod location;
mod store;
mod ticker;
mod wake_lock;

pub use clock::*;
pub use location::*;
pub use store::*;
pub use ticker::*;
pub use wake_lock::*;
