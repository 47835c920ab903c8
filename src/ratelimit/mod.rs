//! Rate limiting logic and state management.

mod identity;
mod limiter;
mod policy;
mod sweeper;

pub use identity::{Identifier, UserId};
pub use limiter::{Decision, WindowTracker};
pub use policy::{Policy, PolicyClass, AI, API, AUTH, EXPENSIVE};
pub use sweeper::{Sweeper, DEFAULT_SWEEP_INTERVAL};
