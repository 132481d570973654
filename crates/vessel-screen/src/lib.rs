//! Screen Coordinator (spec §4.6): owns an ordered list of screen plugin
//! instances, exactly one active at a time, switched by `screen.command`
//! navigation events.

mod command;
mod coordinator;

pub use command::{ScreenAction, ScreenCommand};
pub use coordinator::ScreenCoordinator;
