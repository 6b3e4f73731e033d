//! Line-oriented command shell on top of the in-memory file system.

mod command;
mod demo;
mod session;

pub use command::Command;
pub use demo::DEMO_SCRIPT;
pub use session::{Session, SessionError};
