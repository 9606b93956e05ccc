//! Sound session: the single slot tracking which clip is downloading or
//! playing, and the external processes behind it.

mod manager;
mod process;
mod state;

pub use manager::SessionManager;
pub use process::{ExitCallback, PlaybackProcess, ProcessRunner, SystemRunner};
pub use state::{Activation, ClipStatus, SessionEvent, SessionState};
