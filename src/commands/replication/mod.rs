mod psync;
mod replconf;
mod wait;

pub use psync::psync;
pub use replconf::replconf;
pub use wait::{wait, WaitOutcome};
