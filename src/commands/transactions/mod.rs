mod discard;
mod exec;
mod multi;

pub use discard::discard;
pub use exec::exec;
pub use multi::multi;

pub const TRANSACTION_COMMANDS: [&str; 3] = ["MULTI", "EXEC", "DISCARD"];
