mod ping;
mod publish;
mod subscribe;
mod unsubscribe;

pub use ping::subscribed_ping;
pub use publish::publish;
pub use subscribe::subscribe;
pub use unsubscribe::unsubscribe;

/// Commands a client may still issue while it has channel subscriptions.
pub const SUBSCRIBED_MODE_COMMANDS: [&str; 5] = ["SUBSCRIBE", "UNSUBSCRIBE", "PING", "QUIT", "RESET"];
