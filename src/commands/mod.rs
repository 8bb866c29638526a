mod blpop;
mod command_dispatcher;
mod command_error;
mod command_handler;
mod config_get;
mod echo;
mod geo;
mod get;
mod incr;
mod info;
mod keys;
mod llen;
mod lpop;
mod lrange;
mod ping;
mod pub_sub;
mod replication;
mod reset;
mod rpush_and_lpush;
mod set;
mod sorted_set;
mod stream_utils;
mod transactions;
mod type_command;
mod xadd;
mod xrange;
mod xread;

pub use command_dispatcher::{CommandDispatcher, Dispatched, NextStep};
pub use command_error::CommandError;
pub use command_handler::{CommandHandler, CommandResult, ExecutionContext, WRITE_COMMANDS};
