use bytes::Bytes;
use tracing::debug;

use crate::{
    commands::{
        blpop::{blpop, BlpopOutcome},
        command_error::CommandError,
        config_get::config_get,
        echo::echo,
        geo::{geoadd::geoadd, geodist::geodist, geopos::geopos, geosearch::geosearch},
        get::get,
        incr::incr,
        info::info,
        keys::keys,
        llen::llen,
        lpop::lpop,
        lrange::lrange,
        ping::ping,
        pub_sub::{publish, subscribe, subscribed_ping, unsubscribe},
        replication::{psync, replconf, wait, WaitOutcome},
        reset::reset,
        rpush_and_lpush::{lpush, rpush, PushOutcome},
        set::set,
        sorted_set::{zadd::zadd, zcard::zcard, zrange::zrange, zrank::zrank, zrem::zrem, zscore::zscore},
        transactions::{discard, exec, multi},
        type_command::type_command,
        xadd::xadd,
        xrange::xrange,
        xread::{xread, XreadOutcome},
    },
    database::{ClientId, Database},
    resp::{Frame, RespValue},
    state::Parked,
};

/// Commands that modify the keyspace. They are refused from clients of a
/// replica and propagated to replicas by a master.
pub const WRITE_COMMANDS: [&str; 10] = [
    "SET", "INCR", "RPUSH", "LPUSH", "LPOP", "BLPOP", "XADD", "ZADD", "ZREM", "GEOADD",
];

#[derive(Debug)]
pub enum CommandResult {
    NoResponse,
    Response(RespValue),
    /// Several replies for one command, as SUBSCRIBE sends one per channel.
    Responses(Vec<RespValue>),
    /// The client waits for a push, an append or replica acknowledgements.
    Blocked(Parked),
    /// Reply, then close the connection.
    Quit(RespValue),
}

/// Where a command comes from, which decides how it may behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionContext {
    /// A regular client connection.
    Client,
    /// A command replayed by EXEC. It must not park.
    Transaction,
    /// The replication stream from our master. Writes are always applied.
    Replication,
}

#[derive(Debug, PartialEq, Clone)]
pub struct CommandHandler {
    pub name: String,
    pub arguments: Vec<String>,
    /// The frame exactly as received, forwarded verbatim to replicas.
    pub input: Bytes,
}

impl CommandHandler {
    /// Builds a command from a decoded request frame.
    ///
    /// The frame must be a non-empty array of bulk strings. The name is matched
    /// case-insensitively; `CONFIG GET` is folded into a single name.
    pub fn new(frame: Frame) -> Result<Self, CommandError> {
        let RespValue::Array(elements) = &frame.value else {
            return Err(CommandError::InvalidCommand);
        };

        let mut parts = Vec::with_capacity(elements.len());

        for element in elements {
            let RespValue::BulkString(bytes) = element else {
                return Err(CommandError::InvalidCommand);
            };

            let part = std::str::from_utf8(bytes).map_err(|_| CommandError::InvalidCommandArgument)?;
            parts.push(part.to_string());
        }

        let Some((name, rest)) = parts.split_first() else {
            return Err(CommandError::InvalidCommand);
        };

        let name = name.to_uppercase();

        let (name, arguments) = match name.as_str() {
            "CONFIG" => match rest.split_first() {
                Some((sub_command, parameters)) if sub_command.eq_ignore_ascii_case("get") => {
                    ("CONFIG GET".to_string(), parameters.to_vec())
                }
                Some((sub_command, _)) => {
                    return Err(CommandError::UnknownSubcommand(sub_command.to_uppercase()))
                }
                None => return Err(CommandError::wrong_arguments("config")),
            },
            _ => (name, rest.to_vec()),
        };

        Ok(Self {
            name,
            arguments,
            input: frame.raw,
        })
    }

    /// Builds a command from plain arguments, as if a client had sent them.
    pub fn from_arguments<I, S>(arguments: I) -> Result<Self, CommandError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let value = RespValue::array_of_bulk_strings(
            arguments.into_iter().map(Into::<String>::into),
        );
        let raw = value.encode();

        Self::new(Frame { value, raw })
    }

    pub fn is_write_command(&self) -> bool {
        WRITE_COMMANDS.contains(&self.name.as_str())
    }

    /// Runs the command against the database.
    ///
    /// On a master, a successful write is forwarded to every replica and
    /// advances the replication offset. A BLPOP that pops is forwarded as
    /// `LPOP key`, and so is every element a push hands to a parked BLPOP,
    /// so replicas never block. XADD is forwarded with its resolved id.
    pub fn execute(
        &self,
        database: &mut Database,
        client_id: ClientId,
        context: ExecutionContext,
    ) -> Result<CommandResult, CommandError> {
        if context != ExecutionContext::Replication
            && self.is_write_command()
            && !database.server.is_master()
        {
            return Err(CommandError::ReplicaReadOnlyCommands);
        }

        let can_block = context == ExecutionContext::Client;
        let arguments = self.arguments.as_slice();

        let response = match self.name.as_str() {
            "PING" if database.pub_sub.is_subscribed(client_id) => subscribed_ping(arguments)?,
            "PING" => ping(arguments)?,
            "ECHO" => echo(arguments)?,
            "GET" => get(&mut database.store, arguments)?,
            "SET" => self.replicated(set(&mut database.store, arguments)?, database),
            "INCR" => self.replicated(incr(&mut database.store, arguments)?, database),
            "TYPE" => type_command(&mut database.store, arguments)?,
            "KEYS" => keys(&database.store, arguments)?,
            "RPUSH" => {
                let outcome = rpush(&mut database.store, &mut database.state, arguments)?;
                self.replicate_push(database, outcome)
            }
            "LPUSH" => {
                let outcome = lpush(&mut database.store, &mut database.state, arguments)?;
                self.replicate_push(database, outcome)
            }
            "LPOP" => self.replicated(lpop(&mut database.store, arguments)?, database),
            "LLEN" => llen(&mut database.store, arguments)?,
            "LRANGE" => lrange(&mut database.store, arguments)?,
            "BLPOP" => {
                match blpop(
                    &mut database.store,
                    &mut database.state,
                    client_id,
                    arguments,
                    can_block,
                )? {
                    BlpopOutcome::Popped { key, value } => {
                        database.replicate(lpop_frame(&key));
                        RespValue::array_of_bulk_strings([key, value])
                    }
                    BlpopOutcome::Blocked(parked) => return Ok(CommandResult::Blocked(parked)),
                    BlpopOutcome::Empty => RespValue::NullArray,
                }
            }
            "XADD" => {
                let response = xadd(&mut database.store, &mut database.state, arguments)?;

                if let RespValue::BulkString(id) = &response {
                    database.replicate(xadd_frame(arguments, id));
                }

                response
            }
            "XRANGE" => xrange(&mut database.store, arguments)?,
            "XREAD" => {
                match xread(
                    &mut database.store,
                    &mut database.state,
                    client_id,
                    arguments,
                    can_block,
                )? {
                    XreadOutcome::Response(response) => response,
                    XreadOutcome::Blocked(parked) => return Ok(CommandResult::Blocked(parked)),
                }
            }
            "ZADD" => self.replicated(zadd(&mut database.store, arguments)?, database),
            "ZRANK" => zrank(&mut database.store, arguments)?,
            "ZRANGE" => zrange(&mut database.store, arguments)?,
            "ZCARD" => zcard(&mut database.store, arguments)?,
            "ZSCORE" => zscore(&mut database.store, arguments)?,
            "ZREM" => self.replicated(zrem(&mut database.store, arguments)?, database),
            "GEOADD" => self.replicated(geoadd(&mut database.store, arguments)?, database),
            "GEOPOS" => geopos(&mut database.store, arguments)?,
            "GEODIST" => geodist(&mut database.store, arguments)?,
            "GEOSEARCH" => geosearch(&mut database.store, arguments)?,
            "MULTI" => multi(&mut database.state, client_id, arguments)?,
            "EXEC" => exec(database, client_id, arguments)?,
            "DISCARD" => discard(&mut database.state, client_id, arguments)?,
            "SUBSCRIBE" => {
                return Ok(CommandResult::Responses(subscribe(
                    &mut database.pub_sub,
                    client_id,
                    arguments,
                )?))
            }
            "UNSUBSCRIBE" => {
                return Ok(CommandResult::Responses(unsubscribe(
                    &mut database.pub_sub,
                    client_id,
                    arguments,
                )))
            }
            "PUBLISH" => publish(database, arguments)?,
            "RESET" => reset(database, client_id, arguments)?,
            "QUIT" => return Ok(CommandResult::Quit(RespValue::ok())),
            "INFO" => info(database, arguments)?,
            "CONFIG GET" => config_get(&database.server, arguments)?,
            "REPLCONF" => match replconf(database, client_id, arguments)? {
                Some(response) => response,
                None => return Ok(CommandResult::NoResponse),
            },
            "PSYNC" => {
                psync(database, client_id, arguments)?;
                return Ok(CommandResult::NoResponse);
            }
            "WAIT" => match wait(database, client_id, arguments, can_block)? {
                WaitOutcome::Response(response) => response,
                WaitOutcome::Blocked(parked) => return Ok(CommandResult::Blocked(parked)),
            },
            _ => return Err(CommandError::UnknownCommand(self.name.to_lowercase())),
        };

        Ok(CommandResult::Response(response))
    }

    /// Forwards this command's frame to replicas and passes the response through.
    fn replicated(&self, response: RespValue, database: &mut Database) -> RespValue {
        database.replicate(self.input.clone());
        response
    }

    fn replicate_push(&self, database: &mut Database, outcome: PushOutcome) -> RespValue {
        database.replicate(self.input.clone());

        for _ in 0..outcome.served_waiters {
            database.replicate(lpop_frame(&outcome.key));
        }

        if outcome.served_waiters > 0 {
            debug!(key = %outcome.key, served = outcome.served_waiters, "push served parked clients");
        }

        outcome.response()
    }
}

/// `XADD key <id> field value ...` carrying the id the master assigned, so
/// replicas never generate ids from their own clocks.
fn xadd_frame(arguments: &[String], id: &Bytes) -> Bytes {
    let mut parts = Vec::with_capacity(arguments.len() + 1);
    parts.push(Bytes::from_static(b"XADD"));
    parts.extend(arguments.first().cloned().map(Bytes::from));
    parts.push(id.clone());
    parts.extend(arguments.iter().skip(2).cloned().map(Bytes::from));

    RespValue::array_of_bulk_strings(parts).encode()
}

/// `LPOP key`, the form in which replicas learn about blocking pops.
fn lpop_frame(key: &str) -> Bytes {
    RespValue::array_of_bulk_strings(["LPOP".to_string(), key.to_string()]).encode()
}
