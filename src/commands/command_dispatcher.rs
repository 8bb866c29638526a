use tracing::{debug, warn};

use crate::{
    commands::{
        command_handler::{CommandHandler, CommandResult, ExecutionContext},
        pub_sub::SUBSCRIBED_MODE_COMMANDS,
        transactions::TRANSACTION_COMMANDS,
        CommandError,
    },
    database::{ClientId, Database, SharedDatabase},
    resp::RespValue,
    state::Parked,
};

/// Commands that act on the connection itself. They run right away even
/// inside MULTI.
const CONNECTION_COMMANDS: [&str; 2] = ["QUIT", "RESET"];

/// What a connection gets back for one command.
#[derive(Debug)]
pub struct Dispatched {
    pub replies: Vec<RespValue>,
    pub parked: Option<Parked>,
    /// The connection closes once the replies are written.
    pub close: bool,
}

impl Dispatched {
    fn reply(value: RespValue) -> Self {
        Dispatched {
            replies: vec![value],
            parked: None,
            close: false,
        }
    }

    fn silent() -> Self {
        Dispatched {
            replies: Vec::new(),
            parked: None,
            close: false,
        }
    }
}

/// How a connection carries on after a command's replies were queued.
#[derive(Debug)]
pub enum NextStep {
    ReadMore,
    Park(Parked),
    Close,
}

/// Routes the commands of one connection: subscribed-mode gating, transaction
/// queueing, execution and reply delivery.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    client_id: ClientId,
    context: ExecutionContext,
    database: SharedDatabase,
}

impl CommandDispatcher {
    pub fn new(client_id: ClientId, context: ExecutionContext, database: SharedDatabase) -> Self {
        CommandDispatcher {
            client_id,
            context,
            database,
        }
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    /// Runs one command under the database lock and queues its replies on the
    /// client's outbox.
    pub async fn dispatch(&self, command: CommandHandler) -> NextStep {
        let mut database = self.database.lock().await;
        let dispatched = self.dispatch_command(&mut database, command);

        for reply in dispatched.replies {
            database.send_to_client(self.client_id, reply.encode());
        }

        match dispatched.parked {
            _ if dispatched.close => NextStep::Close,
            Some(parked) => NextStep::Park(parked),
            None => NextStep::ReadMore,
        }
    }

    /// Queues an error for a request that could not even be turned into a command.
    pub async fn reject(&self, error: CommandError) {
        if self.context == ExecutionContext::Replication {
            warn!("ignoring malformed command from master: {}", error);
            return;
        }

        let database = self.database.lock().await;
        database.send_to_client(self.client_id, error.as_resp().encode());
    }

    pub fn dispatch_command(&self, database: &mut Database, command: CommandHandler) -> Dispatched {
        let name = command.name.as_str();

        if self.context == ExecutionContext::Client
            && database.pub_sub.is_subscribed(self.client_id)
            && !SUBSCRIBED_MODE_COMMANDS.contains(&name)
        {
            return Dispatched::reply(CommandError::SubscribedMode(name.to_lowercase()).as_resp());
        }

        if self.context == ExecutionContext::Client
            && database.state.get_transaction(self.client_id).is_some()
            && !TRANSACTION_COMMANDS.contains(&name)
            && !CONNECTION_COMMANDS.contains(&name)
        {
            debug!(client_id = self.client_id, command = name, "queued command");

            return match database.state.add_to_transaction(self.client_id, command) {
                Ok(()) => Dispatched::reply(RespValue::simple_string("QUEUED")),
                Err(e) => Dispatched::reply(CommandError::from(e).as_resp()),
            };
        }

        let result = command.execute(database, self.client_id, self.context);

        if self.context == ExecutionContext::Replication {
            return self.applied_from_master(database, &command, result);
        }

        match result {
            Ok(CommandResult::NoResponse) => Dispatched::silent(),
            Ok(CommandResult::Response(response)) => Dispatched::reply(response),
            Ok(CommandResult::Responses(replies)) => Dispatched {
                replies,
                parked: None,
                close: false,
            },
            Ok(CommandResult::Blocked(parked)) => Dispatched {
                replies: Vec::new(),
                parked: Some(parked),
                close: false,
            },
            Ok(CommandResult::Quit(response)) => Dispatched {
                replies: vec![response],
                parked: None,
                close: true,
            },
            Err(e) => {
                debug!(client_id = self.client_id, command = %command.name, "command failed: {}", e);
                Dispatched::reply(e.as_resp())
            }
        }
    }

    /// Commands from the master are applied silently, except for the
    /// acknowledgements it asks for. Every processed frame counts towards the
    /// replica offset, after its own reply was computed.
    fn applied_from_master(
        &self,
        database: &mut Database,
        command: &CommandHandler,
        result: Result<CommandResult, CommandError>,
    ) -> Dispatched {
        let dispatched = match result {
            Ok(CommandResult::Response(response)) if command.name == "REPLCONF" => {
                Dispatched::reply(response)
            }
            Ok(_) => Dispatched::silent(),
            Err(e) => {
                warn!(command = %command.name, "failed to apply command from master: {}", e);
                Dispatched::silent()
            }
        };

        database.server.repl_offset += command.input.len() as u64;

        dispatched
    }
}
