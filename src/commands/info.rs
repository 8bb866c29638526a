use crate::{commands::CommandError, database::Database, resp::RespValue, server::RedisRole};

enum InfoSection {
    Replication,
    Unknown,
}

pub struct InfoArguments {
    section: InfoSection,
}

impl InfoArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let section = match arguments {
            [] => InfoSection::Replication,
            [section] => match section.to_lowercase().as_str() {
                "replication" | "all" | "default" | "everything" => InfoSection::Replication,
                _ => InfoSection::Unknown,
            },
            _ => return Err(CommandError::SyntaxError),
        };

        Ok(InfoArguments { section })
    }
}

/// Replies with the `# Replication` section as a bulk string. Other sections are empty.
pub fn info(database: &Database, arguments: &[String]) -> Result<RespValue, CommandError> {
    let info_arguments = InfoArguments::parse(arguments)?;
    let server = &database.server;

    if let InfoSection::Unknown = info_arguments.section {
        return Ok(RespValue::bulk_string(""));
    }

    let mut lines = vec![
        "# Replication".to_string(),
        format!("role:{}", server.role.as_string()),
    ];

    match &server.role {
        RedisRole::Master => {
            lines.push(format!("connected_slaves:{}", server.replicas.len()));

            for (index, (client_id, replica)) in server.replicas.iter().enumerate() {
                let ip = database
                    .clients
                    .get(client_id)
                    .and_then(|client| client.address.rsplit_once(':'))
                    .map(|(ip, _)| ip.to_string())
                    .unwrap_or_default();
                let port = replica.listening_port.unwrap_or_default();

                lines.push(format!(
                    "slave{}:ip={},port={},state=online,offset={}",
                    index, ip, port, replica.ack_offset
                ));
            }
        }
        RedisRole::Replica { host, port } => {
            lines.push(format!("master_host:{}", host));
            lines.push(format!("master_port:{}", port));
        }
    }

    lines.push(format!("master_replid:{}", server.repl_id));
    lines.push(format!("master_repl_offset:{}", server.repl_offset));

    Ok(RespValue::bulk_string(lines.join("\r\n")))
}
