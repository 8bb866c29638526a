use crate::{
    commands::{command_error::CommandError, sorted_set::parse_score},
    key_value_store::KeyValueStore,
    resp::RespValue,
};

pub struct ZaddArguments {
    key: String,
    /// (score, member) pairs in the order given
    members: Vec<(f64, String)>,
}

impl ZaddArguments {
    /// Parses `[key, score, member, score, member, ...]`.
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() < 3 || arguments.len() % 2 == 0 {
            return Err(CommandError::wrong_arguments("zadd"));
        }

        let members = arguments[1..]
            .chunks_exact(2)
            .map(|pair| Ok((parse_score(&pair[0])?, pair[1].clone())))
            .collect::<Result<Vec<_>, CommandError>>()?;

        Ok(Self {
            key: arguments[0].clone(),
            members,
        })
    }
}

/// Handles the Redis ZADD command.
///
/// Inserts new members and moves existing ones to their new score. Replies with
/// the number of members that were not present before.
pub fn zadd(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let zadd_arguments = ZaddArguments::parse(arguments)?;
    let set = store.get_or_create_sorted_set(&zadd_arguments.key)?;

    let added = zadd_arguments
        .members
        .into_iter()
        .filter(|(score, member)| set.insert(member.clone(), *score))
        .count();

    Ok(RespValue::Integer(added as i64))
}
