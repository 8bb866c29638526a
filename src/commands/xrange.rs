use crate::{
    commands::{command_error::CommandError, stream_utils::parse_stream_entries_to_resp},
    key_value_store::KeyValueStore,
    resp::RespValue,
    stream::StreamId,
};

pub struct XrangeArguments {
    key: String,
    start: StreamId,
    end: StreamId,
    count: Option<usize>,
}

impl XrangeArguments {
    /// Parses `[key, start, end]` with an optional trailing `COUNT n`.
    ///
    /// `-` and `+` stand for the smallest and largest possible ids. A bare
    /// millisecond value covers every sequence number of that millisecond.
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 3 && arguments.len() != 5 {
            return Err(CommandError::wrong_arguments("xrange"));
        }

        let start = StreamId::parse_range_start(&arguments[1])?;
        let end = StreamId::parse_range_end(&arguments[2])?;

        let count = match arguments.get(3) {
            Some(option) if option.eq_ignore_ascii_case("count") => Some(
                arguments[4]
                    .parse::<usize>()
                    .map_err(|_| CommandError::InvalidInteger)?,
            ),
            Some(_) => return Err(CommandError::SyntaxError),
            None => None,
        };

        Ok(Self {
            key: arguments[0].clone(),
            start,
            end,
            count,
        })
    }
}

/// Handles the Redis XRANGE command. Missing keys reply with an empty array.
pub fn xrange(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let xrange_arguments = XrangeArguments::parse(arguments)?;

    let Some(stream) = store.get_stream(&xrange_arguments.key)? else {
        return Ok(RespValue::Array(Vec::new()));
    };

    let mut entries = stream.range(xrange_arguments.start, xrange_arguments.end);

    if let Some(count) = xrange_arguments.count {
        entries.truncate(count);
    }

    Ok(parse_stream_entries_to_resp(&entries))
}
