use crate::{commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue};

pub struct LpopArguments {
    key: String,
    count: Option<usize>,
}

impl LpopArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        match arguments {
            [key] => Ok(Self {
                key: key.clone(),
                count: None,
            }),
            [key, count] => {
                let count = count
                    .parse::<usize>()
                    .map_err(|_| CommandError::InvalidInteger)?;

                Ok(Self {
                    key: key.clone(),
                    count: Some(count),
                })
            }
            _ => Err(CommandError::wrong_arguments("lpop")),
        }
    }
}

/// Handles the Redis LPOP command.
///
/// Without a count, pops the head of the list and replies with it as a bulk string.
/// With a count, pops up to that many elements and replies with an array.
/// A missing key replies with the null bulk string or the null array respectively.
/// The key is removed once its list is empty.
pub fn lpop(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let lpop_arguments = LpopArguments::parse(arguments)?;

    let Some(list) = store.get_list_mut(&lpop_arguments.key)? else {
        return Ok(match lpop_arguments.count {
            Some(_) => RespValue::NullArray,
            None => RespValue::NullBulkString,
        });
    };

    let response = match lpop_arguments.count {
        Some(count) => {
            let count = count.min(list.len());
            RespValue::array_of_bulk_strings(list.drain(..count))
        }
        None => RespValue::optional_bulk_string(list.pop_front()),
    };

    store.remove_if_empty_list(&lpop_arguments.key);

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_value_store::{DataType, Value};
    use std::collections::VecDeque;

    fn arguments(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn test_lpop() {
        let mut store = KeyValueStore::new();
        store.insert(
            "fruits".into(),
            Value::new(DataType::List(VecDeque::from([
                "apple".to_string(),
                "banana".to_string(),
                "cherry".to_string(),
                "date".to_string(),
            ]))),
        );

        let test_cases = vec![
            (arguments(&["fruits"]), Ok(RespValue::bulk_string("apple"))),
            (
                arguments(&["fruits", "2"]),
                Ok(RespValue::array_of_bulk_strings(["banana", "cherry"])),
            ),
            (
                arguments(&["fruits", "5"]),
                Ok(RespValue::array_of_bulk_strings(["date"])),
            ),
            (arguments(&["fruits"]), Ok(RespValue::NullBulkString)),
            (arguments(&["fruits", "1"]), Ok(RespValue::NullArray)),
            (arguments(&["fruits", "-1"]), Err(CommandError::InvalidInteger)),
        ];

        for (input, expected) in test_cases {
            assert_eq!(lpop(&mut store, &input), expected, "LPOP {:?}", input);
        }

        assert!(store.get("fruits").is_none(), "empty list is removed");
    }
}
