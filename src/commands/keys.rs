use globset::Glob;

use crate::{commands::CommandError, key_value_store::KeyValueStore, resp::RespValue};

pub struct KeysArguments {
    pub pattern: String,
}

impl KeysArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let [pattern] = arguments else {
            return Err(CommandError::wrong_arguments("keys"));
        };

        Ok(KeysArguments {
            pattern: pattern.clone(),
        })
    }
}

/// Lists the live string keys matching a glob pattern, in sorted order.
pub fn keys(store: &KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let keys_arguments = KeysArguments::parse(arguments)?;

    let glob = Glob::new(&keys_arguments.pattern)
        .map_err(|_| CommandError::InvalidPattern(keys_arguments.pattern.clone()))?
        .compile_matcher();

    let mut matching: Vec<String> = store
        .string_keys()
        .into_iter()
        .filter(|key| glob.is_match(key))
        .collect();
    matching.sort();

    Ok(RespValue::array_of_bulk_strings(matching))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_value_store::{DataType, Value};
    use std::collections::VecDeque;

    #[test]
    fn test_keys() {
        let mut store = KeyValueStore::new();
        store.insert("foo".into(), Value::new(DataType::String("1".into())));
        store.insert("bar".into(), Value::new(DataType::String("2".into())));
        store.insert("list".into(), Value::new(DataType::List(VecDeque::new())));

        let test_cases = vec![
            ("*", vec!["bar", "foo"]),
            ("f*", vec!["foo"]),
            ("?ar", vec!["bar"]),
            ("nothing", vec![]),
        ];

        for (pattern, expected) in test_cases {
            assert_eq!(
                keys(&store, &[pattern.to_string()]),
                Ok(RespValue::array_of_bulk_strings(expected)),
                "KEYS {}",
                pattern
            );
        }
    }
}
