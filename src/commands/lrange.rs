use crate::{
    commands::command_error::CommandError,
    key_value_store::KeyValueStore,
    resp::RespValue,
};

/// Represents the parsed arguments for the LRANGE command.
///
/// The LRANGE command in Redis returns a range of elements from a list stored at the given key.
/// This struct holds the key and the raw start and end indices for the range operation.
pub struct LrangeArguments {
    /// The key name to retrieve from the store
    key: String,
    /// The starting index for the range (can be negative to count from the end)
    start_index: isize,
    /// The ending index for the range (can be negative to count from the end)
    end_index: isize,
}

impl LrangeArguments {
    /// Parses and validates the arguments for the LRANGE command.
    ///
    /// # Arguments
    ///
    /// * `arguments` - The command arguments: [key, start_index, end_index]
    ///
    /// # Returns
    ///
    /// * `Ok(LrangeArguments)` - If the arguments are valid
    /// * `Err(CommandError::WrongNumberOfArguments)` - If the number of arguments is not exactly 3
    /// * `Err(CommandError::InvalidInteger)` - If start or end index is not a valid integer
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let [key, start_index, end_index] = arguments else {
            return Err(CommandError::wrong_arguments("lrange"));
        };

        let (start_index, end_index) = parse_range_indexes(start_index, end_index)?;

        Ok(Self {
            key: key.clone(),
            start_index,
            end_index,
        })
    }
}

/// Parses a pair of signed range indexes.
pub fn parse_range_indexes(start: &str, end: &str) -> Result<(isize, isize), CommandError> {
    let Ok(start_index) = start.parse::<isize>() else {
        return Err(CommandError::InvalidInteger);
    };

    let Ok(end_index) = end.parse::<isize>() else {
        return Err(CommandError::InvalidInteger);
    };

    Ok((start_index, end_index))
}

/// Handles the Redis LRANGE command.
///
/// Returns a range of elements from a list stored at the given key.
/// Both start and end indices can be negative to count from the end of the list.
/// A missing key reads as an empty list.
///
/// # Returns
///
/// * `Ok(RespValue::Array)` - The requested range of elements, possibly empty
/// * `Err(CommandError::InvalidDataTypeForKey)` - If the key holds something other than a list
///
/// # Examples
///
/// ```ignore
/// // LRANGE mylist -2 -1  (get last 2 elements)
/// let result = lrange(&mut store, &["mylist".to_string(), "-2".to_string(), "-1".to_string()]);
/// // Returns: RespValue::Array([val4, val5])
/// ```
pub fn lrange(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let lrange_arguments = LrangeArguments::parse(arguments)?;

    let Some(list) = store.get_list_mut(&lrange_arguments.key)? else {
        return Ok(RespValue::Array(Vec::new()));
    };

    let Ok((start, end)) = validate_range_indexes(
        list.len(),
        lrange_arguments.start_index,
        lrange_arguments.end_index,
    ) else {
        return Ok(RespValue::Array(Vec::new()));
    };

    Ok(RespValue::array_of_bulk_strings(
        list.range(start..=end).cloned(),
    ))
}

/// Validates and normalizes range indices for list and sorted set operations.
///
/// Converts negative indices to positive equivalents and ensures the range is valid.
/// Negative indices count from the end of the collection (-1 is the last element).
///
/// # Arguments
///
/// * `len` - Number of elements in the collection
/// * `start_index` - The starting index (can be negative)
/// * `end_index` - The ending index (can be negative)
///
/// # Returns
///
/// * `Ok((usize, usize))` - Normalized, inclusive start and end indices if valid
/// * `Err(&str)` - Error message if the range selects nothing
///
/// # Examples
///
/// ```text
/// // For a collection of length 5:
/// // validate_range_indexes(5, 0, 2) -> Ok((0, 2))
/// // validate_range_indexes(5, -2, -1) -> Ok((3, 4))
/// // validate_range_indexes(5, 5, 10) -> Err("Start index is out of bounds")
/// ```
pub fn validate_range_indexes(
    len: usize,
    start_index: isize,
    end_index: isize,
) -> Result<(usize, usize), &'static str> {
    let len = len as isize;

    if len == 0 {
        return Err("List is empty");
    }

    let mut start = if start_index < 0 {
        len + start_index
    } else {
        start_index
    };
    let mut end = if end_index < 0 {
        len + end_index
    } else {
        end_index
    };

    start = start.max(0);
    end = end.min(len - 1);

    if start >= len {
        return Err("Start index is out of bounds");
    }

    if start > end {
        return Err("Start index is bigger than end index after processing");
    }

    Ok((start as usize, end as usize))
}
