use crate::{
    resp::RespValue,
    stream::{StreamFields, StreamId},
};

/// Converts stream entries to RESP array format.
///
/// Each entry becomes a 2-element array: `[stream_id, [field1, value1, field2, value2, ...]]`,
/// with fields in insertion order.
///
/// # Examples
///
/// ```text
/// [(1234-0, [("temp", "25")])]
/// // Becomes: *1\r\n*2\r\n$6\r\n1234-0\r\n*2\r\n$4\r\ntemp\r\n$2\r\n25\r\n
/// ```
pub fn parse_stream_entries_to_resp(entries: &[(StreamId, &StreamFields)]) -> RespValue {
    RespValue::Array(
        entries
            .iter()
            .map(|(id, fields)| stream_entry_to_resp(*id, fields))
            .collect(),
    )
}

pub fn stream_entry_to_resp(id: StreamId, fields: &StreamFields) -> RespValue {
    RespValue::Array(vec![
        RespValue::bulk_string(id.to_string()),
        RespValue::array_of_bulk_strings(
            fields
                .iter()
                .flat_map(|(field, value)| [field.clone(), value.clone()]),
        ),
    ])
}

/// One `[key, [entries...]]` element of an XREAD reply.
pub fn stream_read_to_resp(key: &str, entries: &[(StreamId, &StreamFields)]) -> RespValue {
    RespValue::Array(vec![
        RespValue::bulk_string(key.to_string()),
        parse_stream_entries_to_resp(entries),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_entries_to_resp() {
        let fields = vec![
            ("temperature".to_string(), "36".to_string()),
            ("humidity".to_string(), "95".to_string()),
        ];

        let encoded = parse_stream_entries_to_resp(&[(StreamId::new(1526985054069, 0), &fields)]);

        assert_eq!(
            encoded.encode_to_string(),
            "*1\r\n*2\r\n$15\r\n1526985054069-0\r\n*4\r\n$11\r\ntemperature\r\n$2\r\n36\r\n$8\r\nhumidity\r\n$2\r\n95\r\n"
        );
    }
}
