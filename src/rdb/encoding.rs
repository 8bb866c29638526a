use bytes::Buf;

use crate::rdb::rdb_parser::RdbError;

/// What the first byte(s) of a length-prefixed field announce.
#[derive(Debug, PartialEq)]
pub enum LengthEncoding {
    Length(usize),
    Int8,
    Int16,
    Int32,
    LzfCompressedString,
}

fn ensure_remaining(buffer: &&[u8], needed: usize) -> Result<(), RdbError> {
    if buffer.remaining() < needed {
        return Err(RdbError::UnexpectedEof);
    }

    Ok(())
}

pub fn read_u8(buffer: &mut &[u8]) -> Result<u8, RdbError> {
    ensure_remaining(buffer, 1)?;
    Ok(buffer.get_u8())
}

pub fn read_u32_le(buffer: &mut &[u8]) -> Result<u32, RdbError> {
    ensure_remaining(buffer, 4)?;
    Ok(buffer.get_u32_le())
}

pub fn read_u64_le(buffer: &mut &[u8]) -> Result<u64, RdbError> {
    ensure_remaining(buffer, 8)?;
    Ok(buffer.get_u64_le())
}

/// Decodes a length prefix. The two most significant bits of the first byte
/// select the format:
///
/// * `00` - the remaining 6 bits are the length
/// * `01` - the remaining 6 bits and the next byte form a 14-bit length
/// * `10` - `0x80` is followed by a 32-bit big-endian length, `0x81` by a 64-bit one
/// * `11` - a special encoding, the remaining 6 bits say which
pub fn read_length_encoding(buffer: &mut &[u8]) -> Result<LengthEncoding, RdbError> {
    let first = read_u8(buffer)?;

    match first >> 6 {
        0b00 => Ok(LengthEncoding::Length((first & 0b0011_1111) as usize)),
        0b01 => {
            let second = read_u8(buffer)?;
            let length = (((first & 0b0011_1111) as usize) << 8) | second as usize;

            Ok(LengthEncoding::Length(length))
        }
        0b10 => match first {
            0x80 => {
                ensure_remaining(buffer, 4)?;
                Ok(LengthEncoding::Length(buffer.get_u32() as usize))
            }
            0x81 => {
                ensure_remaining(buffer, 8)?;
                let length = usize::try_from(buffer.get_u64())
                    .map_err(|_| RdbError::InvalidLengthEncoding(first))?;

                Ok(LengthEncoding::Length(length))
            }
            _ => Err(RdbError::InvalidLengthEncoding(first)),
        },
        _ => match first & 0b0011_1111 {
            0 => Ok(LengthEncoding::Int8),
            1 => Ok(LengthEncoding::Int16),
            2 => Ok(LengthEncoding::Int32),
            3 => Ok(LengthEncoding::LzfCompressedString),
            _ => Err(RdbError::InvalidLengthEncoding(first)),
        },
    }
}

/// Reads a plain length, as used by section headers.
pub fn read_length(buffer: &mut &[u8]) -> Result<usize, RdbError> {
    match read_length_encoding(buffer)? {
        LengthEncoding::Length(length) => Ok(length),
        other => Err(RdbError::UnexpectedEncoding(format!("{:?}", other))),
    }
}

/// Reads a length-prefixed string. Integer encodings are little-endian and
/// come back as their decimal text.
pub fn read_string(buffer: &mut &[u8]) -> Result<String, RdbError> {
    match read_length_encoding(buffer)? {
        LengthEncoding::Length(length) => {
            ensure_remaining(buffer, length)?;

            // Consumed even when invalid, so the caller can skip the record.
            let (bytes, rest) = buffer.split_at(length);
            *buffer = rest;

            String::from_utf8(bytes.to_vec()).map_err(|_| RdbError::InvalidString)
        }
        LengthEncoding::Int8 => {
            ensure_remaining(buffer, 1)?;
            Ok(buffer.get_i8().to_string())
        }
        LengthEncoding::Int16 => {
            ensure_remaining(buffer, 2)?;
            Ok(buffer.get_i16_le().to_string())
        }
        LengthEncoding::Int32 => {
            ensure_remaining(buffer, 4)?;
            Ok(buffer.get_i32_le().to_string())
        }
        LengthEncoding::LzfCompressedString => Err(RdbError::UnsupportedCompression),
    }
}
