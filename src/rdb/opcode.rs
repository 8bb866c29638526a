pub const METADATA_OPCODE: u8 = 0xFA;
pub const RESIZE_DB_OPCODE: u8 = 0xFB;
pub const EXPIRATION_MILLISECONDS_OPCODE: u8 = 0xFC;
pub const EXPIRATION_SECONDS_OPCODE: u8 = 0xFD;
pub const DATABASE_OPCODE: u8 = 0xFE;
pub const END_OF_FILE_OPCODE: u8 = 0xFF;
pub const STRING_VALUE_TYPE: u8 = 0x00;

/// A section tag, or the value type that starts a key record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    Metadata,
    ResizeDb,
    Database,
    ExpirationSeconds,
    ExpirationMilliseconds,
    EndOfFile,
    ValueType(u8),
}

impl From<u8> for OpCode {
    fn from(byte: u8) -> Self {
        match byte {
            METADATA_OPCODE => OpCode::Metadata,
            RESIZE_DB_OPCODE => OpCode::ResizeDb,
            DATABASE_OPCODE => OpCode::Database,
            EXPIRATION_SECONDS_OPCODE => OpCode::ExpirationSeconds,
            EXPIRATION_MILLISECONDS_OPCODE => OpCode::ExpirationMilliseconds,
            END_OF_FILE_OPCODE => OpCode::EndOfFile,
            value_type => OpCode::ValueType(value_type),
        }
    }
}
