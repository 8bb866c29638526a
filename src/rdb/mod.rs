mod encoding;
mod opcode;
mod rdb_file_operations;
mod rdb_parser;

pub use rdb_file_operations::{empty_rdb_file, load_rdb_file};
pub use rdb_parser::{parse_rdb, RdbError, RdbParser, RdbSnapshot};
