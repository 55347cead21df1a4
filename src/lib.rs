pub mod csv_parser;
pub mod csv_writer;
pub mod data;
pub mod error;
pub mod partition;

pub use csv_parser::parse_csv;
pub use csv_writer::write_csv;
pub use data::{
    Namespace,
    NvsData,
    Value,
    MAX_KEY_LENGTH,
};
pub use error::Error;
pub use partition::{
    decode,
    decode_verified,
    encode,
    Diagnostic,
    PAGE_SIZE,
};

pub type Result<T> = std::result::Result<T, Error>;
