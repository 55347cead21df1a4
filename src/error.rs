use thiserror::Error;

/// Errors that can occur during CSV parsing, image generation, or image
/// parsing of NVS partitions.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("hex decoding error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("key '{0}' is too long ({1} bytes, max 15)")]
    KeyTooLong(String, usize),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("unsupported value: {0}")]
    ValueUnsupported(String),

    #[error("value for key '{0}' is too large ({1} bytes, max 65535)")]
    ValueTooLarge(String, usize),

    #[error("too many namespaces (max 254)")]
    TooManyNamespaces,

    #[error("partition size {0} is too small to hold all entries")]
    PartitionTooSmall(usize),

    #[error("invalid partition size {0}: must be a positive multiple of 4096 bytes")]
    InvalidPartitionSize(usize),

    #[error("invalid entry type: {0}")]
    InvalidType(String),

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("missing namespace")]
    MissingNamespace,
}
