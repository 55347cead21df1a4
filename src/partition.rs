pub mod crc;

pub(crate) mod consts;
pub(crate) mod decoder;
pub(crate) mod encoder;

pub use consts::PAGE_SIZE;
pub use decoder::Diagnostic;

use crate::data::NvsData;
use crate::error::Error;

/// Encode `data` into an NVS partition image of exactly `size` bytes.
///
/// `size` must be a positive multiple of 4096. The output is
/// deterministic: identical inputs produce byte-identical images.
pub fn encode(data: &NvsData, size: usize) -> Result<Vec<u8>, Error> {
    encoder::encode_image(data, size)
}

/// Decode an NVS partition image into its namespace/key/value contents.
pub fn decode(bytes: &[u8]) -> Result<NvsData, Error> {
    decoder::decode_image(bytes)
}

/// Decode an NVS partition image, verifying page-header and entry CRCs.
///
/// Mismatches are reported as [`Diagnostic`]s alongside the decoded data
/// rather than aborting the walk.
pub fn decode_verified(bytes: &[u8]) -> Result<(NvsData, Vec<Diagnostic>), Error> {
    decoder::decode_image_verified(bytes)
}
