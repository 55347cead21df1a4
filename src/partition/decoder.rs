use std::collections::HashMap;

use log::warn;

use crate::data::{
    NvsData,
    Value,
};
use crate::error::Error;
use crate::partition::consts::*;
use crate::partition::crc::{
    crc32,
    crc32_entry,
};

/// A non-fatal anomaly found while decoding in verifying mode.
///
/// Diagnostics never abort the walk; the decoded data is still returned
/// alongside them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    #[error("page {page} header CRC mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    CorruptPageHeader {
        page: usize,
        stored: u32,
        computed: u32,
    },

    #[error(
        "entry CRC mismatch at page {page}, slot {slot} (key '{key}'): \
         stored {stored:#010x}, computed {computed:#010x}"
    )]
    CorruptEntry {
        page: usize,
        slot: usize,
        key: String,
        stored: u32,
        computed: u32,
    },

    #[error("unknown type tag {tag:#04x} at page {page}, slot {slot}")]
    UnknownTypeTag { page: usize, slot: usize, tag: u8 },

    #[error("data entry '{key}' references unrecorded namespace index {index}")]
    UnknownNamespace { index: u8, key: String },
}

/// Decode an NVS partition image into its namespace/key/value contents.
///
/// The walk is conservative: CRCs are not validated (the on-device NVS
/// library validates at read time), unknown type tags are skipped by one
/// slot, and data referencing an unrecorded namespace index is preserved
/// under a synthetic `ns_<index>` name.
pub(crate) fn decode_image(bytes: &[u8]) -> Result<NvsData, Error> {
    decode_inner(bytes, false).map(|(data, _)| data)
}

/// Decode with per-page and per-entry CRC verification.
///
/// CRC mismatches are reported as [`Diagnostic`]s without aborting the
/// walk, so the returned data is the same best-effort result as
/// [`decode_image`].
pub(crate) fn decode_image_verified(bytes: &[u8]) -> Result<(NvsData, Vec<Diagnostic>), Error> {
    decode_inner(bytes, true)
}

fn decode_inner(bytes: &[u8], verify: bool) -> Result<(NvsData, Vec<Diagnostic>), Error> {
    if bytes.is_empty() || !bytes.len().is_multiple_of(PAGE_SIZE) {
        return Err(Error::InvalidPartitionSize(bytes.len()));
    }

    let mut data = NvsData::new();
    let mut diagnostics = Vec::new();
    let mut namespaces: HashMap<u8, String> = HashMap::new();

    for (page_idx, page) in bytes.chunks_exact(PAGE_SIZE).enumerate() {
        let state = read_u32(page, 0);
        match state {
            PAGE_STATE_ACTIVE | PAGE_STATE_FULL => {}
            PAGE_STATE_EMPTY | 0 => continue,
            _ => {
                warn!("skipping page {page_idx} with unknown state {state:#010x}");
                continue;
            }
        }

        if verify {
            let stored = read_u32(page, 28);
            let computed = crc32(&page[..28]);
            if stored != computed {
                diagnostics.push(Diagnostic::CorruptPageHeader {
                    page: page_idx,
                    stored,
                    computed,
                });
            }
        }

        let mut slot = FIRST_ENTRY_SLOT;
        while slot < SLOTS_PER_PAGE {
            let offset = PAGE_HEADER_SIZE + slot * ENTRY_SIZE;
            let entry = &page[offset..offset + ENTRY_SIZE];

            let ns_index = entry[0];
            if ns_index == 0xFF {
                // Erased slot
                slot += 1;
                continue;
            }

            let type_tag = entry[1];
            let span = sanitize_span(entry[2], page_idx, slot);
            let key = read_key(&entry[8..24]);

            if verify {
                let stored = read_u32(entry, 4);
                let computed = crc32_entry(entry);
                if stored != computed {
                    diagnostics.push(Diagnostic::CorruptEntry {
                        page: page_idx,
                        slot,
                        key: key.clone(),
                        stored,
                        computed,
                    });
                }
            }

            // Namespace definition: record the index-to-name mapping
            if ns_index == NS_INDEX_DEFINITION && type_tag == TYPE_U8 {
                namespaces.insert(entry[24], key);
                slot += span;
                continue;
            }

            let value = match type_tag {
                TYPE_U8 => Value::U8(entry[24]),
                TYPE_I8 => Value::I8(entry[24] as i8),
                TYPE_U16 => Value::U16(read_u16(entry, 24)),
                TYPE_I16 => Value::I16(read_u16(entry, 24) as i16),
                TYPE_U32 => Value::U32(read_u32(entry, 24)),
                TYPE_I32 => Value::I32(read_u32(entry, 24) as i32),
                TYPE_STR => decode_str(read_payload(page, slot, span, read_u16(entry, 24))),
                TYPE_BLOB => Value::Blob(read_payload(page, slot, span, read_u16(entry, 24))),
                _ => {
                    // Possibly written by a newer producer; skip one slot
                    warn!("skipping unknown type tag {type_tag:#04x} at page {page_idx}, slot {slot}");
                    if verify {
                        diagnostics.push(Diagnostic::UnknownTypeTag {
                            page: page_idx,
                            slot,
                            tag: type_tag,
                        });
                    }
                    slot += 1;
                    continue;
                }
            };

            let ns_name = match namespaces.get(&ns_index) {
                Some(name) => name.clone(),
                None => {
                    warn!("entry '{key}' references unrecorded namespace index {ns_index}");
                    if verify {
                        diagnostics.push(Diagnostic::UnknownNamespace {
                            index: ns_index,
                            key: key.clone(),
                        });
                    }
                    format!("ns_{ns_index}")
                }
            };

            data.insert(&ns_name, &key, value);
            slot += span;
        }
    }

    Ok((data, diagnostics))
}

/// Clamp a raw span byte so the slot walk always advances and never leaves
/// the page.
fn sanitize_span(raw: u8, page_idx: usize, slot: usize) -> usize {
    let mut span = raw as usize;
    if span == 0 {
        warn!("entry at page {page_idx}, slot {slot} has span 0, treating as 1");
        span = 1;
    }
    if slot + span > SLOTS_PER_PAGE {
        warn!("entry at page {page_idx}, slot {slot} has span {span} crossing the page boundary");
        span = SLOTS_PER_PAGE - slot;
    }
    span
}

/// Collect up to `len` payload bytes from the continuation slots following
/// `slot`, clamped to what the span actually covers on this page.
fn read_payload(page: &[u8], slot: usize, span: usize, len: u16) -> Vec<u8> {
    let start = PAGE_HEADER_SIZE + (slot + 1) * ENTRY_SIZE;
    let available = span.saturating_sub(1) * ENTRY_SIZE;
    let take = (len as usize).min(available).min(page.len() - start);
    page[start..start + take].to_vec()
}

/// A stored string is null-terminated; its recorded length includes the
/// terminator. Truncate at the first null byte.
fn decode_str(payload: Vec<u8>) -> Value {
    let end = payload
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(payload.len());
    Value::Str(String::from_utf8_lossy(&payload[..end]).into_owned())
}

fn read_key(field: &[u8]) -> String {
    let len = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..len]).into_owned()
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(data[offset..offset + 2].try_into().unwrap())
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(data[offset..offset + 4].try_into().unwrap())
}
