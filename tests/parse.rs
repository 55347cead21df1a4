use nvs_image::partition::crc::{
    crc32,
    crc32_entry,
};
use nvs_image::{
    Diagnostic,
    Error,
    NvsData,
    Value,
};

const PAGE_SIZE: usize = 4096;

/// Stamp an ACTIVE page header with the given sequence number.
fn write_page_header(page: &mut [u8], sequence: u32) {
    page[0..4].copy_from_slice(&0xFFFFFFFE_u32.to_le_bytes());
    page[4..8].copy_from_slice(&sequence.to_le_bytes());
    let crc = crc32(&page[..28]);
    page[28..32].copy_from_slice(&crc.to_le_bytes());
}

/// Hand-write a 32-byte header slot at `slot`, CRC included.
fn write_entry(page: &mut [u8], slot: usize, ns: u8, tag: u8, span: u8, key: &[u8], word: [u8; 8]) {
    let offset = 32 + slot * 32;
    page[offset] = ns;
    page[offset + 1] = tag;
    page[offset + 2] = span;
    page[offset + 3] = 0xFF;
    page[offset + 8..offset + 8 + key.len()].copy_from_slice(key);
    page[offset + 8 + key.len()..offset + 24].fill(0);
    page[offset + 24..offset + 32].copy_from_slice(&word);
    let crc = crc32_entry(&page[offset..offset + 32]);
    page[offset + 4..offset + 8].copy_from_slice(&crc.to_le_bytes());
}

#[test]
fn test_erased_image_decodes_empty() {
    let image = vec![0xFF_u8; 0x6000];
    let decoded = nvs_image::decode(&image).unwrap();
    assert!(decoded.is_empty());
}

#[test]
fn test_all_zero_page_skipped() {
    let mut image = vec![0xFF_u8; 2 * PAGE_SIZE];
    image[..PAGE_SIZE].fill(0);

    let decoded = nvs_image::decode(&image).unwrap();
    assert!(decoded.is_empty());
}

#[test]
fn test_unknown_page_state_skipped() {
    let mut image = vec![0xFF_u8; PAGE_SIZE];
    image[0..4].copy_from_slice(&0x12345678_u32.to_le_bytes());

    let decoded = nvs_image::decode(&image).unwrap();
    assert!(decoded.is_empty());
}

#[test]
fn test_invalid_image_sizes_rejected() {
    assert!(matches!(
        nvs_image::decode(&[]),
        Err(Error::InvalidPartitionSize(0))
    ));
    assert!(matches!(
        nvs_image::decode(&vec![0xFF_u8; 1000]),
        Err(Error::InvalidPartitionSize(1000))
    ));
}

#[test]
fn test_full_page_state_is_walked() {
    let mut data = NvsData::new();
    data.insert("config", "mode", Value::U8(3));
    let mut image = nvs_image::encode(&data, PAGE_SIZE).unwrap();

    // Firmware transitions pages to FULL at runtime; the decoder must
    // still walk them
    image[0..4].copy_from_slice(&0xFFFFFFFC_u32.to_le_bytes());

    let decoded = nvs_image::decode(&image).unwrap();
    assert_eq!(decoded.get("config", "mode"), Some(&Value::U8(3)));
}

#[test]
fn test_unknown_type_tag_skipped() {
    let mut data = NvsData::new();
    data.insert("config", "port", Value::U16(1883));
    data.insert("config", "mode", Value::U8(3));
    let mut image = nvs_image::encode(&data, PAGE_SIZE).unwrap();

    // Slot 2 holds "port"; overwrite its type tag with one from a newer
    // producer
    image[32 + 2 * 32 + 1] = 0x99;

    let decoded = nvs_image::decode(&image).unwrap();
    assert_eq!(decoded.get("config", "port"), None);
    assert_eq!(decoded.get("config", "mode"), Some(&Value::U8(3)));
}

#[test]
fn test_missing_namespace_yields_synthetic_name() {
    let mut data = NvsData::new();
    data.insert("config", "mode", Value::U8(3));
    let mut image = nvs_image::encode(&data, PAGE_SIZE).unwrap();

    // Erase the namespace-definition slot (slot 1)
    image[32 + 32..32 + 2 * 32].fill(0xFF);

    let decoded = nvs_image::decode(&image).unwrap();
    assert_eq!(decoded.get("ns_1", "mode"), Some(&Value::U8(3)));
}

#[test]
fn test_handcrafted_page() {
    let mut page = vec![0xFF_u8; PAGE_SIZE];
    write_page_header(&mut page, 0);

    // Namespace definition: "settings" -> index 1
    let mut word = [0xFF_u8; 8];
    word[0] = 1;
    write_entry(&mut page, 1, 0, 0x01, 1, b"settings", word);

    // String entry "host" = "example\0", length 8, span 2
    let mut word = [0xFF_u8; 8];
    word[..2].copy_from_slice(&8_u16.to_le_bytes());
    write_entry(&mut page, 2, 1, 0x21, 2, b"host", word);
    let payload_offset = 32 + 3 * 32;
    page[payload_offset..payload_offset + 8].copy_from_slice(b"example\0");

    // U32 entry "baud" = 115200
    let mut word = [0xFF_u8; 8];
    word[..4].copy_from_slice(&115200_u32.to_le_bytes());
    write_entry(&mut page, 4, 1, 0x04, 1, b"baud", word);

    let decoded = nvs_image::decode(&page).unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(
        decoded.get("settings", "host"),
        Some(&Value::Str("example".to_string()))
    );
    assert_eq!(decoded.get("settings", "baud"), Some(&Value::U32(115200)));
}

#[test]
fn test_zero_span_does_not_stall() {
    let mut page = vec![0xFF_u8; PAGE_SIZE];
    write_page_header(&mut page, 0);

    let mut word = [0xFF_u8; 8];
    word[0] = 1;
    write_entry(&mut page, 1, 0, 0x01, 1, b"ns", word);

    // Corrupted span byte of 0 must be treated as 1
    let mut word = [0xFF_u8; 8];
    word[0] = 7;
    write_entry(&mut page, 2, 1, 0x01, 0, b"v", word);

    let decoded = nvs_image::decode(&page).unwrap();
    assert_eq!(decoded.get("ns", "v"), Some(&Value::U8(7)));
}

#[test]
fn test_verified_decode_clean_image() {
    let mut data = NvsData::new();
    data.insert("config", "ssid", Value::Str("net".to_string()));
    data.insert("config", "port", Value::U16(1883));
    let image = nvs_image::encode(&data, 0x6000).unwrap();

    let (decoded, diagnostics) = nvs_image::decode_verified(&image).unwrap();
    assert_eq!(decoded, data);
    assert!(diagnostics.is_empty());
}

#[test]
fn test_verified_decode_reports_corrupt_entry() {
    let mut data = NvsData::new();
    data.insert("config", "port", Value::U16(1883));
    let mut image = nvs_image::encode(&data, PAGE_SIZE).unwrap();

    // Flip a bit in the stored value of slot 2 without fixing the CRC
    image[32 + 2 * 32 + 24] ^= 0x01;

    let (decoded, diagnostics) = nvs_image::decode_verified(&image).unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(
        &diagnostics[0],
        Diagnostic::CorruptEntry { page: 0, slot: 2, key, .. } if key == "port"
    ));

    // The walk still returns the (corrupted) value
    assert_eq!(decoded.get("config", "port"), Some(&Value::U16(1882)));
}

#[test]
fn test_verified_decode_reports_corrupt_page_header() {
    let mut data = NvsData::new();
    data.insert("config", "port", Value::U16(1883));
    let mut image = nvs_image::encode(&data, PAGE_SIZE).unwrap();

    // Corrupt the sequence number without restamping the header CRC
    image[4] ^= 0x01;

    let (decoded, diagnostics) = nvs_image::decode_verified(&image).unwrap();
    assert!(matches!(
        &diagnostics[0],
        Diagnostic::CorruptPageHeader { page: 0, .. }
    ));
    assert_eq!(decoded.get("config", "port"), Some(&Value::U16(1883)));
}

#[test]
fn test_verified_decode_reports_unknown_namespace() {
    let mut page = vec![0xFF_u8; PAGE_SIZE];
    write_page_header(&mut page, 0);

    let mut word = [0xFF_u8; 8];
    word[0] = 9;
    write_entry(&mut page, 1, 5, 0x01, 1, b"orphan", word);

    let (decoded, diagnostics) = nvs_image::decode_verified(&page).unwrap();
    assert_eq!(decoded.get("ns_5", "orphan"), Some(&Value::U8(9)));
    assert!(diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::UnknownNamespace { index: 5, .. })));
}
