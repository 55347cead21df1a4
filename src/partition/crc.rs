/// Compute an NVS entry CRC over all bytes except the CRC field at offset 4..8.
///
/// # Panics
/// Panics if `entry` is shorter than 32 bytes.
pub fn crc32_entry(entry: &[u8]) -> u32 {
    assert!(
        entry.len() >= 32,
        "crc32_entry requires at least 32 bytes, got {}",
        entry.len()
    );
    let mut window = [0u8; 28];
    window[..4].copy_from_slice(&entry[0..4]);
    window[4..].copy_from_slice(&entry[8..32]);
    crc32(&window)
}

/// CRC32 using the IEEE 802.3 polynomial (0xEDB88320, bit-reversed
/// 0x04C11DB7), init 0xFFFFFFFF, final XOR 0xFFFFFFFF.
///
/// This matches the checksum the ESP-IDF reference generator stamps on NVS
/// page headers and entries.
///
/// This function is intentionally public so that callers can verify or
/// compute CRCs over NVS data independently of the higher-level codec APIs.
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFFFFFF;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB88320;
            } else {
                crc >>= 1;
            }
        }
    }

    !crc
}
