/// Number of hash slots a cluster keyspace is divided into.
pub const SLOT_COUNT: u16 = 16384;

/// Computes the hash slot owning `key`.
///
/// Uses CRC16/XMODEM over the key, or over the first non-empty `{...}`
/// hashtag when one is present, so related channels can be pinned to the
/// same node.
pub fn key_slot(key: &[u8]) -> u16 {
    crc16(hashtag(key)) % SLOT_COUNT
}

fn hashtag(key: &[u8]) -> &[u8] {
    let Some(open) = key.iter().position(|b| *b == b'{') else {
        return key;
    };
    match key[open + 1..].iter().position(|b| *b == b'}') {
        Some(0) | None => key,
        Some(len) => &key[open + 1..open + 1 + len],
    }
}

fn crc16(bytes: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for byte in bytes {
        crc ^= (*byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}
