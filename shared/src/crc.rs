const POLYNOMIAL: u32 = 0xEDB8_8320;

static TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut index = 0;

    while index < 256 {
        let mut entry = index as u32;
        let mut bit = 0;
        while bit < 8 {
            entry = if entry & 1 == 1 {
                (entry >> 1) ^ POLYNOMIAL
            } else {
                entry >> 1
            };
            bit += 1;
        }

        table[index] = entry;
        index += 1;
    }

    table
}

/// Checksum stored after each table page payload.
///
/// Reflected CRC-32 with the 0x04C11DB7 polynomial, initial value and final
/// XOR of all ones. Byte-at-a-time over a table built at compile time, so a
/// 12x12 page costs a few hundred lookups at setup.
pub fn crc32_ieee(bytes: &[u8]) -> u32 {
    !bytes.iter().fold(u32::MAX, |crc, &byte| {
        TABLE[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        assert_eq!(crc32_ieee(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(crc32_ieee(&[]), 0);
    }

    #[test]
    fn test_table_entries() {
        assert_eq!(TABLE[0], 0);
        assert_eq!(TABLE[1], 0x7707_3096);
        assert_eq!(TABLE[255], 0x2D02_EF8D);
    }

    #[test]
    fn test_single_bit_flip_changes_checksum() {
        let page = [0x03, 0x00, 0x64, 0xC8, 0x01];
        let mut flipped = page;
        flipped[4] ^= 0x01;

        assert_ne!(crc32_ieee(&page), crc32_ieee(&flipped));
    }
}
