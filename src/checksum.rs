use ::crc::{
    Crc,
    CRC_32_MPEG_2,
};

use crate::consts::CRC_SIZE;

/// CRC-32/MPEG-2: poly 0x04C11DB7, init 0xFFFFFFFF, no reflection, no final
/// XOR.
pub const CRC32_MPEG2: Crc<u32> = Crc::<u32>::new(&CRC_32_MPEG_2);

/// Compute the CRC-32/MPEG-2 checksum of `data`.
pub fn crc32_mpeg2(data: &[u8]) -> u32 {
    CRC32_MPEG2.checksum(data)
}

/// Serialize a checksum the way it is stored in flash (little-endian).
pub fn checksum_bytes(checksum: u32) -> [u8; CRC_SIZE] {
    checksum.to_le_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Bit-at-a-time MSB-first reference.
    fn reference(data: &[u8]) -> u32 {
        let mut crc: u32 = 0xFFFFFFFF;
        for &byte in data {
            crc ^= (byte as u32) << 24;
            for _ in 0..8 {
                if crc & 0x8000_0000 != 0 {
                    crc = (crc << 1) ^ 0x04C11DB7;
                } else {
                    crc <<= 1;
                }
            }
        }
        crc
    }

    #[test]
    fn test_check_value() {
        assert_eq!(crc32_mpeg2(b"123456789"), 0x0376E6E7);
    }

    #[test]
    fn test_empty_input_is_init_value() {
        assert_eq!(crc32_mpeg2(&[]), 0xFFFFFFFF);
    }

    #[test]
    fn test_matches_reference() {
        let erased = vec![0xFF; 1020];
        let counting: Vec<u8> = (0..=255u8).cycle().take(777).collect();

        for data in [&[0xAA; 12][..], erased.as_slice(), counting.as_slice()] {
            assert_eq!(crc32_mpeg2(data), reference(data));
        }
        assert_eq!(crc32_mpeg2(&[0xAA; 12]), 0xCC8B8823);
    }

    #[test]
    fn test_differs_from_zlib_crc() {
        // CRC-32/ISO-HDLC of "123456789" is 0xCBF43926
        assert_ne!(crc32_mpeg2(b"123456789"), 0xCBF43926);
    }

    #[test]
    fn test_checksum_bytes_little_endian() {
        assert_eq!(checksum_bytes(0xCC8B8823), [0x23, 0x88, 0x8B, 0xCC]);
    }
}
