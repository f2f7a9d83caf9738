// Erased flash state, used for padding and for gaps in the HEX image.
pub const FILL_BYTE: u8 = 0xFF;

// Size of the checksum slot at the tail of the flash region.
pub const CRC_SIZE: usize = 4;

// Data bytes per Intel HEX data record.
pub const HEX_RECORD_LENGTH: usize = 16;

// Address span covered by one extended linear address record.
pub const HEX_SEGMENT_SIZE: u32 = 0x1_0000;
