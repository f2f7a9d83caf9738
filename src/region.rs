use std::ops::{
    Range,
    RangeInclusive,
};

use crate::consts::CRC_SIZE;
use crate::error::Error;

/// The absolute address window a firmware image occupies in flash.
///
/// The last [`CRC_SIZE`] bytes of the window are reserved for the checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashRegion {
    start_address: u32,
    size: u32,
}

impl FlashRegion {
    /// Create a region starting at `start_address` spanning `size` bytes.
    ///
    /// The region must be large enough for the checksum slot and its last
    /// byte must lie inside the 32-bit address space.
    pub fn new(start_address: u32, size: u32) -> Result<Self, Error> {
        if (size as usize) < CRC_SIZE {
            return Err(Error::RegionTooSmall(size));
        }
        if start_address.checked_add(size - 1).is_none() {
            return Err(Error::RegionOutOfRange {
                start: start_address,
                size,
            });
        }
        Ok(Self {
            start_address,
            size,
        })
    }

    pub fn start_address(&self) -> u32 {
        self.start_address
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// First address past the end of the region.
    ///
    /// A region ending at the top of the address space ends at `1 << 32`.
    pub fn end_address(&self) -> u64 {
        self.start_address as u64 + self.size as u64
    }

    /// Address of the last byte in the region.
    pub fn last_address(&self) -> u32 {
        self.start_address + (self.size - 1)
    }

    /// Address of the first checksum byte.
    pub fn checksum_address(&self) -> u32 {
        self.start_address + (self.size - CRC_SIZE as u32)
    }

    /// Addresses covered by firmware data, excluding the checksum slot.
    pub fn payload_range(&self) -> Range<u32> {
        self.start_address..self.checksum_address()
    }

    /// Addresses of the checksum slot.
    pub fn checksum_range(&self) -> RangeInclusive<u32> {
        self.checksum_address()..=self.last_address()
    }

    pub fn contains(&self, address: u32) -> bool {
        (self.start_address..=self.last_address()).contains(&address)
    }
}

impl std::fmt::Display for FlashRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:#010x}..{:#010x} ({} bytes)",
            self.start_address,
            self.end_address(),
            self.size
        )
    }
}
