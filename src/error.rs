use thiserror::Error;

/// Errors that can occur while loading, patching or writing a firmware image.
#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse Intel HEX: {0}")]
    HexReadError(#[from] ihex::ReaderError),

    #[error("failed to write Intel HEX: {0}")]
    HexWriteError(#[from] ihex::WriterError),

    /// The region has to hold at least the 4-byte checksum slot.
    #[error("flash region size {0} is too small to hold a 4-byte checksum")]
    RegionTooSmall(u32),

    #[error("flash region {start:#010x} + {size} exceeds the 32-bit address space")]
    RegionOutOfRange { start: u32, size: u32 },

    #[error("conflicting data at address {0:#010x}")]
    AddressOverlap(u32),

    #[error("data at address {0:#010x} exceeds the 32-bit address space")]
    AddressOverflow(u32),

    #[error("multiple start address records")]
    DuplicateStartAddress,
}
