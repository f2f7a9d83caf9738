#![doc = include_str!("../README.md")]

pub mod checksum;
pub mod error;
pub mod image;
pub mod intel_hex;
pub mod region;

mod consts;

use std::path::Path;

pub use checksum::{
    checksum_bytes,
    crc32_mpeg2,
};
pub use consts::{
    CRC_SIZE,
    FILL_BYTE,
};
pub use error::Error;
pub use image::BinaryImage;
pub use intel_hex::{
    HexImage,
    Overlap,
    StartAddress,
};
pub use region::FlashRegion;

/// Both outputs of a patch run, plus the checksum they carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchedFirmware {
    /// CRC-32/MPEG-2 over the padded image without its checksum slot.
    pub checksum: u32,
    /// The padded image with the checksum in its last four bytes.
    pub binary: Vec<u8>,
    /// The HEX image covering `region`, with the checksum at its tail.
    pub hex: HexImage,
}

/// Patch a firmware image in memory.
///
/// `binary` is padded with [`FILL_BYTE`] up to the region size, its trailing
/// checksum slot is replaced by the CRC-32/MPEG-2 of everything before it.
/// The HEX output starts out erased over the region, takes every byte of
/// `hex` on top and ends with the same checksum in the region's last four
/// addresses.
///
/// A `binary` longer than the region is not rejected: the checksum then
/// covers all of it except its own last four bytes.
pub fn patch_firmware(
    region: &FlashRegion,
    binary: Vec<u8>,
    hex: &HexImage,
) -> Result<PatchedFirmware, Error> {
    let flash_size = region.size() as usize;
    let mut image = BinaryImage::new(binary);
    if image.len() > flash_size {
        log::warn!(
            "binary image is {} bytes, larger than the {} byte flash region",
            image.len(),
            flash_size
        );
    }

    image.pad_to(flash_size);
    image.strip_checksum_slot();
    let checksum = crc32_mpeg2(image.as_bytes());
    log::debug!("checksum {:#010x} over {} bytes", checksum, image.len());
    image.append_checksum(checksum);

    let outside = hex
        .iter()
        .filter(|&(address, _)| !region.contains(address))
        .count();
    if outside > 0 {
        log::debug!("{} bytes of HEX data lie outside {}", outside, region);
    }

    let mut out = HexImage::filled(region.payload_range(), FILL_BYTE);
    out.merge(hex, Overlap::Replace)?;
    out.puts(region.checksum_address(), &checksum_bytes(checksum))?;

    Ok(PatchedFirmware {
        checksum,
        binary: image.into_bytes(),
        hex: out,
    })
}

/// Patch the firmware files at `bin_path` and `hex_path` in place and return
/// the checksum.
///
/// Both files are read before either is rewritten.
pub fn patch_firmware_files<P: AsRef<Path>, Q: AsRef<Path>>(
    region: &FlashRegion,
    bin_path: P,
    hex_path: Q,
) -> Result<u32, Error> {
    let bin_path = bin_path.as_ref();
    let hex_path = hex_path.as_ref();

    log::info!("reading binary image {}", bin_path.display());
    let binary = BinaryImage::from_file(bin_path)?;
    log::info!("reading Intel HEX file {}", hex_path.display());
    let hex = HexImage::from_hex_file(hex_path)?;

    log::debug!("flash region {}", region);
    let patched = patch_firmware(region, binary.into_bytes(), &hex)?;

    log::info!(
        "writing {} bytes to {}",
        patched.binary.len(),
        bin_path.display()
    );
    BinaryImage::new(patched.binary).write_file(bin_path)?;
    log::info!("writing Intel HEX file {}", hex_path.display());
    patched.hex.write_hex_file(hex_path)?;

    Ok(patched.checksum)
}
