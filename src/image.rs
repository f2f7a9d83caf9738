use std::fs;
use std::io::Write;
use std::path::Path;

use crate::checksum::checksum_bytes;
use crate::consts::{
    CRC_SIZE,
    FILL_BYTE,
};
use crate::error::Error;

/// A raw firmware image, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryImage {
    data: Vec<u8>,
}

impl BinaryImage {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Read a binary image from `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Ok(Self::new(fs::read(path)?))
    }

    /// Write the image to `path`, replacing any existing file.
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        fs::File::create(path)?.write_all(&self.data)?;
        Ok(())
    }

    /// Right-pad the image with erased flash bytes up to `size`.
    ///
    /// Images that are already `size` bytes or longer are left unchanged.
    pub fn pad_to(&mut self, size: usize) {
        if self.data.len() < size {
            self.data.resize(size, FILL_BYTE);
        }
    }

    /// Drop the trailing checksum slot.
    ///
    /// An image shorter than the slot ends up empty.
    pub fn strip_checksum_slot(&mut self) {
        let len = self.data.len().saturating_sub(CRC_SIZE);
        self.data.truncate(len);
    }

    /// Append `checksum` little-endian.
    pub fn append_checksum(&mut self, checksum: u32) {
        self.data.extend_from_slice(&checksum_bytes(checksum));
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
