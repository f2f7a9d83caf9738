use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::ops::Range;
use std::path::Path;

use ihex::{
    Reader,
    Record,
};

use crate::consts::{
    HEX_RECORD_LENGTH,
    HEX_SEGMENT_SIZE,
};
use crate::error::Error;

/// Execution start address carried by an Intel HEX file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartAddress {
    /// Record type 03, `CS:IP` for 80x86 real mode.
    Segment { cs: u16, ip: u16 },
    /// Record type 05, a 32-bit `EIP`.
    Linear(u32),
}

/// How [`HexImage::merge`] resolves an address present in both images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Overlap {
    /// Fail with [`Error::AddressOverlap`].
    Error,
    /// Keep the value already present.
    Ignore,
    /// Take the value from the merged image.
    #[default]
    Replace,
}

/// A sparse byte image keyed by absolute address, as read from or written to
/// an Intel HEX file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HexImage {
    data: BTreeMap<u32, u8>,
    start_address: Option<StartAddress>,
}

impl HexImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an image with every address in `range` set to `value`.
    pub fn filled(range: Range<u32>, value: u8) -> Self {
        let mut image = Self::new();
        image.fill(range, value);
        image
    }

    /// Parse Intel HEX records from a string.
    ///
    /// Writing the same address twice or carrying more than one start address
    /// record is rejected.
    pub fn from_hex_str(content: &str) -> Result<Self, Error> {
        let mut image = Self::new();
        if content.trim().is_empty() {
            return Ok(image);
        }

        let mut base_address: u32 = 0;
        for record in Reader::new(content) {
            match record? {
                Record::Data { offset, value } => {
                    let address = base_address
                        .checked_add(offset as u32)
                        .ok_or(Error::AddressOverflow(base_address))?;
                    for (i, byte) in value.into_iter().enumerate() {
                        let address = address
                            .checked_add(i as u32)
                            .ok_or(Error::AddressOverflow(address))?;
                        if image.data.insert(address, byte).is_some() {
                            return Err(Error::AddressOverlap(address));
                        }
                    }
                }
                Record::EndOfFile => (),
                Record::ExtendedSegmentAddress(segment) => {
                    base_address = (segment as u32) * 16;
                }
                Record::StartSegmentAddress { cs, ip } => {
                    image.set_start_once(StartAddress::Segment { cs, ip })?;
                }
                Record::ExtendedLinearAddress(upper) => {
                    base_address = (upper as u32) << 16;
                }
                Record::StartLinearAddress(eip) => {
                    image.set_start_once(StartAddress::Linear(eip))?;
                }
            }
        }

        log::debug!(
            "parsed {} bytes of Intel HEX data{}",
            image.len(),
            image
                .address_range()
                .map(|r| format!(" spanning {:#010x}..={:#010x}", r.start(), r.end()))
                .unwrap_or_default()
        );
        Ok(image)
    }

    /// Parse the Intel HEX file at `path`.
    pub fn from_hex_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        Self::from_hex_str(&content)
    }

    /// Serialize the image to Intel HEX and return the content as a `String`.
    ///
    /// The start address record, if any, comes first. Data records hold at
    /// most 16 contiguous bytes inside one 64 KiB segment, and an extended
    /// linear address record precedes each segment change.
    pub fn to_hex_string(&self) -> Result<String, Error> {
        let mut content = ihex::create_object_file_representation(&self.to_records())?;
        if !content.ends_with('\n') {
            content.push('\n');
        }
        Ok(content)
    }

    /// Serialize the image to the Intel HEX file at `path`, replacing any
    /// existing file.
    pub fn write_hex_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let content = self.to_hex_string()?;
        fs::File::create(path)?.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Build the record list for this image, terminated by an end-of-file
    /// record.
    pub fn to_records(&self) -> Vec<Record> {
        let mut records = Vec::new();

        match self.start_address {
            Some(StartAddress::Segment { cs, ip }) => {
                records.push(Record::StartSegmentAddress { cs, ip })
            }
            Some(StartAddress::Linear(eip)) => records.push(Record::StartLinearAddress(eip)),
            None => (),
        }

        // Images confined to the first segment need no address records at all.
        let mut segment = match self.address_range() {
            Some(range) if *range.end() >= HEX_SEGMENT_SIZE => None,
            _ => Some(0u16),
        };

        let mut chunk_start = 0u32;
        let mut chunk: Vec<u8> = Vec::with_capacity(HEX_RECORD_LENGTH);
        for (&address, &value) in &self.data {
            if !chunk.is_empty() {
                let next = chunk_start.wrapping_add(chunk.len() as u32);
                let boundary = next % HEX_SEGMENT_SIZE == 0;
                if address != next || boundary || chunk.len() == HEX_RECORD_LENGTH {
                    push_data(&mut records, &mut segment, chunk_start, &mut chunk);
                }
            }
            if chunk.is_empty() {
                chunk_start = address;
            }
            chunk.push(value);
        }
        if !chunk.is_empty() {
            push_data(&mut records, &mut segment, chunk_start, &mut chunk);
        }

        records.push(Record::EndOfFile);
        records
    }

    pub fn get(&self, address: u32) -> Option<u8> {
        self.data.get(&address).copied()
    }

    pub fn insert(&mut self, address: u32, value: u8) -> Option<u8> {
        self.data.insert(address, value)
    }

    /// Set every address in `range` to `value`.
    pub fn fill(&mut self, range: Range<u32>, value: u8) {
        for address in range {
            self.data.insert(address, value);
        }
    }

    /// Write `bytes` to consecutive addresses starting at `address`.
    pub fn puts(&mut self, address: u32, bytes: &[u8]) -> Result<(), Error> {
        if !bytes.is_empty() && address.checked_add(bytes.len() as u32 - 1).is_none() {
            return Err(Error::AddressOverflow(address));
        }
        for (i, &byte) in bytes.iter().enumerate() {
            self.data.insert(address + i as u32, byte);
        }
        Ok(())
    }

    /// Merge `other` into this image.
    ///
    /// Addresses only present in `other` are added. Addresses present in both
    /// are resolved by `overlap`, even when both hold the same value. Start
    /// addresses only conflict when they differ.
    pub fn merge(&mut self, other: &HexImage, overlap: Overlap) -> Result<(), Error> {
        for (&address, &value) in &other.data {
            match self.data.entry(address) {
                Entry::Vacant(entry) => {
                    entry.insert(value);
                }
                Entry::Occupied(mut entry) => match overlap {
                    Overlap::Error => return Err(Error::AddressOverlap(address)),
                    Overlap::Ignore => (),
                    Overlap::Replace => {
                        entry.insert(value);
                    }
                },
            }
        }

        match (self.start_address, other.start_address) {
            (_, None) => (),
            (None, Some(start)) => self.start_address = Some(start),
            (Some(current), Some(start)) if current == start => (),
            (Some(_), Some(start)) => match overlap {
                Overlap::Error => return Err(Error::DuplicateStartAddress),
                Overlap::Ignore => (),
                Overlap::Replace => self.start_address = Some(start),
            },
        }

        Ok(())
    }

    pub fn start_address(&self) -> Option<StartAddress> {
        self.start_address
    }

    pub fn set_start_address(&mut self, start_address: Option<StartAddress>) {
        self.start_address = start_address;
    }

    /// Lowest and highest address holding data.
    pub fn address_range(&self) -> Option<std::ops::RangeInclusive<u32>> {
        let (&first, _) = self.data.first_key_value()?;
        let (&last, _) = self.data.last_key_value()?;
        Some(first..=last)
    }

    /// Number of addresses holding data.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over `(address, value)` pairs in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u8)> + '_ {
        self.data.iter().map(|(&address, &value)| (address, value))
    }

    /// Copy the bytes at `addresses` into a buffer, using `fill` for gaps.
    pub fn to_bytes<I: IntoIterator<Item = u32>>(&self, addresses: I, fill: u8) -> Vec<u8> {
        addresses
            .into_iter()
            .map(|address| self.get(address).unwrap_or(fill))
            .collect()
    }

    fn set_start_once(&mut self, start: StartAddress) -> Result<(), Error> {
        if self.start_address.is_some() {
            return Err(Error::DuplicateStartAddress);
        }
        self.start_address = Some(start);
        Ok(())
    }
}

fn push_data(
    records: &mut Vec<Record>,
    segment: &mut Option<u16>,
    chunk_start: u32,
    chunk: &mut Vec<u8>,
) {
    let upper = (chunk_start >> 16) as u16;
    if *segment != Some(upper) {
        records.push(Record::ExtendedLinearAddress(upper));
        *segment = Some(upper);
    }
    records.push(Record::Data {
        offset: chunk_start as u16,
        value: std::mem::take(chunk),
    });
}
