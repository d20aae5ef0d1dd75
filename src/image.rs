use crate::error::Result;
use crate::record::{Record, RecordType};
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::warn;

/// Address-keyed memory image
///
/// Maps absolute 32-bit addresses to the payload of the data record that
/// started there. Types and checksums are regenerated when the image is
/// written, so only addresses and bytes are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    chunks: BTreeMap<u32, Vec<u8>>,
}

impl Image {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a payload. A payload already at `address` is kept and the new
    /// one dropped.
    pub fn insert(&mut self, address: u32, payload: Vec<u8>) {
        match self.chunks.entry(address) {
            Entry::Vacant(slot) => {
                slot.insert(payload);
            }
            Entry::Occupied(_) => {
                warn!(
                    "Duplicate data record at {:#010X}, dropping later {} bytes",
                    address,
                    payload.len()
                );
            }
        }
    }

    pub fn get(&self, address: u32) -> Option<&[u8]> {
        self.chunks.get(&address).map(Vec::as_slice)
    }

    /// Chunks in ascending address order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[u8])> {
        self.chunks.iter().map(|(&addr, data)| (addr, data.as_slice()))
    }

    /// Payloads in ascending address order, for in-place rewriting
    pub fn payloads_mut(&mut self) -> impl Iterator<Item = &mut Vec<u8>> {
        self.chunks.values_mut()
    }

    /// Number of stored chunks (one per data record)
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total payload bytes
    pub fn data_bytes(&self) -> usize {
        self.chunks.values().map(Vec::len).sum()
    }

    /// Lowest address and one past the highest byte
    pub fn bounds(&self) -> Option<Range<u64>> {
        let start = *self.chunks.keys().next()? as u64;
        let end = self
            .chunks
            .iter()
            .map(|(&addr, data)| addr as u64 + data.len() as u64)
            .max()?;
        Some(start..end)
    }

    /// Contiguous address ranges, with touching or overlapping chunks merged
    pub fn segments(&self) -> Vec<Range<u64>> {
        let mut segments: Vec<Range<u64>> = Vec::new();
        for (&addr, data) in &self.chunks {
            let start = addr as u64;
            let end = start + data.len() as u64;
            if let Some(last) = segments.last_mut() {
                if start <= last.end {
                    last.end = last.end.max(end);
                    continue;
                }
            }
            segments.push(start..end);
        }
        segments
    }

    /// Number of distinct upper-16-bit banks in use
    pub fn bank_count(&self) -> usize {
        let mut banks: Vec<u32> = self.chunks.keys().map(|a| a & 0xFFFF_0000).collect();
        banks.dedup();
        banks.len()
    }

    pub fn summary(&self) -> ImageSummary {
        ImageSummary {
            representation: "merged",
            records: self.len(),
            data_bytes: self.data_bytes(),
            banks: self.bank_count(),
            segments: self.segments().into_iter().map(Segment::from).collect(),
        }
    }
}

/// Records in file order, kept exactly as read
///
/// Redundant extended address records and the terminal end-of-file record
/// are preserved so the file can be reproduced line for line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordList {
    records: Vec<Record>,
}

impl RecordList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total data record payload bytes
    pub fn data_bytes(&self) -> usize {
        self.data_records().map(|r| r.payload().len()).sum()
    }

    pub fn data_records(&self) -> impl Iterator<Item = &Record> {
        self.records
            .iter()
            .filter(|r| r.record_type == RecordType::Data)
    }

    /// Resolve bank prefixes into an address-keyed image
    pub fn to_image(&self) -> Image {
        let mut image = Image::new();
        let mut bank = 0u32;
        for record in &self.records {
            match record.record_type {
                RecordType::Data => {
                    image.insert(bank | record.address as u32, record.payload().to_vec())
                }
                RecordType::ExtendedLinearAddress => {
                    if let Some(ext) = record.extended_address() {
                        bank = ext;
                    }
                }
                RecordType::EndOfFile => break,
            }
        }
        image
    }

    pub fn summary(&self) -> ImageSummary {
        let image = self.to_image();
        ImageSummary {
            representation: "preserved",
            records: self.len(),
            data_bytes: self.data_bytes(),
            banks: image.bank_count(),
            segments: image.segments().into_iter().map(Segment::from).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RecordList {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl TryFrom<&Image> for RecordList {
    type Error = crate::error::HexcryptError;

    /// Lay an image out as the records the merged encoder would emit
    fn try_from(image: &Image) -> Result<Self> {
        crate::codec::layout_image(image)
    }
}

/// Inclusive-exclusive address range in a summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub start: u64,
    pub end: u64,
}

impl From<Range<u64>> for Segment {
    fn from(range: Range<u64>) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

impl Segment {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Overview of a decoded image for reporting
#[derive(Debug, Clone, Serialize)]
pub struct ImageSummary {
    pub representation: &'static str,
    pub records: usize,
    pub data_bytes: usize,
    pub banks: usize,
    pub segments: Vec<Segment>,
}
