use crate::error::{HexcryptError, Result};
use std::fmt;

/// Largest payload a single record can carry
pub const MAX_PAYLOAD: usize = 255;

/// Length, address (2), type, payload and checksum
pub const MAX_RECORD_BYTES: usize = 4 + MAX_PAYLOAD + 1;

/// Record type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    Data,
    EndOfFile,
    ExtendedLinearAddress,
}

impl RecordType {
    pub fn code(self) -> u8 {
        match self {
            Self::Data => 0x00,
            Self::EndOfFile => 0x01,
            Self::ExtendedLinearAddress => 0x04,
        }
    }
}

impl TryFrom<u8> for RecordType {
    type Error = u8;

    fn try_from(code: u8) -> std::result::Result<Self, u8> {
        match code {
            0x00 => Ok(Self::Data),
            0x01 => Ok(Self::EndOfFile),
            0x04 => Ok(Self::ExtendedLinearAddress),
            other => Err(other),
        }
    }
}

/// One line of an Intel HEX file
///
/// The length byte is always the payload length. The checksum is stored so a
/// record read from disk can be written back verbatim; anything that changes
/// the payload must call [`Record::refresh_checksum`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub address: u16,
    pub record_type: RecordType,
    payload: Vec<u8>,
    checksum: u8,
}

impl Record {
    /// Build a record with a freshly computed checksum
    pub fn new(record_type: RecordType, address: u16, payload: Vec<u8>) -> Result<Self> {
        if payload.len() > MAX_PAYLOAD {
            return Err(HexcryptError::PayloadTooLarge(payload.len()));
        }
        let mut record = Self {
            address,
            record_type,
            payload,
            checksum: 0,
        };
        record.refresh_checksum();
        Ok(record)
    }

    /// Build a record keeping a checksum taken from the wire
    pub(crate) fn with_checksum(
        record_type: RecordType,
        address: u16,
        payload: Vec<u8>,
        checksum: u8,
    ) -> Self {
        debug_assert!(payload.len() <= MAX_PAYLOAD);
        Self {
            address,
            record_type,
            payload,
            checksum,
        }
    }

    pub fn data(address: u16, payload: Vec<u8>) -> Result<Self> {
        Self::new(RecordType::Data, address, payload)
    }

    pub fn end_of_file() -> Self {
        Self::control(RecordType::EndOfFile, Vec::new())
    }

    /// Extended linear address record selecting the bank of `address`
    pub fn extended_linear_address(address: u32) -> Self {
        let payload = vec![(address >> 24) as u8, (address >> 16) as u8];
        Self::control(RecordType::ExtendedLinearAddress, payload)
    }

    fn control(record_type: RecordType, payload: Vec<u8>) -> Self {
        let mut record = Self::with_checksum(record_type, 0, payload, 0);
        record.refresh_checksum();
        record
    }

    pub fn length(&self) -> u8 {
        self.payload.len() as u8
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Mutable payload bytes. The length cannot change through this slice.
    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.payload
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Checksum the current field values call for
    pub fn compute_checksum(&self) -> u8 {
        let sum = self.header_bytes()
            .iter()
            .chain(self.payload.iter())
            .fold(0u8, |acc, &b| acc.wrapping_add(b));
        sum.wrapping_neg()
    }

    pub fn refresh_checksum(&mut self) {
        self.checksum = self.compute_checksum();
    }

    pub fn has_valid_checksum(&self) -> bool {
        self.checksum == self.compute_checksum()
    }

    fn header_bytes(&self) -> [u8; 4] {
        let [hi, lo] = self.address.to_be_bytes();
        [self.length(), hi, lo, self.record_type.code()]
    }

    /// Wire bytes: header, payload and stored checksum
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.payload.len() + 5);
        bytes.extend_from_slice(&self.header_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes.push(self.checksum);
        bytes
    }

    /// Bank value carried by an extended linear address record
    pub fn extended_address(&self) -> Option<u32> {
        match (self.record_type, self.payload.as_slice()) {
            (RecordType::ExtendedLinearAddress, [hi, lo]) => {
                Some(((*hi as u32) << 24) | ((*lo as u32) << 16))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Record {
    /// The record as a line, without terminator
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", hex::encode_upper(self.to_bytes()))
    }
}
