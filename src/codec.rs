//! Intel HEX line codec
//!
//! Decoding is strict: every line must be a well-formed record with a valid
//! checksum, and the input must end with an end-of-file record. Encoding always
//! emits uppercase digits and CRLF terminators.

use crate::error::{HexcryptError, Result};
use crate::image::{Image, RecordList};
use crate::record::{Record, RecordType, MAX_RECORD_BYTES};
use std::io::{self, BufRead, Read, Write};
use tracing::debug;

/// `:` followed by length, address, type and checksum digits
const MIN_LINE_LEN: usize = 11;

/// `:` followed by the digits of the largest possible record
const MAX_LINE_LEN: usize = 1 + 2 * MAX_RECORD_BYTES;

// Error columns: first digit of the length and payload fields, the low
// digit of the type field
const LENGTH_COLUMN: usize = 1;
const TYPE_COLUMN: usize = 8;
const PAYLOAD_COLUMN: usize = 9;

/// Parse one record line. `line_no` is 1-based and only used for errors.
///
/// The line terminator may already be stripped; a single trailing carriage
/// return is accepted either way.
pub fn parse_record(line_no: usize, line: impl AsRef<[u8]>) -> Result<Record> {
    let raw = line.as_ref();
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let text = String::from_utf8_lossy(raw);
    let fail = |column: usize, message: &str| HexcryptError::format(line_no, column, message, &text);

    if raw.len() < MIN_LINE_LEN || raw[0] != b':' {
        return Err(fail(0, "not starting with ':' or too short"));
    }
    if raw.len() > MAX_LINE_LEN {
        return Err(fail(MAX_LINE_LEN, "record too long"));
    }

    let digits = &raw[1..];
    if let Some(pos) = digits.iter().position(|b| !b.is_ascii_hexdigit()) {
        return Err(fail(pos + 1, "not an hexadecimal character"));
    }
    let bytes = hex::decode(digits)
        .map_err(|_| fail(raw.len() - 1, "odd number of hexadecimal digits"))?;

    let sum = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    if sum != 0 {
        let stored = bytes[bytes.len() - 1];
        return Err(HexcryptError::Checksum {
            line: line_no,
            column: raw.len() - 2,
            expected: stored.wrapping_sub(sum),
            text: text.to_string(),
        });
    }

    let count = bytes[0] as usize;
    if count + 5 != bytes.len() {
        return Err(fail(LENGTH_COLUMN, "mismatched length"));
    }

    let address = u16::from_be_bytes([bytes[1], bytes[2]]);
    let record_type =
        RecordType::try_from(bytes[3]).map_err(|_| fail(TYPE_COLUMN, "unhandled record type"))?;

    match record_type {
        RecordType::EndOfFile if count != 0 => {
            return Err(fail(PAYLOAD_COLUMN, "end-of-file record has data"));
        }
        RecordType::ExtendedLinearAddress if count != 2 => {
            return Err(fail(
                PAYLOAD_COLUMN,
                "wrong size for extended address record",
            ));
        }
        _ => {}
    }

    let payload = bytes[4..4 + count].to_vec();
    Ok(Record::with_checksum(
        record_type,
        address,
        payload,
        bytes[4 + count],
    ))
}

/// Feed records to `visit` until the end-of-file record has been seen
///
/// Lines after the end-of-file record are never read. Running out of input
/// first is an `UnexpectedEof` I/O error.
fn read_records<R: BufRead>(mut reader: R, mut visit: impl FnMut(Record)) -> Result<usize> {
    let mut buf = Vec::with_capacity(MAX_LINE_LEN + 2);
    let mut line_no = 0;

    loop {
        buf.clear();
        // Two extra bytes for CRLF, one more so an overlong line is detected.
        let read = reader
            .by_ref()
            .take(MAX_LINE_LEN as u64 + 3)
            .read_until(b'\n', &mut buf)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("missing end-of-file record after line {}", line_no),
            )
            .into());
        }
        line_no += 1;

        let record = parse_record(line_no, &buf)?;
        let done = record.record_type == RecordType::EndOfFile;
        visit(record);
        if done {
            return Ok(line_no);
        }
    }
}

/// Decode into an address-keyed image
pub fn decode_image<R: BufRead>(reader: R) -> Result<Image> {
    let mut image = Image::new();
    let mut bank = 0u32;

    let lines = read_records(reader, |record| match record.record_type {
        RecordType::Data => {
            image.insert(bank | record.address as u32, record.payload().to_vec());
        }
        RecordType::ExtendedLinearAddress => {
            if let Some(ext) = record.extended_address() {
                bank = ext;
            }
        }
        RecordType::EndOfFile => {}
    })?;

    debug!(
        "Decoded {} lines into {} chunks ({} bytes)",
        lines,
        image.len(),
        image.data_bytes()
    );
    Ok(image)
}

/// Decode keeping every record in file order
pub fn decode_records<R: BufRead>(reader: R) -> Result<RecordList> {
    let mut list = RecordList::new();
    let lines = read_records(reader, |record| list.push(record))?;
    debug!("Decoded {} records", lines);
    Ok(list)
}

/// Records the merged encoder emits for `image`
///
/// An extended linear address record precedes the first chunk of every bank
/// other than bank zero, and a single end-of-file record closes the list.
pub fn layout_image(image: &Image) -> Result<RecordList> {
    let mut list = RecordList::new();
    let mut bank = 0u32;

    for (addr, data) in image.iter() {
        if addr & 0xFFFF_0000 != bank {
            bank = addr & 0xFFFF_0000;
            list.push(Record::extended_linear_address(bank));
        }
        list.push(Record::data(addr as u16, data.to_vec())?);
    }
    list.push(Record::end_of_file());
    Ok(list)
}

/// Write one record line with CRLF terminator
pub fn write_record<W: Write>(out: &mut W, record: &Record) -> io::Result<()> {
    write!(out, "{}\r\n", record)
}

/// Write records verbatim, stored checksums included
pub fn encode_records<W: Write>(list: &RecordList, mut out: W) -> Result<()> {
    for record in list {
        write_record(&mut out, record)?;
    }
    out.flush()?;
    Ok(())
}

/// Write an address-keyed image with regenerated bank records and checksums
pub fn encode_image<W: Write>(image: &Image, out: W) -> Result<()> {
    let list = layout_image(image)?;
    debug!("Encoding {} chunks as {} records", image.len(), list.len());
    encode_records(&list, out)
}

/// Encode an image to a string
pub fn image_to_string(image: &Image) -> Result<String> {
    let mut out = Vec::new();
    encode_image(image, &mut out)?;
    // Only ASCII is ever written.
    Ok(String::from_utf8_lossy(&out).into_owned())
}
