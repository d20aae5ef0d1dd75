use crate::cipher::{cipher_image, cipher_records, CipherReport};
use crate::codec::{decode_image, decode_records, encode_image, encode_records};
use crate::error::{HexcryptError, Result};
use crate::image::{Image, ImageSummary, RecordList};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// How a hex file is held in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Address-keyed; bank records and checksums regenerated on write
    #[default]
    Merged,
    /// Every record kept in file order and written back verbatim
    Preserved,
}

impl std::str::FromStr for Layout {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "merged" => Ok(Self::Merged),
            "preserved" | "preserve" => Ok(Self::Preserved),
            _ => Err(format!("unknown layout: {}", s)),
        }
    }
}

/// A decoded hex file in either layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HexFile {
    Merged(Image),
    Preserved(RecordList),
}

impl HexFile {
    pub fn layout(&self) -> Layout {
        match self {
            Self::Merged(_) => Layout::Merged,
            Self::Preserved(_) => Layout::Preserved,
        }
    }

    /// Apply the keystream cipher to every data payload
    pub fn cipher(&mut self, key: &[u8]) -> Result<CipherReport> {
        match self {
            Self::Merged(image) => cipher_image(key, image),
            Self::Preserved(list) => cipher_records(key, list),
        }
    }

    pub fn summary(&self) -> ImageSummary {
        match self {
            Self::Merged(image) => image.summary(),
            Self::Preserved(list) => list.summary(),
        }
    }

    /// Address-keyed view of the data
    pub fn to_image(&self) -> Image {
        match self {
            Self::Merged(image) => image.clone(),
            Self::Preserved(list) => list.to_image(),
        }
    }

    pub fn encode<W: Write>(&self, out: W) -> Result<()> {
        match self {
            Self::Merged(image) => encode_image(image, out),
            Self::Preserved(list) => encode_records(list, out),
        }
    }
}

/// Read and decode a hex file
pub fn read_hex_file(path: &Path, layout: Layout) -> Result<HexFile> {
    let reader = BufReader::new(File::open(path)?);
    Ok(match layout {
        Layout::Merged => HexFile::Merged(decode_image(reader)?),
        Layout::Preserved => HexFile::Preserved(decode_records(reader)?),
    })
}

/// Encode a hex file to disk (creates new file or overwrites)
pub fn write_hex_file(path: &Path, hex: &HexFile) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    hex.encode(writer)
}

/// Read a whole file as raw key material
pub fn read_key_file(path: &Path) -> Result<Vec<u8>> {
    let key = std::fs::read(path)?;
    if key.is_empty() {
        return Err(HexcryptError::EmptyKey);
    }
    Ok(key)
}
