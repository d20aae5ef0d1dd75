use crate::error::Result;
use crate::hexfile::{read_hex_file, Layout};
use crate::image::ImageSummary;
use std::path::Path;

/// Decode a hex file without writing anything
///
/// Succeeds only when every line up to the end-of-file record is well formed
/// and carries a valid checksum.
pub fn verify_hex_file(path: &Path, layout: Layout) -> Result<ImageSummary> {
    let hex = read_hex_file(path, layout)?;
    Ok(hex.summary())
}
