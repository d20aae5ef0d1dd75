use crate::error::Result;
use crate::hexfile::{read_hex_file, Layout};
use std::fs;
use std::path::Path;

/// Options for the info command
#[derive(Debug, Clone, Default)]
pub struct InfoOptions {
    pub layout: Layout,
    /// Emit the summary as JSON instead of text
    pub json: bool,
}

/// Describe the contents of a hex file
pub fn show_info(path: &Path, options: &InfoOptions) -> Result<String> {
    let hex = read_hex_file(path, options.layout)?;
    let summary = hex.summary();

    if options.json {
        let mut out = serde_json::to_string_pretty(&summary)?;
        out.push('\n');
        return Ok(out);
    }

    let file_size = fs::metadata(path)?.len();
    let span: u64 = summary.segments.iter().map(|s| s.len()).sum();

    let mut output = String::new();

    output.push_str("Intel HEX File Information\n");
    output.push_str("==========================\n\n");

    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str(&format!("File size: {}\n", format_size(file_size)));
    output.push_str(&format!("Layout: {}\n", summary.representation));
    output.push('\n');

    output.push_str("Contents:\n");
    output.push_str(&format!("  Records: {}\n", summary.records));
    output.push_str(&format!(
        "  Data bytes: {} ({})\n",
        summary.data_bytes,
        format_size(summary.data_bytes as u64)
    ));
    output.push_str(&format!("  Address banks: {}\n", summary.banks));
    output.push_str(&format!("  Segments: {}\n", summary.segments.len()));
    if span != summary.data_bytes as u64 {
        // Overlapping chunks are merged into one segment.
        output.push_str(&format!("  Covered span: {} bytes\n", span));
    }
    output.push('\n');

    if !summary.segments.is_empty() {
        output.push_str("Segments:\n");
        for segment in &summary.segments {
            output.push_str(&format!(
                "  {:08X}-{:08X}  {}\n",
                segment.start,
                segment.end.saturating_sub(1).max(segment.start),
                format_size(segment.len())
            ));
        }
    }

    Ok(output)
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const INPUT: &str = ":10000000000102030405060708090A0B0C0D0E0F78\r\n\
                         :02000004000AF0\r\n\
                         :040000001122334452\r\n\
                         :00000001FF\r\n";

    #[test]
    fn test_show_info() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("image.hex");
        fs::write(&path, INPUT).unwrap();

        let info = show_info(&path, &InfoOptions::default()).unwrap();
        assert!(info.contains("Layout: merged"));
        assert!(info.contains("Records: 2"));
        assert!(info.contains("Data bytes: 20 (20 B)"));
        assert!(info.contains("Address banks: 2"));
        assert!(info.contains("  00000000-0000000F  16 B"));
        assert!(info.contains("  000A0000-000A0003  4 B"));
    }

    #[test]
    fn test_show_info_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("image.hex");
        fs::write(&path, INPUT).unwrap();

        let options = InfoOptions {
            layout: Layout::Preserved,
            json: true,
        };
        let out = show_info(&path, &options).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["representation"], "preserved");
        assert_eq!(json["records"], 4);
        assert_eq!(json["data_bytes"], 20);
        assert_eq!(json["segments"][1]["start"], 0xA0000);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1048576), "1.0 MB");
    }
}
