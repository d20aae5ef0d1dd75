use crate::cipher::CipherReport;
use crate::error::Result;
use crate::hexfile::{read_hex_file, read_key_file, write_hex_file, Layout};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

/// Options for the cipher command
#[derive(Debug, Clone, Default)]
pub struct CipherOptions {
    pub layout: Layout,
}

/// Outcome of a cipher run
#[derive(Debug, Clone)]
pub struct CipherOutcome {
    pub report: CipherReport,
    pub fingerprint: String,
}

/// Short SHA-256 fingerprint of key material, safe to print
pub fn key_fingerprint(key: &[u8]) -> String {
    let digest = Sha256::digest(key);
    hex::encode(&digest[..8])
}

/// Encipher or decipher the data records of a hex file
///
/// The same call with the same key file reverses a previous run.
pub fn cipher_hex_file(
    input_path: &Path,
    key_path: &Path,
    output_path: &Path,
    options: &CipherOptions,
) -> Result<CipherOutcome> {
    let key = read_key_file(key_path)?;
    let mut hex = read_hex_file(input_path, options.layout)?;

    let report = hex.cipher(&key)?;
    write_hex_file(output_path, &hex)?;

    let fingerprint = key_fingerprint(&key);
    info!(
        "Ciphered {} records ({} bytes) from {} into {} with key {}",
        report.records,
        report.bytes,
        input_path.display(),
        output_path.display(),
        fingerprint
    );

    Ok(CipherOutcome {
        report,
        fingerprint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HexcryptError;
    use std::fs;
    use tempfile::tempdir;

    const INPUT: &str = ":10000000000102030405060708090A0B0C0D0E0F78\r\n\
                         :02000004000AF0\r\n\
                         :040000001122334452\r\n\
                         :00000001FF\r\n";

    #[test]
    fn test_cipher_roundtrip() {
        for layout in [Layout::Merged, Layout::Preserved] {
            let dir = tempdir().unwrap();
            let input = dir.path().join("plain.hex");
            let key = dir.path().join("key.bin");
            let sealed = dir.path().join("sealed.hex");
            let opened = dir.path().join("opened.hex");
            fs::write(&input, INPUT).unwrap();
            fs::write(&key, b"I'm an unsafe key").unwrap();

            let options = CipherOptions { layout };
            let first = cipher_hex_file(&input, &key, &sealed, &options).unwrap();
            assert_eq!(first.report.records, 2);
            assert_eq!(first.report.bytes, 20);
            assert_ne!(fs::read_to_string(&sealed).unwrap(), INPUT);

            let second = cipher_hex_file(&sealed, &key, &opened, &options).unwrap();
            assert_eq!(first.fingerprint, second.fingerprint);
            assert_eq!(fs::read_to_string(&opened).unwrap(), INPUT);
        }
    }

    #[test]
    fn test_ciphered_output_is_valid_hex() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("plain.hex");
        let key = dir.path().join("key.bin");
        let sealed = dir.path().join("sealed.hex");
        fs::write(&input, INPUT).unwrap();
        fs::write(&key, [0x42u8; 5]).unwrap();

        cipher_hex_file(&input, &key, &sealed, &CipherOptions::default()).unwrap();

        let text = fs::read_to_string(&sealed).unwrap();
        let lines: Vec<&str> = text.split_terminator("\r\n").collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], ":02000004000AF0");
        assert_eq!(lines[3], ":00000001FF");
        for (i, line) in lines.iter().enumerate() {
            crate::codec::parse_record(i + 1, line).unwrap();
        }
    }

    #[test]
    fn test_parse_failure_leaves_no_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bad.hex");
        let key = dir.path().join("key.bin");
        let output = dir.path().join("out.hex");
        fs::write(&input, ":0200000001020D\r\n:00000001FF\r\n").unwrap();
        fs::write(&key, b"k").unwrap();

        let result = cipher_hex_file(&input, &key, &output, &CipherOptions::default());
        assert!(matches!(result, Err(HexcryptError::Checksum { .. })));
        assert!(!output.exists());
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(key_fingerprint(b"abc"), "ba7816bf8f01cfea");
        assert_eq!(key_fingerprint(b"abc").len(), 16);
    }
}
