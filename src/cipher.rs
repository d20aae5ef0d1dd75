use crate::error::Result;
use crate::image::{Image, RecordList};
use crate::keystream::Keystream;
use crate::record::RecordType;
use tracing::debug;

/// Keystream bytes dropped before any payload is masked
///
/// The first bytes of RC4 output leak key material when matching plaintext
/// and ciphertext are known. Both directions must skip the same amount.
pub const KEYSTREAM_DISCARD: usize = 256;

/// What a cipher pass touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CipherReport {
    /// Data records whose payload was masked
    pub records: usize,
    /// Payload bytes masked
    pub bytes: usize,
    /// Keystream bytes consumed, discard included
    pub keystream_bytes: u64,
}

fn keystream_for(key: &[u8]) -> Result<Keystream> {
    let mut keystream = Keystream::new(key)?;
    keystream.discard(KEYSTREAM_DISCARD);
    Ok(keystream)
}

/// Encipher (or decipher) every chunk of an address-keyed image
///
/// Chunks are masked in ascending address order. Checksums are regenerated
/// when the image is encoded, so nothing else changes.
pub fn cipher_image(key: &[u8], image: &mut Image) -> Result<CipherReport> {
    let mut keystream = keystream_for(key)?;
    let mut report = CipherReport::default();

    for payload in image.payloads_mut() {
        keystream.apply(payload);
        report.records += 1;
        report.bytes += payload.len();
    }

    report.keystream_bytes = keystream.position();
    debug!("Ciphered {} chunks, {} bytes", report.records, report.bytes);
    Ok(report)
}

/// Encipher (or decipher) the data records of an ordered record list
///
/// Records are masked in file order and their checksums refreshed.
/// End-of-file and extended address records are left alone.
pub fn cipher_records(key: &[u8], list: &mut RecordList) -> Result<CipherReport> {
    let mut keystream = keystream_for(key)?;
    let mut report = CipherReport::default();

    for record in list.records_mut() {
        if record.record_type != RecordType::Data {
            continue;
        }
        keystream.apply(record.payload_mut());
        record.refresh_checksum();
        report.records += 1;
        report.bytes += record.payload().len();
    }

    report.keystream_bytes = keystream.position();
    debug!("Ciphered {} records, {} bytes", report.records, report.bytes);
    Ok(report)
}

/// Reverse [`cipher_image`] (the pass is its own inverse)
pub fn decipher_image(key: &[u8], image: &mut Image) -> Result<CipherReport> {
    cipher_image(key, image)
}

/// Reverse [`cipher_records`] (the pass is its own inverse)
pub fn decipher_records(key: &[u8], list: &mut RecordList) -> Result<CipherReport> {
    cipher_records(key, list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_records, layout_image};
    use crate::error::HexcryptError;

    const KEY: &[u8] = b"I'm an unsafe key";

    fn sample_image() -> Image {
        let mut image = Image::new();
        image.insert(0x0000_0000, (0..16).collect());
        image.insert(0x0000_0010, (16..32).collect());
        image.insert(0x0002_0000, vec![0xFF; 8]);
        image
    }

    #[test]
    fn test_cipher_image_roundtrip() {
        let original = sample_image();
        let mut image = original.clone();

        cipher_image(KEY, &mut image).unwrap();
        assert_ne!(image, original);

        decipher_image(KEY, &mut image).unwrap();
        assert_eq!(image, original);
    }

    #[test]
    fn test_addresses_survive() {
        let original = sample_image();
        let mut image = original.clone();
        cipher_image(KEY, &mut image).unwrap();

        let before: Vec<(u32, usize)> = original.iter().map(|(a, d)| (a, d.len())).collect();
        let after: Vec<(u32, usize)> = image.iter().map(|(a, d)| (a, d.len())).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_keystream_continues_across_records() {
        let mut image = sample_image();
        cipher_image(KEY, &mut image).unwrap();

        let mut expected = Keystream::new(KEY).unwrap();
        expected.discard(KEYSTREAM_DISCARD);
        let stream = expected.next(40);

        let masked: Vec<u8> = image.iter().flat_map(|(_, d)| d.to_vec()).collect();
        let plain: Vec<u8> = sample_image().iter().flat_map(|(_, d)| d.to_vec()).collect();
        let xored: Vec<u8> = plain.iter().zip(&stream).map(|(p, k)| p ^ k).collect();
        assert_eq!(masked, xored);
    }

    #[test]
    fn test_report_counts() {
        let mut image = sample_image();
        let report = cipher_image(KEY, &mut image).unwrap();
        assert_eq!(report.records, 3);
        assert_eq!(report.bytes, 40);
        assert_eq!(report.keystream_bytes, 256 + 40);
    }

    #[test]
    fn test_cipher_records_leaves_structure() {
        let original = layout_image(&sample_image()).unwrap();
        let mut list = original.clone();

        let report = cipher_records(KEY, &mut list).unwrap();
        assert_eq!(report.records, 3);

        for (before, after) in original.iter().zip(list.iter()) {
            assert_eq!(before.record_type, after.record_type);
            assert_eq!(before.address, after.address);
            assert!(after.has_valid_checksum());
            if before.record_type != RecordType::Data {
                assert_eq!(before, after);
            }
        }
        assert_ne!(list, original);

        decipher_records(KEY, &mut list).unwrap();
        assert_eq!(list, original);
    }

    #[test]
    fn test_both_representations_agree() {
        let input = ":10000000000102030405060708090A0B0C0D0E0F78\r\n\
                     :02000004000AF0\r\n\
                     :040000001122334452\r\n\
                     :00000001FF\r\n";
        let mut list = decode_records(input.as_bytes()).unwrap();
        let mut image = list.to_image();

        cipher_records(KEY, &mut list).unwrap();
        cipher_image(KEY, &mut image).unwrap();
        assert_eq!(list.to_image(), image);
    }

    #[test]
    fn test_wrong_key_does_not_restore() {
        let original = sample_image();
        let mut image = original.clone();
        cipher_image(KEY, &mut image).unwrap();
        decipher_image(b"another key", &mut image).unwrap();
        assert_ne!(image, original);
    }

    #[test]
    fn test_empty_key() {
        let mut image = sample_image();
        assert!(matches!(
            cipher_image(b"", &mut image),
            Err(HexcryptError::EmptyKey)
        ));
        assert_eq!(image, sample_image());
    }

    #[test]
    fn test_empty_image() {
        let mut image = Image::new();
        let report = cipher_image(KEY, &mut image).unwrap();
        assert_eq!(report.records, 0);
        assert_eq!(report.keystream_bytes, 256);
    }
}
