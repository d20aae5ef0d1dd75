//! hexcrypt - Keystream encryption for Intel HEX files
//!
//! Encrypts the data records of an Intel HEX file with RC4 while keeping the
//! file a valid hex file: addresses, record types and extended address
//! records are untouched, and every checksum is recomputed. Running the same
//! key over the output again restores the original data.
//!
//! ## Pipeline
//!
//! ```text
//! Input → Decode → Image → Cipher → Encode → Output
//! ```
//!
//! - **Decode**: strict line grammar, checksum validation, extended linear
//!   address banks (record types 00, 01 and 04 only)
//! - **Image**: address-keyed chunks (default) or every record in file order
//! - **Cipher**: one RC4 stream per file, first 256 bytes discarded, payloads
//!   masked in stream order
//! - **Encode**: uppercase digits, CRLF, fresh checksums
//!
//! ## Example
//!
//! ```
//! use hexcrypt::{cipher_image, decode_image, image_to_string};
//!
//! let input = ":020000000102FB\r\n:00000001FF\r\n";
//! let mut image = decode_image(input.as_bytes()).unwrap();
//!
//! cipher_image(b"secret", &mut image).unwrap();
//! let sealed = image_to_string(&image).unwrap();
//!
//! let mut image = decode_image(sealed.as_bytes()).unwrap();
//! cipher_image(b"secret", &mut image).unwrap();
//! assert_eq!(image_to_string(&image).unwrap(), input);
//! ```

pub mod cipher;
pub mod cli;
pub mod codec;
pub mod error;
pub mod hexfile;
pub mod image;
pub mod keystream;
pub mod record;

pub use cipher::{cipher_image, cipher_records, decipher_image, decipher_records, CipherReport};
pub use codec::{decode_image, decode_records, encode_image, encode_records, image_to_string};
pub use error::{HexcryptError, Result};
pub use hexfile::{read_hex_file, read_key_file, write_hex_file, HexFile, Layout};
pub use image::{Image, ImageSummary, RecordList};
pub use keystream::Keystream;
pub use record::{Record, RecordType};
