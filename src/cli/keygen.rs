use crate::error::{HexcryptError, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use std::path::Path;

/// Options for the keygen command
#[derive(Debug, Clone)]
pub struct KeygenOptions {
    /// Key length in bytes
    pub length: usize,
}

impl Default for KeygenOptions {
    fn default() -> Self {
        Self { length: 32 }
    }
}

/// Write a fresh random key file, overwriting any existing one
pub fn generate_key_file(path: &Path, options: &KeygenOptions) -> Result<Vec<u8>> {
    if options.length == 0 {
        return Err(HexcryptError::InvalidKeyLength(options.length));
    }

    let mut key = vec![0u8; options.length];
    OsRng.fill_bytes(&mut key);
    std::fs::write(path, &key)?;
    Ok(key)
}
