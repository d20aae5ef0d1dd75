use crate::error::{HexcryptError, Result};

/// RC4 keystream generator
///
/// The permutation and both indices live for the whole stream, so successive
/// `next` calls continue where the previous one stopped.
#[derive(Clone)]
pub struct Keystream {
    state: [u8; 256],
    i: u8,
    j: u8,
    position: u64,
}

impl Keystream {
    /// Run the key schedule over a key of any positive length
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.is_empty() {
            return Err(HexcryptError::EmptyKey);
        }

        let mut state = [0u8; 256];
        for (i, slot) in state.iter_mut().enumerate() {
            *slot = i as u8;
        }

        let mut j = 0u8;
        for i in 0..256 {
            j = j.wrapping_add(state[i]).wrapping_add(key[i % key.len()]);
            state.swap(i, j as usize);
        }

        Ok(Self {
            state,
            i: 0,
            j: 0,
            position: 0,
        })
    }

    fn next_byte(&mut self) -> u8 {
        self.i = self.i.wrapping_add(1);
        self.j = self.j.wrapping_add(self.state[self.i as usize]);
        self.state.swap(self.i as usize, self.j as usize);
        self.position += 1;
        let idx = self.state[self.i as usize].wrapping_add(self.state[self.j as usize]);
        self.state[idx as usize]
    }

    /// Produce the next `n` keystream bytes
    pub fn next(&mut self, n: usize) -> Vec<u8> {
        (0..n).map(|_| self.next_byte()).collect()
    }

    /// XOR fresh keystream into `data`
    pub fn apply(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            *byte ^= self.next_byte();
        }
    }

    /// Advance the stream by `n` bytes, dropping the output
    pub fn discard(&mut self, n: usize) {
        for _ in 0..n {
            self.next_byte();
        }
    }

    /// Keystream bytes produced so far
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl std::fmt::Debug for Keystream {
    // Keep the permutation out of logs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keystream")
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}
