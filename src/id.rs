//! Public identifier generation.
//!
//! Public ids are fixed-length strings drawn uniformly from a configured
//! alphabet using masked rejection sampling over OS CSPRNG bytes (the
//! nanoid scheme). Uniqueness is enforced by storage, not here.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::config::IdConfig;
use crate::error::AppError;

/// Source of public identifiers.
pub trait IdGenerator: Send + Sync {
    /// Produces a fresh identifier; fails only if randomness is unavailable.
    fn generate(&self) -> Result<String, AppError>;
}

/// Nanoid-style generator over a custom ASCII alphabet.
#[derive(Debug, Clone)]
pub struct NanoIdGenerator {
    alphabet: Vec<u8>,
    length: usize,
    mask: u8,
    step: usize,
}

impl NanoIdGenerator {
    /// Creates a generator, rejecting empty, oversized (> 255) or non-ASCII
    /// alphabets and a zero length.
    pub fn new(alphabet: &str, length: usize) -> Result<Self, AppError> {
        if alphabet.is_empty() || alphabet.len() > 255 || !alphabet.is_ascii() {
            return Err(AppError::IdGeneration(format!(
                "alphabet must contain 1 to 255 ASCII characters, got {:?}",
                alphabet
            )));
        }
        if length == 0 {
            return Err(AppError::IdGeneration("id length must be positive".into()));
        }

        let alphabet = alphabet.as_bytes().to_vec();
        let bits = usize::BITS - ((alphabet.len() - 1) | 1).leading_zeros();
        let mask = ((1usize << bits) - 1) as u8;
        // Expected bytes per id, with headroom for rejected samples.
        let step = (1.6 * mask as f64 * length as f64 / alphabet.len() as f64).ceil() as usize;

        Ok(Self {
            alphabet,
            length,
            mask,
            step: step.max(1),
        })
    }

    pub fn from_config(config: &IdConfig) -> Result<Self, AppError> {
        Self::new(&config.alphabet, config.length)
    }
}

impl IdGenerator for NanoIdGenerator {
    fn generate(&self) -> Result<String, AppError> {
        let mut id = String::with_capacity(self.length);
        let mut bytes = vec![0u8; self.step];

        while id.len() < self.length {
            OsRng
                .try_fill_bytes(&mut bytes)
                .map_err(|e| AppError::IdGeneration(e.to_string()))?;

            for byte in &bytes {
                let idx = (byte & self.mask) as usize;
                if idx < self.alphabet.len() {
                    id.push(self.alphabet[idx] as char);
                    if id.len() == self.length {
                        break;
                    }
                }
            }
        }

        Ok(id)
    }
}
