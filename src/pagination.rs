//! Cursor pagination with encrypted, opaque cursors.
//!
//! A cursor is the decimal text of the last internal id on a page, encrypted
//! with AES-CBC (random IV prepended, PKCS#7 padding) and encoded as URL-safe
//! base64. Clients cannot read or forge internal ids; a cursor that fails to
//! decode is treated as "start from the beginning".

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::{Aes128, Aes192, Aes256};
use base64::{engine::general_purpose, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default page size, also used for out-of-range requests.
pub const DEFAULT_PER_PAGE: i64 = 25;
/// Largest page a client may request.
pub const MAX_PER_PAGE: i64 = 100;

const BLOCK_SIZE: usize = 16;

#[derive(Error, Debug)]
pub enum CursorError {
    #[error("encryption key must be 16, 24 or 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("random source failed: {0}")]
    Random(String),

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("cursor shorter than one block")]
    TooShort,

    #[error("ciphertext is not a whole number of blocks")]
    Malformed,

    #[error("invalid padding")]
    Padding,
}

/// Reversible transform between plaintext bytes and opaque tokens.
#[derive(Clone)]
pub struct CursorCodec {
    key: Vec<u8>,
}

impl std::fmt::Debug for CursorCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorCodec")
            .field("key_len", &self.key.len())
            .finish()
    }
}

impl CursorCodec {
    /// The key length selects AES-128, AES-192 or AES-256.
    pub fn new(key: &[u8]) -> Result<Self, CursorError> {
        match key.len() {
            16 | 24 | 32 => Ok(Self { key: key.to_vec() }),
            n => Err(CursorError::InvalidKeyLength(n)),
        }
    }

    /// Encrypts under a fresh random IV; two calls on the same input differ.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String, CursorError> {
        let mut iv = [0u8; BLOCK_SIZE];
        OsRng
            .try_fill_bytes(&mut iv)
            .map_err(|e| CursorError::Random(e.to_string()))?;

        let invalid_key = |_| CursorError::InvalidKeyLength(self.key.len());
        let ciphertext = match self.key.len() {
            16 => cbc::Encryptor::<Aes128>::new_from_slices(&self.key, &iv)
                .map_err(invalid_key)?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            24 => cbc::Encryptor::<Aes192>::new_from_slices(&self.key, &iv)
                .map_err(invalid_key)?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            _ => cbc::Encryptor::<Aes256>::new_from_slices(&self.key, &iv)
                .map_err(invalid_key)?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        };

        let mut token = Vec::with_capacity(BLOCK_SIZE + ciphertext.len());
        token.extend_from_slice(&iv);
        token.extend_from_slice(&ciphertext);
        Ok(general_purpose::URL_SAFE.encode(token))
    }

    pub fn decrypt(&self, token: &str) -> Result<Vec<u8>, CursorError> {
        let raw = general_purpose::URL_SAFE.decode(token)?;
        if raw.len() < BLOCK_SIZE {
            return Err(CursorError::TooShort);
        }

        let (iv, body) = raw.split_at(BLOCK_SIZE);
        if body.is_empty() || body.len() % BLOCK_SIZE != 0 {
            return Err(CursorError::Malformed);
        }

        let invalid_key = |_| CursorError::InvalidKeyLength(self.key.len());
        let plaintext = match self.key.len() {
            16 => cbc::Decryptor::<Aes128>::new_from_slices(&self.key, iv)
                .map_err(invalid_key)?
                .decrypt_padded_vec_mut::<Pkcs7>(body),
            24 => cbc::Decryptor::<Aes192>::new_from_slices(&self.key, iv)
                .map_err(invalid_key)?
                .decrypt_padded_vec_mut::<Pkcs7>(body),
            _ => cbc::Decryptor::<Aes256>::new_from_slices(&self.key, iv)
                .map_err(invalid_key)?
                .decrypt_padded_vec_mut::<Pkcs7>(body),
        };

        plaintext.map_err(|_| CursorError::Padding)
    }

    /// Encodes an internal id as a cursor.
    pub fn encode_id(&self, id: i64) -> Result<String, CursorError> {
        self.encrypt(id.to_string().as_bytes())
    }

    /// Decodes a cursor back to an internal id.
    ///
    /// Returns `None` for anything that is not a valid cursor holding a
    /// non-negative integer.
    pub fn decode_id(&self, token: &str) -> Option<i64> {
        let bytes = self.decrypt(token).ok()?;
        let id: i64 = std::str::from_utf8(&bytes).ok()?.parse().ok()?;
        (id >= 0).then_some(id)
    }
}

/// Raw list query string (`?cursor=...&per_page=...`).
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub cursor: Option<String>,
    pub per_page: Option<String>,
}

/// A resolved page request: rows with internal id strictly greater than
/// `after_id`, at most `per_page` of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub after_id: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Resolves a list query; never fails.
    ///
    /// Bad or missing cursors start from the first page; `per_page` outside
    /// `1..=100` or non-numeric falls back to the default.
    pub fn resolve(query: &ListQuery, codec: &CursorCodec) -> Self {
        let after_id = match query.cursor.as_deref().filter(|c| !c.is_empty()) {
            Some(cursor) => codec.decode_id(cursor).unwrap_or_else(|| {
                tracing::debug!(cursor, "Ignoring undecodable cursor, starting from first page");
                0
            }),
            None => 0,
        };

        let per_page = query
            .per_page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| (1..=MAX_PER_PAGE).contains(p))
            .unwrap_or(DEFAULT_PER_PAGE);

        Self { after_id, per_page }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            after_id: 0,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// One page of results: `{"data": [...], "next": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    /// Cursor for the following page; empty when this page was not full.
    pub next: String,
}

impl<T> Page<T> {
    /// Wraps a fetched page, minting `next` from the last row's internal id
    /// only when the page is full.
    pub fn build(
        data: Vec<T>,
        request: PageRequest,
        internal_id: impl Fn(&T) -> i64,
        codec: &CursorCodec,
    ) -> Result<Self, CursorError> {
        let next = match data.last() {
            Some(last) if data.len() as i64 == request.per_page => {
                codec.encode_id(internal_id(last))?
            }
            _ => String::new(),
        };
        Ok(Self { data, next })
    }
}
