//! Field-level sealing of external access tokens
//!
//! Tokens are sealed with AES-256-GCM under a fresh random nonce and stored
//! as `v1:` followed by base64 of nonce, ciphertext and tag. The key never
//! appears in debug output.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use jobagent_core::StoreConfig;
use jobagent_core_types::Sensitive;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use std::fmt;

use crate::errors::{crypto_error, Result};

const SEALED_PREFIX: &str = "v1:";
pub const KEY_LEN: usize = 32;

/// AES-256-GCM cipher for token columns
pub struct TokenCipher {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl TokenCipher {
    /// Build a cipher from raw key bytes
    ///
    /// # Errors
    /// `Crypto` when the key is not exactly 32 bytes.
    pub fn new(key_bytes: &[u8]) -> Result<Self> {
        if key_bytes.len() != KEY_LEN {
            return Err(crypto_error(
                "token_cipher_new",
                &format!("Token key must be {} bytes, got {}", KEY_LEN, key_bytes.len()),
            ));
        }
        let unbound = UnboundKey::new(&AES_256_GCM, key_bytes)
            .map_err(|_| crypto_error("token_cipher_new", "Token key rejected"))?;
        Ok(Self {
            key: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
        })
    }

    /// Build a cipher from a base64-encoded key
    pub fn from_base64(encoded: &Sensitive<String>) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.expose().trim())
            .map_err(|_| crypto_error("token_cipher_new", "Token key is not valid base64"))?;
        Self::new(&bytes)
    }

    /// Build a cipher from `JOBAGENT_TOKEN_KEY`
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Self::from_base64(config.require_token_key()?)
    }

    /// A fresh random key, base64-encoded
    pub fn generate_key() -> Result<Sensitive<String>> {
        let mut key = [0u8; KEY_LEN];
        SystemRandom::new()
            .fill(&mut key)
            .map_err(|_| crypto_error("generate_token_key", "System randomness unavailable"))?;
        Ok(Sensitive::new(STANDARD.encode(key)))
    }

    pub fn seal(&self, plaintext: &Sensitive<String>) -> Result<String> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| crypto_error("seal_token", "System randomness unavailable"))?;

        let mut in_out = plaintext.expose().as_bytes().to_vec();
        self.key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::empty(),
                &mut in_out,
            )
            .map_err(|_| crypto_error("seal_token", "Encryption failed"))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + in_out.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&in_out);
        Ok(format!("{}{}", SEALED_PREFIX, STANDARD.encode(sealed)))
    }

    /// Open a sealed value
    ///
    /// # Errors
    /// `Crypto` for an unknown format, a wrong key or tampered data.
    pub fn open(&self, sealed: &str) -> Result<Sensitive<String>> {
        let encoded = sealed
            .strip_prefix(SEALED_PREFIX)
            .ok_or_else(|| crypto_error("open_token", "Unknown sealed token format"))?;
        let raw = STANDARD
            .decode(encoded)
            .map_err(|_| crypto_error("open_token", "Sealed token is not valid base64"))?;
        if raw.len() < NONCE_LEN + AES_256_GCM.tag_len() {
            return Err(crypto_error("open_token", "Sealed token is truncated"));
        }

        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| crypto_error("open_token", "Invalid nonce"))?;
        let mut in_out = ciphertext.to_vec();
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| crypto_error("open_token", "Token authentication failed"))?;

        String::from_utf8(plaintext.to_vec())
            .map(Sensitive::new)
            .map_err(|_| crypto_error("open_token", "Token is not valid UTF-8"))
    }
}

impl fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCipher")
            .field("algorithm", &"AES-256-GCM")
            .finish_non_exhaustive()
    }
}
