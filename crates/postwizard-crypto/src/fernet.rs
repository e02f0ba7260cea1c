use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use aes::Aes128;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use base64::{
    Engine as _,
    engine::general_purpose::{URL_SAFE as B64, URL_SAFE_NO_PAD as B64_NO_PAD},
};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use crate::CryptoError;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type HmacSha256 = Hmac<Sha256>;

const VERSION: u8 = 0x80;
const IV_LEN: usize = 16;
// version + timestamp + iv
const HEADER_LEN: usize = 1 + 8 + IV_LEN;
const MAC_LEN: usize = 32;

/// A Fernet key: 128-bit signing key followed by a 128-bit encryption key.
#[derive(Clone, PartialEq, Eq)]
pub struct FernetKey {
    signing: [u8; 16],
    encryption: [u8; 16],
}

impl fmt::Debug for FernetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FernetKey(********)")
    }
}

impl FernetKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        let mut signing = [0u8; 16];
        let mut encryption = [0u8; 16];
        signing.copy_from_slice(&bytes[..16]);
        encryption.copy_from_slice(&bytes[16..]);
        Self { signing, encryption }
    }

    /// Decode the URL-safe base64 form stored in key files.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let encoded = encoded.trim();
        let bytes = B64
            .decode(encoded)
            .or_else(|_| B64_NO_PAD.decode(encoded))
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| CryptoError::InvalidKey(format!("expected 32 bytes, got {}", b.len())))?;
        Ok(Self::from_bytes(&bytes))
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[..16].copy_from_slice(&self.signing);
        bytes[16..].copy_from_slice(&self.encryption);
        bytes
    }

    pub fn to_base64(&self) -> String {
        B64.encode(self.to_bytes())
    }

    /// Encrypt with the current time and a random IV.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String, CryptoError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let mut iv = [0u8; IV_LEN];
        rand::rng().fill_bytes(&mut iv);
        self.encrypt_at(plaintext, timestamp, iv)
    }

    /// Encrypt with an explicit timestamp and IV. Deterministic, so tokens can be
    /// checked against known vectors.
    pub fn encrypt_at(
        &self,
        plaintext: &[u8],
        timestamp: u64,
        iv: [u8; IV_LEN],
    ) -> Result<String, CryptoError> {
        let ciphertext = Aes128CbcEnc::new(&self.encryption.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let mut token = Vec::with_capacity(HEADER_LEN + ciphertext.len() + MAC_LEN);
        token.push(VERSION);
        token.extend_from_slice(&timestamp.to_be_bytes());
        token.extend_from_slice(&iv);
        token.extend_from_slice(&ciphertext);

        let tag = self.sign(&token)?;
        token.extend_from_slice(&tag);

        Ok(B64.encode(token))
    }

    /// Verify and decrypt a token.
    pub fn decrypt(&self, token: &str) -> Result<Vec<u8>, CryptoError> {
        let data = B64
            .decode(token.trim())
            .map_err(|_| CryptoError::InvalidToken)?;

        if data.len() < HEADER_LEN + MAC_LEN || data[0] != VERSION {
            return Err(CryptoError::InvalidToken);
        }

        let (signed, tag) = data.split_at(data.len() - MAC_LEN);
        let mut mac = self.mac()?;
        mac.update(signed);
        mac.verify_slice(tag).map_err(|_| CryptoError::InvalidToken)?;

        let iv = &signed[9..HEADER_LEN];
        let ciphertext = &signed[HEADER_LEN..];

        Aes128CbcDec::new_from_slices(&self.encryption, iv)
            .map_err(|_| CryptoError::InvalidToken)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CryptoError::InvalidToken)
    }

    /// Timestamp embedded in a token, without verifying it.
    pub fn token_timestamp(token: &str) -> Result<u64, CryptoError> {
        let data = B64
            .decode(token.trim())
            .map_err(|_| CryptoError::InvalidToken)?;
        if data.len() < HEADER_LEN || data[0] != VERSION {
            return Err(CryptoError::InvalidToken);
        }
        let mut ts = [0u8; 8];
        ts.copy_from_slice(&data[1..9]);
        Ok(u64::from_be_bytes(ts))
    }

    fn mac(&self) -> Result<HmacSha256, CryptoError> {
        <HmacSha256 as Mac>::new_from_slice(&self.signing)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut mac = self.mac()?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}
