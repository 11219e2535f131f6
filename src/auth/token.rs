//! Session token issuing and stateless verification.
//!
//! A token is `identifier.signature`: a random 256-bit session id in hex,
//! followed by the hex HMAC-SHA256 of that id under the server secret. The
//! token embeds no claims; all session facts live in the registry. Signature
//! verification is pure and stateless, so the same routine can run in a
//! fronting proxy that never sees registry state.

use hmac::{Hmac, Mac};
use rand_core::{OsRng, RngCore};
use sha2::Sha256;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Session id length in bytes (256 bits of entropy).
pub const SESSION_ID_BYTES: usize = 32;

/// Hex length of the session id and of the signature.
pub const SESSION_ID_HEX_LEN: usize = SESSION_ID_BYTES * 2;

/// Separator between identifier and signature.
pub const TOKEN_SEPARATOR: char = '.';

/// Token-related errors.
#[derive(Error, Debug)]
pub enum TokenError {
    /// Signing secret shorter than the required minimum.
    #[error("session secret too short: got {actual} bytes, need at least {minimum}")]
    SecretTooShort { actual: usize, minimum: usize },
}

/// Verify a token signature given its parts.
///
/// This is the single source of truth for signature checking: `hex(HMAC-SHA256
/// (secret, identifier))` compared against the supplied signature in constant
/// time. Any environment that needs to verify tokens independently must
/// reproduce exactly this computation.
pub fn verify_signature(secret: &[u8], identifier: &str, signature_hex: &str) -> bool {
    let supplied = match hex::decode(signature_hex) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut mac = match Hmac::<Sha256>::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(identifier.as_bytes());
    let expected = mac.finalize().into_bytes();

    expected.as_slice().ct_eq(supplied.as_slice()).into()
}

/// Issues and verifies signed session tokens.
///
/// Stateless: holds only the signing secret. Cheap to clone.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Arc<[u8]>,
}

impl TokenCodec {
    /// Minimum allowed secret length in bytes (256 bits).
    pub const MIN_SECRET_LENGTH: usize = 32;

    /// Create a codec from the signing secret.
    ///
    /// Fails closed when the secret is shorter than 32 bytes.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, TokenError> {
        let secret = secret.as_ref();
        if secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(TokenError::SecretTooShort {
                actual: secret.len(),
                minimum: Self::MIN_SECRET_LENGTH,
            });
        }
        Ok(Self {
            secret: Arc::from(secret),
        })
    }

    /// Generate a new signed session token.
    pub fn issue(&self) -> String {
        let mut id_bytes = [0u8; SESSION_ID_BYTES];
        OsRng.fill_bytes(&mut id_bytes);
        let id = hex::encode(id_bytes);

        let mut mac = Hmac::<Sha256>::new_from_slice(&self.secret)
            .expect("secret length already validated");
        mac.update(id.as_bytes());
        let sig = hex::encode(mac.finalize().into_bytes());

        format!("{id}{TOKEN_SEPARATOR}{sig}")
    }

    /// Verify a token's signature.
    ///
    /// Malformed tokens (missing separator, wrong part lengths, non-hex
    /// payloads) are invalid, never an error.
    pub fn verify(&self, token: &str) -> bool {
        match split_token(token) {
            Some((id, sig)) => verify_signature(&self.secret, id, sig),
            None => false,
        }
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret_length", &self.secret.len())
            .finish_non_exhaustive()
    }
}

/// Split a token into (identifier, signature), checking shape only.
///
/// Both parts must be exactly 64 hex characters.
fn split_token(token: &str) -> Option<(&str, &str)> {
    let (id, sig) = token.split_once(TOKEN_SEPARATOR)?;
    if id.len() != SESSION_ID_HEX_LEN || sig.len() != SESSION_ID_HEX_LEN {
        return None;
    }
    if !id.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some((id, sig))
}

/// Extract the session id portion of a token without verifying it.
///
/// Used for log correlation; only a prefix should ever be logged.
pub fn session_id(token: &str) -> Option<&str> {
    split_token(token).map(|(id, _)| id)
}
