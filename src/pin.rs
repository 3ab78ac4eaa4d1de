//! PINs, PIN digests, and the pluggable hashing strategy.
//!
//! The ledger never persists a plaintext PIN. Only the fixed-length hex
//! digest produced by a [`PinHasher`] reaches the record store.

use crate::error::{LedgerError, Result};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of digits in a valid PIN.
pub const PIN_LEN: usize = 4;

/// A four-digit PIN.
///
/// `Debug` output is redacted; use [`Pin::as_str`] or `Display` to reveal it.
#[derive(Clone, PartialEq, Eq)]
pub struct Pin(String);

impl Pin {
    /// Parses a PIN, requiring exactly four ASCII digits.
    pub fn parse(input: &str) -> Result<Self> {
        if input.len() == PIN_LEN && input.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Pin(input.to_string()))
        } else {
            Err(LedgerError::InvalidPinFormat)
        }
    }

    /// Draws a PIN uniformly from `1000..=9999`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Pin(rng.gen_range(1000..=9999u16).to_string())
    }

    /// The four digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(****)")
    }
}

/// A 64-character lowercase hex digest of a PIN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinDigest(String);

impl PinDigest {
    /// Length of the hex representation.
    pub const LEN: usize = 64;

    /// Wraps a hex string, returning `None` unless it is exactly
    /// [`PinDigest::LEN`] lowercase hex characters.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let valid = hex.len() == Self::LEN
            && hex
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| PinDigest(hex.to_string()))
    }

    /// The digest as lowercase hex.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Hashing strategy for PINs.
///
/// Implementations must be deterministic: the same PIN always yields the
/// same digest.
pub trait PinHasher {
    fn digest(&self, pin: &str) -> PinDigest;
}

/// SHA-256 PIN hasher. This is the production default.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256PinHasher;

impl PinHasher for Sha256PinHasher {
    fn digest(&self, pin: &str) -> PinDigest {
        PinDigest(hex::encode(Sha256::digest(pin.as_bytes())))
    }
}

/// INSECURE placeholder hasher kept for compatibility testing.
///
/// The digest is a cheap multiplicative mix of the input and is trivially
/// reversible for four-digit PINs. Only compiled for tests or with the
/// `insecure-hash` feature.
#[cfg(any(test, feature = "insecure-hash"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct InsecurePinHasher;

#[cfg(any(test, feature = "insecure-hash"))]
impl PinHasher for InsecurePinHasher {
    fn digest(&self, pin: &str) -> PinDigest {
        let mix = pin
            .bytes()
            .fold(0u32, |acc, b| acc.wrapping_mul(33) ^ u32::from(b));
        let words = [
            mix,
            !mix,
            mix ^ 0x00ab_cdef,
            !mix ^ 0x0012_3456,
            mix.rotate_left(8),
            mix.rotate_left(16),
            mix.rotate_left(24),
            mix.swap_bytes(),
        ];
        PinDigest(words.iter().map(|w| format!("{:08x}", w)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_four_digits() {
        assert_eq!(Pin::parse("0420").unwrap().as_str(), "0420");
    }

    #[test]
    fn test_parse_rejects_bad_formats() {
        for bad in ["123", "12345", "12a4", "", " 123", "١٢٣٤"] {
            assert!(
                matches!(Pin::parse(bad), Err(LedgerError::InvalidPinFormat)),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_generated_pins_are_four_digits() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let pin = Pin::generate(&mut rng);
            assert!(Pin::parse(pin.as_str()).is_ok());
            assert!(!pin.as_str().starts_with('0'));
        }
    }

    #[test]
    fn test_debug_redacts_pin() {
        let pin = Pin::parse("4321").unwrap();
        assert!(!format!("{:?}", pin).contains("4321"));
    }

    #[test]
    fn test_sha256_is_deterministic() {
        let hasher = Sha256PinHasher;
        assert_eq!(hasher.digest("1234"), hasher.digest("1234"));
        assert_ne!(hasher.digest("1234"), hasher.digest("1235"));
    }

    #[test]
    fn test_sha256_known_vector() {
        let digest = Sha256PinHasher.digest("1234");
        assert_eq!(
            digest.as_str(),
            "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4"
        );
    }

    #[test]
    fn test_insecure_hasher_is_fixed_length_and_deterministic() {
        let hasher = InsecurePinHasher;
        let digest = hasher.digest("1234");
        assert_eq!(digest.as_str().len(), PinDigest::LEN);
        assert_eq!(digest, hasher.digest("1234"));
        assert_ne!(digest, hasher.digest("4321"));
        assert!(PinDigest::from_hex(digest.as_str()).is_some());
    }

    #[test]
    fn test_from_hex_validates() {
        assert!(PinDigest::from_hex(&"a".repeat(64)).is_some());
        assert!(PinDigest::from_hex(&"A".repeat(64)).is_none());
        assert!(PinDigest::from_hex(&"a".repeat(63)).is_none());
        assert!(PinDigest::from_hex(&"g".repeat(64)).is_none());
    }
}
