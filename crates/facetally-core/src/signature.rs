//! Signature derivation — the entire identity-matching policy.
//!
//! An embedding is quantized component-by-component to a fixed decimal
//! precision and the quantized sequence is digested with SHA-256. Equal
//! rounded sequences always produce equal signatures; distinct sequences
//! collide only with cryptographic improbability.
//!
//! Known, accepted weakness: two sightings of the same person whose
//! embeddings straddle a rounding boundary derive different signatures and
//! are counted as two individuals. The policy trades that over-count risk
//! for O(1) membership and zero similarity-threshold tuning.

use crate::types::{Embedding, Signature};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Decimal places each embedding component is rounded to.
///
/// Together with [`QUANTIZE_SCALE`] this constant *is* the matching policy;
/// changing it changes which faces count as the same individual.
pub const QUANTIZE_DECIMALS: u32 = 2;

/// 10^[`QUANTIZE_DECIMALS`].
const QUANTIZE_SCALE: f32 = 100.0;

#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("embedding is empty")]
    EmptyEmbedding,
    #[error("embedding component {index} is not finite")]
    NonFinite { index: usize },
}

/// Derive the identity signature for an embedding.
///
/// Pure function: same embedding in, same signature out. Fails with
/// [`SignatureError`] on malformed extractor output rather than
/// substituting a default key.
pub fn derive(embedding: &Embedding) -> Result<Signature, SignatureError> {
    if embedding.is_empty() {
        return Err(SignatureError::EmptyEmbedding);
    }

    let mut hasher = Sha256::new();
    for (index, &value) in embedding.values.iter().enumerate() {
        if !value.is_finite() {
            return Err(SignatureError::NonFinite { index });
        }
        // Round half away from zero at 2 decimals, then serialize the
        // quantized value in canonical little-endian form.
        let quantized = (value * QUANTIZE_SCALE).round() as i64;
        hasher.update(quantized.to_le_bytes());
    }

    Ok(Signature(hasher.finalize().into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedding(values: &[f32]) -> Embedding {
        Embedding::new(values.to_vec())
    }

    #[test]
    fn test_derive_deterministic() {
        let e = embedding(&[0.31, -1.72, 0.004, 12.5]);
        assert_eq!(derive(&e).unwrap(), derive(&e).unwrap());
    }

    #[test]
    fn test_derive_quantization_equivalence() {
        // Differ only beyond the second decimal place: same signature.
        let a = embedding(&[0.1001, 0.2004]);
        let b = embedding(&[0.1004, 0.2001]);
        let canonical = embedding(&[0.10, 0.20]);
        assert_eq!(derive(&a).unwrap(), derive(&b).unwrap());
        assert_eq!(derive(&a).unwrap(), derive(&canonical).unwrap());
    }

    #[test]
    fn test_derive_distinguishes_at_precision() {
        let a = embedding(&[0.10, 0.20]);
        let b = embedding(&[0.11, 0.20]);
        assert_ne!(derive(&a).unwrap(), derive(&b).unwrap());
    }

    #[test]
    fn test_derive_rounding_boundary_splits() {
        // The documented over-count case: boundary noise yields two
        // different identities.
        let a = embedding(&[0.1049]);
        let b = embedding(&[0.1051]);
        assert_ne!(derive(&a).unwrap(), derive(&b).unwrap());
    }

    #[test]
    fn test_derive_order_sensitive() {
        let a = embedding(&[0.10, 0.20]);
        let b = embedding(&[0.20, 0.10]);
        assert_ne!(derive(&a).unwrap(), derive(&b).unwrap());
    }

    #[test]
    fn test_derive_sign_sensitive() {
        // -0.0 and 0.0 quantize to the same integer; -0.01 and 0.01 must not.
        let a = embedding(&[-0.01]);
        let b = embedding(&[0.01]);
        assert_ne!(derive(&a).unwrap(), derive(&b).unwrap());

        let neg_zero = embedding(&[-0.0]);
        let pos_zero = embedding(&[0.0]);
        assert_eq!(derive(&neg_zero).unwrap(), derive(&pos_zero).unwrap());
    }

    #[test]
    fn test_derive_rejects_empty() {
        let e = embedding(&[]);
        assert!(matches!(derive(&e), Err(SignatureError::EmptyEmbedding)));
    }

    #[test]
    fn test_derive_rejects_nan() {
        let e = embedding(&[0.5, f32::NAN, 0.1]);
        assert!(matches!(
            derive(&e),
            Err(SignatureError::NonFinite { index: 1 })
        ));
    }

    #[test]
    fn test_derive_rejects_infinity() {
        let e = embedding(&[f32::INFINITY]);
        assert!(matches!(
            derive(&e),
            Err(SignatureError::NonFinite { index: 0 })
        ));
    }

    #[test]
    fn test_derive_length_sensitive() {
        let a = embedding(&[0.10]);
        let b = embedding(&[0.10, 0.0]);
        assert_ne!(derive(&a).unwrap(), derive(&b).unwrap());
    }
}
