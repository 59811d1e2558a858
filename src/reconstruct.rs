//! Private-key reconstruction: given the original private scalar and a
//! found offset, recover the vanity private key.

use crate::edwards;
use crate::error::Error;
use crate::field::FieldElement;
use crate::montgomery;

/// Reads a 32-byte private scalar `s0`, derives its public key, lifts it
/// by `offset`, and tries `s0 + 8*offset` and `s0 - 8*offset` against the
/// target. Both candidates are computed mod `p` (not mod the group order
/// `ell`) — see DESIGN.md for why that matches the original tool and is
/// safe for the offset magnitudes this tool targets.
pub fn reconstruct(s0: &FieldElement, offset: u64) -> Result<FieldElement, Error> {
    let start_public = edwards::scalar_mul_base(s0);
    let (sx, sy) = start_public.to_affine();
    let start_public_bytes = montgomery::from_edwards(sx, sy).x.to_bytes();

    let target = montgomery::lift(&start_public_bytes, offset)?;
    let target_bytes = target.x.to_bytes();

    let mut offset_bytes = [0u8; 32];
    offset_bytes[0..8].copy_from_slice(&offset.to_le_bytes());
    let scaled_offset = FieldElement::from_bytes(&offset_bytes).mul(&edwards::COFACTOR);

    for candidate in [s0.add(&scaled_offset), s0.sub(&scaled_offset)] {
        let point = edwards::scalar_mul_base(&candidate);
        let (x, y) = point.to_affine();
        let bytes = montgomery::from_edwards(x, y).x.to_bytes();
        if bytes == target_bytes {
            return Ok(candidate);
        }
    }

    Err(Error::OffsetMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconstructs_for_several_offsets() {
        let s0 = FieldElement::ONE;
        let (sx, sy) = edwards::scalar_mul_base(&s0).to_affine();
        let start_public_bytes = montgomery::from_edwards(sx, sy).x.to_bytes();

        for offset in [0u64, 1, 5, 17, 100] {
            let s = reconstruct(&s0, offset).expect("reconstruction must succeed");
            let (x, y) = edwards::scalar_mul_base(&s).to_affine();
            let u = montgomery::from_edwards(x, y).x;

            let expected = montgomery::lift(&start_public_bytes, offset).unwrap().x;
            assert_eq!(u, expected);
        }
    }

    #[test]
    fn cross_checks_against_a_real_search_result() {
        use crate::search::{search, SearchOutcome};
        use std::sync::atomic::AtomicBool;

        let s0 = FieldElement::ONE;
        let start_public = edwards::scalar_mul_base(&s0);
        let (sx, sy) = start_public.to_affine();
        let start_public_bytes = montgomery::from_edwards(sx, sy).x.to_bytes();

        let outcome = search(&start_public_bytes, "um", 0, 0, 64, &AtomicBool::new(false)).unwrap();
        let offset = match outcome {
            SearchOutcome::Found { attempts } => attempts,
            SearchOutcome::LimitExhausted { .. } => panic!("expected a match"),
        };

        let s = reconstruct(&s0, offset).unwrap();
        let p = edwards::scalar_mul_base(&s);
        let (x, y) = p.to_affine();
        let bytes = montgomery::from_edwards(x, y).x.to_bytes();
        let encoded = crate::codec::encode(&bytes);
        assert!(encoded.starts_with("um"));
    }
}
