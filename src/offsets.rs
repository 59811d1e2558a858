//! Builds the offset table `Q[i] = 8*(i+1)*G` used by the search driver.

use crate::edwards;
use crate::field::FieldElement;
use crate::montgomery::{self, MontgomeryPoint};

/// Computes `Q[0..n)` with `Q[i] = 8*(i+1)*G` in Montgomery form. Run once
/// at startup; not on the hot path.
pub fn make_offsets(n: usize) -> Vec<MontgomeryPoint> {
    (0..n)
        .map(|i| {
            let mut bytes = [0u8; 32];
            bytes[0..8].copy_from_slice(&((i as u64) + 1).to_le_bytes());
            let scalar = FieldElement::from_bytes(&bytes).mul(&edwards::COFACTOR);
            let point = edwards::scalar_mul_base(&scalar);
            let (x, y) = point.to_affine();
            montgomery::from_edwards(x, y)
        })
        .collect()
}
