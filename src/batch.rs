//! Montgomery's trick: batched modular inversion.

use crate::error::Error;
use crate::field::FieldElement;

/// Inverts every element of `a` in place, using one inversion plus
/// `3(n-1)` multiplications. `scratch` must have the same length as `a`;
/// its contents on entry are irrelevant and are overwritten.
///
/// Returns `Error::ZeroInBatch` if any input is zero (the accumulated
/// product would then be zero and the single inversion meaningless);
/// `a` is left indeterminate in that case.
pub fn invert_batch(a: &mut [FieldElement], scratch: &mut [FieldElement]) -> Result<(), Error> {
    assert_eq!(a.len(), scratch.len());
    let n = a.len();
    if n == 0 {
        return Ok(());
    }

    let mut running_product = a[0];
    for i in 1..n {
        scratch[i] = running_product;
        running_product = running_product.mul(&a[i]);
    }

    if running_product == FieldElement::ZERO {
        return Err(Error::ZeroInBatch);
    }

    let mut product_inv = running_product.invert();
    for i in (1..n).rev() {
        let t = product_inv.mul(&scratch[i]);
        product_inv = product_inv.mul(&a[i]);
        a[i] = t;
    }
    a[0] = product_inv;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fe(v: u64) -> FieldElement {
        let mut bytes = [0u8; 32];
        bytes[0..8].copy_from_slice(&v.to_le_bytes());
        FieldElement::from_bytes(&bytes)
    }

    #[test]
    fn inverts_every_element() {
        let originals = [fe(3), fe(7), fe(11), fe(999_983)];
        let mut a = originals;
        let mut scratch = [FieldElement::ZERO; 4];
        invert_batch(&mut a, &mut scratch).unwrap();
        for (orig, inv) in originals.iter().zip(a.iter()) {
            assert_eq!(orig.mul(inv), FieldElement::ONE);
        }
    }

    #[test]
    fn zero_input_is_rejected() {
        let mut a = [fe(1), FieldElement::ZERO, fe(3)];
        let mut scratch = [FieldElement::ZERO; 3];
        assert!(invert_batch(&mut a, &mut scratch).is_err());
    }
}
