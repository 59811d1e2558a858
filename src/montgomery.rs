//! The Montgomery form of Curve25519, `v^2 = u^3 + A*u^2 + u`, and the
//! bi-rational map to/from the Edwards form (RFC 7748 §4.1).

use crate::batch;
use crate::edwards::{self, EdwardsPoint};
use crate::error::Error;
use crate::field::FieldElement;

/// `A = 486662`.
pub const A: FieldElement = FieldElement([486662, 0, 0, 0]);

/// The unique sign of `sqrt(-486664)` that sends the Edwards base point
/// to the Montgomery base point `u = 9`.
const SQRT_NEG_486664: FieldElement = FieldElement([
    3716027510060384743,
    4205847681119217021,
    3280018162556579969,
    8131550443321948484,
]);

/// An affine point `(u, v)` on the Montgomery curve. The point at
/// infinity is never represented; this tool's search never produces it.
#[derive(Clone, Copy, Debug)]
pub struct MontgomeryPoint {
    pub x: FieldElement,
    pub y: FieldElement,
}

/// `u = (1+y)/(1-y)`, `v = sqrt(-486664)*u/x`.
pub fn from_edwards(x: FieldElement, y: FieldElement) -> MontgomeryPoint {
    let t = FieldElement::ONE.sub(&y).invert();
    let u = FieldElement::ONE.add(&y).mul(&t);
    let v = SQRT_NEG_486664.mul(&u).mul(&x.invert());
    MontgomeryPoint { x: u, y: v }
}

/// Montgomery curve point addition (1 inversion + 4 multiplies + 7 adds).
pub fn add(p1: &MontgomeryPoint, p2: &MontgomeryPoint) -> MontgomeryPoint {
    let dx_inv = p2.x.sub(&p1.x).invert();
    add_dxinv(p1, p2, &dx_inv)
}

/// Montgomery curve point addition with a precomputed `dxinv = 1/(x2 -
/// x1)` (4 multiplies + 7 adds).
pub fn add_dxinv(p1: &MontgomeryPoint, p2: &MontgomeryPoint, dxinv: &FieldElement) -> MontgomeryPoint {
    let x2a = p2.x.add(&A);
    let dy = p2.y.sub(&p1.y);
    let slope = dy.mul(dxinv);
    let slope_sq = slope.mul(&slope);
    let slope_cb = slope_sq.mul(&slope);
    let x12a = p1.x.add(&x2a);
    let x3 = slope_sq.sub(&x12a);
    let x_sum = p1.x.add(&x12a);
    let mut y3 = x_sum.mul(&slope);
    y3 = y3.sub(&slope_cb);
    y3 = y3.sub(&p1.y);
    MontgomeryPoint { x: x3, y: y3 }
}

/// Interprets `public_key` as a little-endian Montgomery u-coordinate,
/// lifts it to an affine point via the Edwards form, and adds `8 * offset
/// * G`. Loses the sign of `v`; the search only ever inspects `u`.
pub fn lift(public_key: &[u8; 32], offset: u64) -> Result<MontgomeryPoint, Error> {
    let u0 = FieldElement::from_bytes(public_key);
    let t = u0.add(&FieldElement::ONE).invert();
    let y = u0.sub(&FieldElement::ONE).mul(&t);

    let decoded = EdwardsPoint::decode(y)?;

    let offset_scalar = FieldElement::from_bytes(&u64_to_le_bytes32(offset)).mul(&edwards::COFACTOR);
    let offset_point = edwards::scalar_mul_base(&offset_scalar);
    let shifted = decoded.add(&offset_point);

    let (x, y) = shifted.to_affine();
    Ok(from_edwards(x, y))
}

fn u64_to_le_bytes32(v: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[0..8].copy_from_slice(&v.to_le_bytes());
    out
}

/// Computes the x-coordinates of `p1 + q[i]` (into `out[0..n)`) and `p1 -
/// q[i]` (into `out[n..2n)`), amortising one inversion batch across all
/// `n` pairs plus the caller's extra slot `dx[n]`.
///
/// On return, `dx[n]` holds `1/dx_extra` — the caller pre-fills `dx[n]`
/// with the value it wants inverted (used by the search driver to advance
/// `P` to the next batch without a second inversion).
pub fn add_batch_x(
    p1: &MontgomeryPoint,
    q: &[MontgomeryPoint],
    dx: &mut [FieldElement],
    out: &mut [FieldElement],
) -> Result<(), Error> {
    let n = q.len();
    assert_eq!(dx.len(), n + 1);
    assert_eq!(out.len(), 2 * n);

    for i in 0..n {
        dx[i] = q[i].x.sub(&p1.x);
    }
    // dx[n] was pre-filled by the caller with the value to invert.

    // invert_batch uses `out` as scratch; safe because it finishes before
    // any result is written into `out`.
    batch::invert_batch(dx, &mut out[..n + 1])?;

    let ax1 = A.add(&p1.x);
    for i in 0..n {
        let ax1x2 = ax1.add(&q[i].x);

        let mut s_plus = q[i].y.sub(&p1.y).mul(&dx[i]);
        s_plus = s_plus.mul(&s_plus);
        out[i] = s_plus.sub(&ax1x2);

        let mut s_minus = q[i].y.add(&p1.y).mul(&dx[i]);
        s_minus = s_minus.mul(&s_minus);
        out[n + i] = s_minus.sub(&ax1x2);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edwards::scalar_mul_base;

    fn fe(v: u64) -> FieldElement {
        FieldElement::from_bytes(&u64_to_le_bytes32(v))
    }

    #[test]
    fn base_point_maps_to_u_equals_9() {
        let base = scalar_mul_base(&FieldElement::ONE);
        let (x, y) = base.to_affine();
        let m = from_edwards(x, y);
        assert_eq!(m.x, fe(9));
    }

    #[test]
    fn batch_add_matches_single_add() {
        let p1 = {
            let p = scalar_mul_base(&fe(12345));
            let (x, y) = p.to_affine();
            from_edwards(x, y)
        };
        let qs: Vec<MontgomeryPoint> = (1..=4)
            .map(|i| {
                let p = scalar_mul_base(&fe(8 * i));
                let (x, y) = p.to_affine();
                from_edwards(x, y)
            })
            .collect();

        let n = qs.len();
        let mut dx = vec![FieldElement::ZERO; n + 1];
        dx[n] = fe(1); // unused extra slot for this test
        let mut out = vec![FieldElement::ZERO; 2 * n];
        add_batch_x(&p1, &qs, &mut dx, &mut out).unwrap();

        for i in 0..n {
            let single_plus = add(&p1, &qs[i]);
            assert_eq!(out[i], single_plus.x);

            let neg_q = MontgomeryPoint { x: qs[i].x, y: qs[i].y.neg() };
            let single_minus = add(&p1, &neg_q);
            assert_eq!(out[n + i], single_minus.x);
        }
    }
}
