//! The twisted Edwards form of Curve25519 (Ed25519), in extended
//! projective coordinates `(X, Y, Z, T)` with `x = X/Z, y = Y/Z, T = XY/Z`.
//!
//! Used only transiently: to decode a lifted public key's y-coordinate and
//! to scalar-multiply the base point when building the offset table and
//! when reconstructing a private key.

use crate::error::Error;
use crate::field::FieldElement;

/// `d` parameter of `-x^2 + y^2 = 1 + d*x^2*y^2`.
const EDWARDS_D: FieldElement = FieldElement([
    0x75eb_4dca_1359_78a3,
    0x0070_0a4d_4141_d8ab,
    0x8cc7_4079_7779_e898,
    0x5203_6cee_2b6f_fe73,
]);

const BASE_X: FieldElement = FieldElement([
    0xc956_2d60_8f25_d51a,
    0x692c_c760_9525_a7b2,
    0xc0a4_e231_fdd6_dc5c,
    0x2169_36d3_cd6e_53fe,
]);

const BASE_Y: FieldElement = FieldElement([
    0x6666_6666_6666_6658,
    0x6666_6666_6666_6666,
    0x6666_6666_6666_6666,
    0x6666_6666_6666_6666,
]);

/// The cofactor, `8`, as a field element (the original source reuses the
/// field-element type for small integer scalars too).
pub const COFACTOR: FieldElement = FieldElement([8, 0, 0, 0]);

/// Extended projective Edwards point.
#[derive(Clone, Copy, Debug)]
pub struct EdwardsPoint {
    pub x: FieldElement,
    pub y: FieldElement,
    pub z: FieldElement,
    pub t: FieldElement,
}

impl EdwardsPoint {
    pub const IDENTITY: EdwardsPoint = EdwardsPoint {
        x: FieldElement::ZERO,
        y: FieldElement::ONE,
        z: FieldElement::ONE,
        t: FieldElement::ZERO,
    };

    pub fn from_affine(x: FieldElement, y: FieldElement) -> EdwardsPoint {
        EdwardsPoint {
            x,
            y,
            z: FieldElement::ONE,
            t: x.mul(&y),
        }
    }

    /// Decodes a compressed y-coordinate into a full point, recovering `x`
    /// via `x^2 = (y^2-1) / (d*y^2+1)`. The sign bit is never consulted:
    /// every field element this crate decodes arrives with bit 255 clear
    /// (it is produced by `FieldElement::to_bytes`, never read off the
    /// wire with an externally-supplied sign bit), so the even/low-bit-clear
    /// root is always the correct one.
    pub fn decode(y: FieldElement) -> Result<EdwardsPoint, Error> {
        let yy = y.square();
        let u = yy.sub(&FieldElement::ONE);
        let v = EDWARDS_D.mul(&yy).add(&FieldElement::ONE);
        let (is_square, mut x) = FieldElement::sqrt_ratio(&u, &v);
        if !bool::from(is_square) {
            return Err(Error::InvalidPublicKey);
        }
        if x.low_limb() & 1 == 1 {
            x = x.neg();
        }
        Ok(EdwardsPoint::from_affine(x, y))
    }

    /// Unified twisted-Edwards addition (`a = -1`), complete for all
    /// inputs on this curve.
    pub fn add(&self, other: &EdwardsPoint) -> EdwardsPoint {
        let a = self.y.sub(&self.x).mul(&other.y.sub(&other.x));
        let b = self.y.add(&self.x).mul(&other.y.add(&other.x));
        let c = self.t.mul(&FieldElement([2, 0, 0, 0])).mul(&EDWARDS_D).mul(&other.t);
        let d = self.z.mul(&FieldElement([2, 0, 0, 0])).mul(&other.z);
        let e = b.sub(&a);
        let f = d.sub(&c);
        let g = d.add(&c);
        let h = b.add(&a);
        EdwardsPoint {
            x: e.mul(&f),
            y: g.mul(&h),
            z: f.mul(&g),
            t: e.mul(&h),
        }
    }

    pub fn to_affine(&self) -> (FieldElement, FieldElement) {
        let zinv = self.z.invert();
        (self.x.mul(&zinv), self.y.mul(&zinv))
    }
}

/// Variable-time scalar multiplication of an affine point by a raw
/// 256-bit little-endian integer (not reduced mod the group order).
/// Matches the original tool's reuse of its field-element type directly
/// as the scalar multiplier; this is not constant-time — see DESIGN.md.
pub fn scalar_mul(scalar: &FieldElement, point: &EdwardsPoint) -> EdwardsPoint {
    let bytes = scalar.to_bytes();
    let mut result = EdwardsPoint::IDENTITY;
    for bit_index in (0..256).rev() {
        result = result.add(&result);
        let byte = bytes[bit_index / 8];
        if (byte >> (bit_index % 8)) & 1 == 1 {
            result = result.add(point);
        }
    }
    result
}

/// Scalar multiplication of the Ed25519 base point.
pub fn scalar_mul_base(scalar: &FieldElement) -> EdwardsPoint {
    scalar_mul(scalar, &EdwardsPoint::from_affine(BASE_X, BASE_Y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_point_decodes_from_its_own_y() {
        let p = EdwardsPoint::from_affine(BASE_X, BASE_Y);
        let decoded = EdwardsPoint::decode(BASE_Y).expect("base point y must decode");
        let (dx, dy) = decoded.to_affine();
        let (px, py) = p.to_affine();
        assert_eq!(dx, px);
        assert_eq!(dy, py);
    }

    #[test]
    fn scalar_mul_one_is_identity_preserving() {
        let base = EdwardsPoint::from_affine(BASE_X, BASE_Y);
        let one = FieldElement::ONE;
        let p = scalar_mul(&one, &base);
        let (x, y) = p.to_affine();
        let (bx, by) = base.to_affine();
        assert_eq!(x, bx);
        assert_eq!(y, by);
    }

    #[test]
    fn scalar_mul_base_two_equals_doubling() {
        let base = EdwardsPoint::from_affine(BASE_X, BASE_Y);
        let two = FieldElement([2, 0, 0, 0]);
        let doubled = base.add(&base);
        let via_scalar = scalar_mul(&two, &base);
        let (x1, y1) = doubled.to_affine();
        let (x2, y2) = via_scalar.to_affine();
        assert_eq!(x1, x2);
        assert_eq!(y1, y2);
    }

    #[test]
    fn all_ones_y_is_not_a_valid_point() {
        let y = FieldElement::from_bytes(&[0xffu8; 32]);
        assert!(EdwardsPoint::decode(y).is_err());
    }
}
