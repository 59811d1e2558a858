//! Arithmetic over GF(p), p = 2^255 - 19.
//!
//! Elements are four 64-bit little-endian limbs, always kept canonically
//! reduced (every value is in `[0, p)` between operations). This mirrors a
//! plain (non-Montgomery-domain) field element representation rather than
//! a REDC residue, since the rest of this crate's algorithms were derived
//! against that representation.

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// An element of GF(2^255 - 19), canonically reduced.
#[derive(Clone, Copy, Debug)]
pub struct FieldElement(pub(crate) [u64; 4]);

const MODULUS: [u64; 4] = [
    0xffff_ffff_ffff_ffed,
    0xffff_ffff_ffff_ffff,
    0xffff_ffff_ffff_ffff,
    0x7fff_ffff_ffff_ffff,
];

/// sqrt(-1) mod p, used to recover the second root in the p ≡ 5 (mod 8)
/// square root algorithm (RFC 8032 §5.1.3).
const SQRT_M1: FieldElement = FieldElement([
    0xc4ee_1b27_4a0e_a0b0,
    0x2f43_1806_ad2f_e478,
    0x2b4d_0099_3dfb_d7a7,
    0x2b83_2480_4fc1_df0b,
]);

/// Computes `a + b + carry`, returning the result and the carry out.
#[inline(always)]
const fn adc(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let ret = (a as u128) + (b as u128) + (carry as u128);
    (ret as u64, (ret >> 64) as u64)
}

/// Computes `a - (b + borrow)`. `borrow` is either `0` or `u64::MAX` on
/// entry and exit, so it doubles as a mask for conditional add-back.
#[inline(always)]
const fn sbb(a: u64, b: u64, borrow: u64) -> (u64, u64) {
    let ret = (a as u128).wrapping_sub((b as u128) + ((borrow >> 63) as u128));
    (ret as u64, (ret >> 64) as u64)
}

/// Computes `a + b*c + carry`, returning the result and the carry out.
#[inline(always)]
const fn mac(a: u64, b: u64, c: u64, carry: u64) -> (u64, u64) {
    let ret = (a as u128) + ((b as u128) * (c as u128)) + (carry as u128);
    (ret as u64, (ret >> 64) as u64)
}

/// `a - b`, reduced mod p. Used both for subtraction and for folding a
/// value known to be `< 2p` back into canonical range (pass `MODULUS` as
/// `b`).
fn sub_mod(a: [u64; 4], b: [u64; 4]) -> [u64; 4] {
    let (w0, borrow) = sbb(a[0], b[0], 0);
    let (w1, borrow) = sbb(a[1], b[1], borrow);
    let (w2, borrow) = sbb(a[2], b[2], borrow);
    let (w3, borrow) = sbb(a[3], b[3], borrow);

    let (w0, carry) = adc(w0, MODULUS[0] & borrow, 0);
    let (w1, carry) = adc(w1, MODULUS[1] & borrow, carry);
    let (w2, carry) = adc(w2, MODULUS[2] & borrow, carry);
    let (w3, _) = adc(w3, MODULUS[3] & borrow, carry);
    [w0, w1, w2, w3]
}

fn schoolbook_mul(a: &[u64; 4], b: &[u64; 4]) -> [u64; 8] {
    let (w0, carry) = mac(0, a[0], b[0], 0);
    let (w1, carry) = mac(0, a[0], b[1], carry);
    let (w2, carry) = mac(0, a[0], b[2], carry);
    let (w3, w4) = mac(0, a[0], b[3], carry);

    let (w1, carry) = mac(w1, a[1], b[0], 0);
    let (w2, carry) = mac(w2, a[1], b[1], carry);
    let (w3, carry) = mac(w3, a[1], b[2], carry);
    let (w4, w5) = mac(w4, a[1], b[3], carry);

    let (w2, carry) = mac(w2, a[2], b[0], 0);
    let (w3, carry) = mac(w3, a[2], b[1], carry);
    let (w4, carry) = mac(w4, a[2], b[2], carry);
    let (w5, w6) = mac(w5, a[2], b[3], carry);

    let (w3, carry) = mac(w3, a[3], b[0], 0);
    let (w4, carry) = mac(w4, a[3], b[1], carry);
    let (w5, carry) = mac(w5, a[3], b[2], carry);
    let (w6, w7) = mac(w6, a[3], b[3], carry);

    [w0, w1, w2, w3, w4, w5, w6, w7]
}

/// Reduces an 8-limb (512-bit) product mod p, using `2^255 ≡ 19 (mod p)`.
fn reduce_wide(w: [u64; 8]) -> [u64; 4] {
    // Fold the high 256 bits back in: 2^256 ≡ 38 (mod p).
    let (t0, carry) = mac(w[0], 38, w[4], 0);
    let (t1, carry) = mac(w[1], 38, w[5], carry);
    let (t2, carry) = mac(w[2], 38, w[6], carry);
    let (t3, carry) = mac(w[3], 38, w[7], carry);
    let t4 = carry;

    // t4 is at most a few dozen, so a second *38 fold collapses it in one pass.
    let (o0, carry) = mac(t0, 38, t4, 0);
    let (o1, carry) = adc(t1, 0, carry);
    let (o2, carry) = adc(t2, 0, carry);
    let (o3, carry) = adc(t3, 0, carry);
    debug_assert_eq!(carry, 0);
    let mut out = [o0, o1, o2, o3];

    // The fold above can leave bit 255 set (2^255 ≡ 19); clear it and fold
    // at most twice more.
    for _ in 0..2 {
        let top = out[3] >> 63;
        if top == 0 {
            break;
        }
        out[3] &= 0x7fff_ffff_ffff_ffff;
        let (o0, carry) = mac(out[0], 19, top, 0);
        let (o1, carry) = adc(out[1], 0, carry);
        let (o2, carry) = adc(out[2], 0, carry);
        let (o3, carry) = adc(out[3], 0, carry);
        debug_assert_eq!(carry, 0);
        out = [o0, o1, o2, o3];
    }

    sub_mod(out, MODULUS)
}

impl FieldElement {
    pub const ZERO: FieldElement = FieldElement([0, 0, 0, 0]);
    pub const ONE: FieldElement = FieldElement([1, 0, 0, 0]);

    /// Reduces a little-endian 256-bit value mod p. Accepts any byte
    /// pattern, including ones `>= p`.
    pub fn from_bytes(bytes: &[u8; 32]) -> FieldElement {
        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            *limb = u64::from_le_bytes(bytes[i * 8..i * 8 + 8].try_into().unwrap());
        }
        FieldElement(reduce_wide([limbs[0], limbs[1], limbs[2], limbs[3], 0, 0, 0, 0]))
    }

    /// The low 64 bits of the canonical little-endian representation.
    /// Used by the search driver's prefix-mask test, which only ever
    /// inspects the low limb of a candidate x-coordinate.
    pub fn low_limb(&self) -> u64 {
        self.0[0]
    }

    /// Serializes to 32 canonical little-endian bytes.
    pub fn to_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for i in 0..4 {
            out[i * 8..i * 8 + 8].copy_from_slice(&self.0[i].to_le_bytes());
        }
        out
    }

    pub fn add(&self, other: &FieldElement) -> FieldElement {
        let (w0, c) = adc(self.0[0], other.0[0], 0);
        let (w1, c) = adc(self.0[1], other.0[1], c);
        let (w2, c) = adc(self.0[2], other.0[2], c);
        let (w3, c) = adc(self.0[3], other.0[3], c);
        debug_assert_eq!(c, 0, "sum of two canonical field elements cannot overflow 256 bits");
        FieldElement(sub_mod([w0, w1, w2, w3], MODULUS))
    }

    pub fn sub(&self, other: &FieldElement) -> FieldElement {
        FieldElement(sub_mod(self.0, other.0))
    }

    pub fn neg(&self) -> FieldElement {
        FieldElement::ZERO.sub(self)
    }

    pub fn mul(&self, other: &FieldElement) -> FieldElement {
        FieldElement(reduce_wide(schoolbook_mul(&self.0, &other.0)))
    }

    pub fn square(&self) -> FieldElement {
        self.mul(self)
    }

    fn pow2k(&self, k: u32) -> FieldElement {
        let mut r = *self;
        for _ in 0..k {
            r = r.square();
        }
        r
    }

    /// `self^(p-2)`, i.e. the modular inverse by Fermat's little theorem.
    /// Addition chain as used throughout the Curve25519 ecosystem (the
    /// same chain shape as dalek/ref10's `pow22501`).
    ///
    /// # Panics
    /// Does not panic; inverting zero yields zero (undefined but total).
    pub fn invert(&self) -> FieldElement {
        let z2 = self.square();
        let z8 = z2.pow2k(2);
        let z9 = z8.mul(self);
        let z11 = z9.mul(&z2);
        let z22 = z11.square();
        let z_5_0 = z22.mul(&z9);
        let z_10_5 = z_5_0.pow2k(5);
        let z_10_0 = z_10_5.mul(&z_5_0);
        let z_20_10 = z_10_0.pow2k(10);
        let z_20_0 = z_20_10.mul(&z_10_0);
        let z_40_20 = z_20_0.pow2k(20);
        let z_40_0 = z_40_20.mul(&z_20_0);
        let z_50_10 = z_40_0.pow2k(10);
        let z_50_0 = z_50_10.mul(&z_10_0);
        let z_100_50 = z_50_0.pow2k(50);
        let z_100_0 = z_100_50.mul(&z_50_0);
        let z_200_100 = z_100_0.pow2k(100);
        let z_200_0 = z_200_100.mul(&z_100_0);
        let z_250_50 = z_200_0.pow2k(50);
        let z_250_0 = z_250_50.mul(&z_50_0);
        let z_255_5 = z_250_0.pow2k(5);
        z_255_5.mul(&z11)
    }

    /// `self^((p-5)/8)`, the exponent used by the Euler-criterion square
    /// root (RFC 8032 §5.1.3). Shares the bulk of `invert`'s chain.
    fn pow_p58(&self) -> FieldElement {
        let z2 = self.square();
        let z8 = z2.pow2k(2);
        let z9 = z8.mul(self);
        let z11 = z9.mul(&z2);
        let z22 = z11.square();
        let z_5_0 = z22.mul(&z9);
        let z_10_5 = z_5_0.pow2k(5);
        let z_10_0 = z_10_5.mul(&z_5_0);
        let z_20_10 = z_10_0.pow2k(10);
        let z_20_0 = z_20_10.mul(&z_10_0);
        let z_40_20 = z_20_0.pow2k(20);
        let z_40_0 = z_40_20.mul(&z_20_0);
        let z_50_10 = z_40_0.pow2k(10);
        let z_50_0 = z_50_10.mul(&z_10_0);
        let z_100_50 = z_50_0.pow2k(50);
        let z_100_0 = z_100_50.mul(&z_50_0);
        let z_200_100 = z_100_0.pow2k(100);
        let z_200_0 = z_200_100.mul(&z_100_0);
        let z_250_50 = z_200_0.pow2k(50);
        let z_250_0 = z_250_50.mul(&z_50_0);
        let z_252_2 = z_250_0.pow2k(2);
        z_252_2.mul(self)
    }

    /// Euler-criterion square root of `u/v`: returns `(1, r)` with `r^2 ==
    /// u/v` if `u/v` is a square, otherwise `(0, r)` for an unspecified
    /// `r`. Used by Edwards point decompression.
    pub fn sqrt_ratio(u: &FieldElement, v: &FieldElement) -> (Choice, FieldElement) {
        let v3 = v.square().mul(v);
        let v7 = v3.square().mul(v);
        let uv7 = u.mul(&v7);
        let candidate = u.mul(&v3).mul(&uv7.pow_p58());

        let check = candidate.square().mul(v);
        let correct_sign = check.ct_eq(u);
        let flipped_sign = check.neg().ct_eq(u);

        let candidate = FieldElement::conditional_select(
            &candidate,
            &candidate.mul(&SQRT_M1),
            flipped_sign,
        );
        (correct_sign | flipped_sign, candidate)
    }
}

impl ConstantTimeEq for FieldElement {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[0].ct_eq(&other.0[0])
            & self.0[1].ct_eq(&other.0[1])
            & self.0[2].ct_eq(&other.0[2])
            & self.0[3].ct_eq(&other.0[3])
    }
}

impl ConditionallySelectable for FieldElement {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        let mut out = [0u64; 4];
        for i in 0..4 {
            out[i] = u64::conditional_select(&a.0[i], &b.0[i], choice);
        }
        FieldElement(out)
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for FieldElement {}
