//! The outer search loop: lift the prefix into a bit mask, advance the
//! base point by a batch stride, and scan x-coordinates for a match.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::codec;
use crate::error::Error;
use crate::field::FieldElement;
use crate::montgomery::{self, MontgomeryPoint};
use crate::offsets;

/// Reference batch size from the original tool. Must be even.
pub const DEFAULT_BATCH_SIZE: usize = 4096;

pub enum SearchOutcome {
    /// A prefix match was found after `attempts` candidates (relative to
    /// `skip`); the printable offset is `skip + attempts`.
    Found { attempts: u64 },
    /// `limit` was exhausted with no match. Per spec, this is a success
    /// exit with nothing printed on stdout. `attempts` still carries the
    /// real candidate count reached (same `skip`-relative basis as
    /// `Found`) so callers can report accurate throughput even though no
    /// offset is printed.
    LimitExhausted { attempts: u64 },
}

/// Derives `(mask, prefixMatch)` from a base64 prefix string. This
/// couples the base64 alphabet's bit-packing to the
/// field's little-endian limb layout; `tests::mask_matches_actual_encoding`
/// cross-checks the formula against the real encoder rather than trusting
/// the bit-reverse/byte-swap arithmetic in isolation.
pub fn prefix_mask(prefix: &str) -> Result<(u64, u64), Error> {
    let prefix_bits = 6 * prefix.len();
    if prefix_bits > 64 {
        return Err(Error::PrefixTooLong);
    }
    let mut prefix_bytes = codec::decode(prefix)?;
    prefix_bytes.resize(8, 0);
    let prefix_le = u64::from_le_bytes(prefix_bytes[0..8].try_into().unwrap());

    let raw_mask = if prefix_bits == 64 {
        u64::MAX
    } else {
        (1u64 << prefix_bits) - 1
    };
    let mask = raw_mask.swap_bytes().reverse_bits();
    Ok((mask, prefix_le & mask))
}

/// Runs a vanity search. `interrupted` is polled once per batch; setting
/// it causes `Err(Error::Interrupted)` at the next batch boundary.
pub fn search(
    public_key: &[u8; 32],
    prefix: &str,
    skip: u64,
    mut limit: u64,
    batch_size: usize,
    interrupted: &AtomicBool,
) -> Result<SearchOutcome, Error> {
    let (mask, prefix_match) = prefix_mask(prefix)?;

    let mut p = montgomery::lift(public_key, skip)?;

    let n = batch_size / 2;
    let offs = offsets::make_offsets(n);

    let mut batch_offset = montgomery::add(&offs[0], &offs[n - 1]);
    batch_offset = montgomery::add(&batch_offset, &offs[n - 1]);

    // Shift by half a batch so the hot loop can represent offsets in
    // {-n+1, ..., +n} symmetrically.
    p = montgomery::add(&p, &offs[n - 1]);
    let mut attempts: i64 = n as i64;

    let mut dx = vec![FieldElement::ZERO; n + 1];
    let mut xs = vec![FieldElement::ZERO; 2 * n];

    loop {
        if interrupted.load(Ordering::SeqCst) {
            return Err(Error::Interrupted);
        }

        dx[n] = batch_offset.x.sub(&p.x);
        montgomery::add_batch_x(&p, &offs, &mut dx, &mut xs)?;

        let found_i = xs
            .iter()
            .position(|x| x.low_limb() & mask == prefix_match);

        if let Some(i) = found_i {
            if i < n {
                attempts += i as i64 + 1;
            } else {
                attempts -= (i as i64 + 1) - n as i64;
            }
            // `skip` is a full-range uint64 and `attempts` is a signed
            // offset from it; wrap mod 2^64 the same way the original's
            // plain uint64_t addition of a signed counter would, rather
            // than round-tripping through i64 addition (which can
            // overflow-panic in a debug build for skip values near
            // i64::MAX/MIN).
            return Ok(SearchOutcome::Found { attempts: skip.wrapping_add(attempts as u64) });
        }

        if p.x.low_limb() & mask == prefix_match {
            return Ok(SearchOutcome::Found { attempts: skip.wrapping_add(attempts as u64) });
        }

        p = montgomery::add_dxinv(&p, &batch_offset, &dx[n]);
        attempts += batch_size as i64 + 1;

        if limit > 0 {
            if limit <= batch_size as u64 + 1 {
                return Ok(SearchOutcome::LimitExhausted {
                    attempts: skip.wrapping_add(attempts as u64),
                });
            }
            limit -= batch_size as u64 + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edwards::scalar_mul_base;

    fn start_public_key() -> [u8; 32] {
        let base = scalar_mul_base(&FieldElement::ONE);
        let (x, y) = base.to_affine();
        montgomery::from_edwards(x, y).x.to_bytes()
    }

    fn never_interrupted() -> AtomicBool {
        AtomicBool::new(false)
    }

    #[test]
    fn empty_prefix_matches_on_the_first_candidate() {
        // An empty prefix's mask is all-zero, so it matches any
        // candidate. The first candidate the hot loop ever tests is
        // `i = 0` within the first batch (offset +1 relative to the
        // half-batch shift) — so `attempts == n + 1`, not literally
        // zero, for any positive batch size.
        let pk = start_public_key();
        let batch_size = 64;
        let outcome = search(&pk, "", 0, 10, batch_size, &never_interrupted()).unwrap();
        match outcome {
            SearchOutcome::Found { attempts } => {
                assert_eq!(attempts, (batch_size / 2) as u64 + 1);
            }
            SearchOutcome::LimitExhausted { .. } => panic!("empty prefix must always match"),
        }
    }

    #[test]
    fn known_offset_is_found_and_reencodes_to_the_prefix() {
        let pk = start_public_key();
        // Find some small real offset by brute force, then feed its
        // prefix back into the driver and confirm it lands on a
        // (possibly different, but valid) offset with the same prefix.
        let mut target_prefix = String::new();
        for k in 1..50u64 {
            let point = montgomery::lift(&pk, k).unwrap();
            let encoded = crate::codec::encode(&point.x.to_bytes());
            target_prefix = encoded[..2].to_string();
            break;
        }

        let outcome = search(&pk, &target_prefix, 0, 1_000_000, 64, &never_interrupted()).unwrap();
        let attempts = match outcome {
            SearchOutcome::Found { attempts } => attempts,
            SearchOutcome::LimitExhausted { .. } => panic!("expected a match well within the limit"),
        };
        assert!(attempts <= 1_000_000);
        let point = montgomery::lift(&pk, attempts).unwrap();
        let encoded = crate::codec::encode(&point.x.to_bytes());
        assert!(encoded.starts_with(&target_prefix));
    }

    #[test]
    fn invalid_public_key_is_rejected() {
        let pk = [0xffu8; 32];
        let err = search(&pk, "", 0, 0, 64, &never_interrupted()).unwrap_err();
        assert!(matches!(err, Error::InvalidPublicKey));
    }

    #[test]
    fn prefix_too_long_is_rejected() {
        let pk = start_public_key();
        let err = search(&pk, "ABCDEFGHIJK", 0, 0, 64, &never_interrupted()).unwrap_err();
        assert!(matches!(err, Error::PrefixTooLong));
    }

    #[test]
    fn limit_exhaustion_reports_no_match() {
        let pk = start_public_key();
        // A 10-character prefix is astronomically unlikely to occur
        // within 100 steps.
        let outcome = search(&pk, "AAAAAAAAAA", 0, 100, 64, &never_interrupted()).unwrap();
        assert!(matches!(outcome, SearchOutcome::LimitExhausted { .. }));
    }

    #[test]
    fn mask_matches_actual_encoding() {
        // Cross-check the hand-derived mask/prefixMatch formula against
        // the real base64 encoder, by encoding a canonical x-coordinate
        // and diffing the decoded prefix bits directly.
        for prefix in ["A", "AB", "umS", "////"] {
            let (mask, prefix_match) = prefix_mask(prefix).unwrap();
            let mut bytes = [0u8; 32];
            bytes[0] = 0xAB;
            bytes[1] = 0x12;
            bytes[2] = 0x34;
            bytes[3] = 0x56;
            let fe = FieldElement::from_bytes(&bytes);
            let low = fe.low_limb();
            let encoded = codec::encode(&fe.to_bytes());
            if low & mask == prefix_match {
                assert!(encoded.starts_with(prefix));
            } else {
                assert!(!encoded.starts_with(prefix));
            }
        }
    }
}
