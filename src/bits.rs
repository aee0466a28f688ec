/**
 * Bit Utilities
 * MSB-first bit strings, right-padded XOR and normalized Hamming distance
 *
 * Padding convention: whenever two operands differ in length, the shorter is
 * extended with zero bits on the right. Commit and verify both go through
 * `align_and_xor`.
 */

use bitvec::prelude::*;
use zeroize::Zeroize;

/// Bit string whose raw storage is the MSB-first byte packing.
pub type Bits = BitVec<u8, Msb0>;

pub fn from_bytes(bytes: &[u8]) -> Bits {
    Bits::from_slice(bytes)
}

/// Pack bits into bytes, zero-filling the final byte.
pub fn to_bytes(bits: &BitSlice<u8, Msb0>) -> Vec<u8> {
    let mut owned = bits.to_bitvec();
    owned.set_uninitialized(false);
    owned.into_vec()
}

/// XOR two bit strings after right-padding the shorter with zeros.
///
/// The output has the length of the longer operand.
#[must_use]
pub fn align_and_xor(a: &BitSlice<u8, Msb0>, b: &BitSlice<u8, Msb0>) -> Bits {
    let len = a.len().max(b.len());
    let mut lhs = a.to_bitvec();
    let mut rhs = b.to_bitvec();
    lhs.resize(len, false);
    rhs.resize(len, false);
    lhs ^ rhs
}

/// Fraction of differing bits over the shorter operand's bit length.
///
/// Bits past the shorter operand are not counted, so padding cannot move the
/// distance in either direction. Empty input is maximally distant.
#[must_use]
pub fn hamming_distance(a: &BitSlice<u8, Msb0>, b: &BitSlice<u8, Msb0>) -> f64 {
    let len = a.len().min(b.len());
    if len == 0 {
        return 1.0;
    }
    let differing = (a[..len].to_bitvec() ^ b[..len].to_bitvec()).count_ones();
    differing as f64 / len as f64
}

/// Zero the storage of key-derived bits before releasing it.
pub fn wipe(bits: Bits) {
    bits.into_vec().zeroize();
}
