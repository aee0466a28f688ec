/**
 * Repetition Code
 * Each key bit is repeated R times; decoding is a per-group majority vote
 */

use bitvec::prelude::*;

use crate::bits::{from_bytes, to_bytes, Bits};

/// Encode `key` by repeating every bit `redundancy` times.
#[must_use]
pub fn encode(key: &[u8], redundancy: usize) -> Bits {
    from_bytes(key)
        .iter()
        .by_vals()
        .flat_map(|bit| std::iter::repeat(bit).take(redundancy))
        .collect()
}

/// Recover `key_length` bytes from a possibly noisy codeword.
///
/// A group decodes to 1 when more than half of its bits are set. A trailing
/// partial group votes over the bits that are present, and groups past the
/// end of `codeword` decode to 0.
pub fn decode(codeword: &BitSlice<u8, Msb0>, key_length: usize, redundancy: usize) -> Vec<u8> {
    let key_bits = key_length * 8;

    let mut decoded: Bits = codeword
        .chunks(redundancy)
        .take(key_bits)
        .map(|group| group.count_ones() * 2 > group.len())
        .collect();
    decoded.resize(key_bits, false);

    to_bytes(&decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_repeats_each_bit() {
        // Top two key bits are 1, 0; R = 3
        let codeword = encode(&[0b1000_0000], 3);
        assert_eq!(codeword.len(), 24);
        assert_eq!(&codeword[..6], bits![u8, Msb0; 1, 1, 1, 0, 0, 0]);
        assert!(codeword[6..].not_any());
    }

    #[test]
    fn test_encoded_length() {
        assert_eq!(encode(&[0u8; 16], 7).len(), 896);
        assert_eq!(encode(&[0u8; 2], 3).len(), 48);
        assert_eq!(encode(&[0u8; 1], 1).len(), 8);
    }

    #[test]
    fn test_decode_clean_codeword() {
        let key = [0xDE, 0xAD, 0xBE, 0xEF];
        assert_eq!(decode(&encode(&key, 5), key.len(), 5), key.to_vec());
    }

    #[test]
    fn test_decode_corrects_minority_flips() {
        let key = [0xA5, 0x3C];
        let mut codeword = encode(&key, 7);

        // Three flips per group is the most a 7-fold code can absorb
        for group in 0..16 {
            for offset in [0, 2, 6] {
                let i = group * 7 + offset;
                let bit = codeword[i];
                codeword.set(i, !bit);
            }
        }

        assert_eq!(decode(&codeword, 2, 7), key.to_vec());
    }

    #[test]
    fn test_decode_fails_on_majority_flips() {
        let mut codeword = encode(&[0x00], 3);
        codeword.set(0, true);
        codeword.set(1, true);

        assert_eq!(decode(&codeword, 1, 3), vec![0b1000_0000]);
    }

    #[test]
    fn test_decode_short_codeword_pads_with_zero_bits() {
        // Groups 0 and 1 are complete, group 2 has two bits, the rest are absent
        let codeword = bits![u8, Msb0; 1, 1, 1, 0, 1, 1, 0, 0];
        assert_eq!(decode(codeword, 1, 3), vec![0b1100_0000]);
    }
}
