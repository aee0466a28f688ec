/**
 * Quantizer
 * Converts real-valued feature vectors into fixed-length bit templates
 */

use bitvec::prelude::*;

use crate::bits::Bits;

/// A binarized feature vector, packed MSB-first.
///
/// Holds exactly `bit_len()` meaningful bits; the trailing bits of the final
/// byte are always zero.
#[derive(Clone, PartialEq, Eq)]
pub struct BitTemplate {
    bits: Bits,
}

impl BitTemplate {
    pub fn from_bits(bits: &[bool]) -> Self {
        bits.iter().copied().collect::<Bits>().into()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }

    pub fn as_bitslice(&self) -> &BitSlice<u8, Msb0> {
        &self.bits
    }

    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    /// The meaningful bits, without byte padding.
    pub fn bits(&self) -> Vec<bool> {
        self.bits.iter().by_vals().collect()
    }
}

impl From<Bits> for BitTemplate {
    fn from(mut bits: Bits) -> Self {
        bits.set_uninitialized(false);
        Self { bits }
    }
}

impl std::fmt::Debug for BitTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Templates are biometric material
        write!(f, "BitTemplate({} bits, [REDACTED])", self.bits.len())
    }
}

/// Quantize `features` into a `target_dim`-bit template.
///
/// The vector is truncated or zero-padded to `target_dim`, non-finite values
/// are replaced (NaN → 0, +Inf → 1, -Inf → -1), and the result is
/// standardized when its deviation is non-zero. A bit is set where the value
/// lies strictly above the median, so values equal to the median map to 0.
///
/// Never fails: degenerate input yields a degenerate template.
pub fn quantize(features: &[f32], target_dim: usize) -> BitTemplate {
    let mut values: Vec<f64> = features
        .iter()
        .take(target_dim)
        .map(|&x| sanitize(x))
        .collect();
    values.resize(target_dim, 0.0);

    standardize(&mut values);

    let median = median(&values);
    values.iter().map(|&x| x > median).collect::<Bits>().into()
}

fn sanitize(x: f32) -> f64 {
    if x.is_nan() {
        0.0
    } else if x == f32::INFINITY {
        1.0
    } else if x == f32::NEG_INFINITY {
        -1.0
    } else {
        x as f64
    }
}

/// Zero mean, unit variance. Left untouched when every value is equal.
fn standardize(values: &mut [f64]) {
    if values.is_empty() {
        return;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    if std_dev > 0.0 {
        for x in values.iter_mut() {
            *x = (*x - mean) / std_dev;
        }
    }
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
